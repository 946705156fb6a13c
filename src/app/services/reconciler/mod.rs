//! File reconciliation engine
//!
//! One [`FileReconciler`] embodies one pipeline stage: a matching rule, a
//! header transformation, and a write discipline. Every stage follows the
//! same shape:
//! 1. Parse the file's header (the data payload is never touched)
//! 2. Plan a transformation, or classify the file as a skip
//! 3. Execute the plan under the stage's [`StagePolicy`]
//!
//! Planning is pure; nothing reaches disk until a plan calls for it, so a
//! malformed or unmatched file can never be half-written.

use crate::app::models::ReconcileOutcome;
use crate::app::services::header_merge::{self, UnitsEditError};
use crate::app::services::reproject::Project;
use crate::app::services::smet_codec::SmetFile;
use crate::app::services::station_registry::{HeaderAuthority, RemapTable, StationRegistry};
use crate::constants::{self, GEO_COPY_FIELDS, fields};
use crate::{Error, Result};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod batch;
pub mod io;

#[cfg(test)]
pub mod tests;

pub use batch::BatchRunner;

/// What to do with files that have no authoritative match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatchPolicy {
    /// Leave the file alone and count it
    Skip,

    /// Copy the file unchanged into the output directory
    CopyUnchanged,
}

/// Where reconciled content is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Rewrite the input file itself, optionally keeping a `.bak` sibling
    InPlace { backup: bool },

    /// Write results into a separate directory, inputs untouched
    Directory { out_dir: PathBuf },
}

/// How output files are named
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameMode {
    /// Keep the input file name
    Keep,

    /// Name outputs `{station_id}.smet`
    CanonicalId,
}

/// Whether a write may replace an existing file at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    Allow,

    /// Decline the write and report [`ReconcileOutcome::RenameDeclined`]
    Decline,
}

/// Write discipline for one pipeline stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePolicy {
    pub no_match: NoMatchPolicy,
    pub output: OutputMode,
    pub rename: RenameMode,
    pub overwrite: OverwritePolicy,
}

impl StagePolicy {
    /// In-place editing: unmatched files are skipped, names are kept
    pub fn in_place(backup: bool) -> Self {
        Self {
            no_match: NoMatchPolicy::Skip,
            output: OutputMode::InPlace { backup },
            rename: RenameMode::Keep,
            overwrite: OverwritePolicy::Allow,
        }
    }
}

/// Matching rule and header transformation of a pipeline stage
pub enum StageKind {
    /// Match by station name against a reference table, rewrite the full
    /// identity and geolocation block, reproject grid coordinates
    Reconcile {
        registry: StationRegistry,
        projector: Box<dyn Project>,
    },

    /// Match by station id against an authority file set, copy its
    /// geolocation values verbatim
    PatchCoords {
        authority: HeaderAuthority,
        /// When set, only these station ids are patched
        target_ids: Option<HashSet<i64>>,
    },

    /// Swap the `station_id` value through a remap table
    RemapIds { table: RemapTable },

    /// Set the `units_multiplier` token of one channel
    SetMultiplier { channel: String, value: String },

    /// Copy each file under its canonical `{station_id}.smet` name
    RenameById,

    /// Keep only files whose station name appears in a reference set
    FilterByName { names: HashSet<String> },
}

/// What a stage decided to do with one file
enum StagePlan {
    /// Header mutated; render and write per policy
    WriteModified(SmetFile),

    /// Copy the input bytes untouched, optionally under a new name
    CopyVerbatim { rename_to: Option<String> },

    /// Header already at the target state; nothing to write, though a
    /// canonical-rename stage may still need to move the file
    AlreadyReconciled { station_id: Option<String> },

    /// No authoritative match; the no-match policy decides
    NoMatch,

    /// Terminal skip with its reason
    Declined(ReconcileOutcome),
}

/// Applies one pipeline stage to individual files
pub struct FileReconciler {
    stage: StageKind,
    policy: StagePolicy,
}

impl FileReconciler {
    pub fn new(stage: StageKind, policy: StagePolicy) -> Self {
        Self { stage, policy }
    }

    /// Full header reconciliation against a reference table
    ///
    /// Matched files are rewritten into `out_dir` under canonical names;
    /// unmatched files are copied through unchanged.
    pub fn reconcile(
        registry: StationRegistry,
        projector: Box<dyn Project>,
        out_dir: PathBuf,
    ) -> Self {
        Self::new(
            StageKind::Reconcile {
                registry,
                projector,
            },
            StagePolicy {
                no_match: NoMatchPolicy::CopyUnchanged,
                output: OutputMode::Directory { out_dir },
                rename: RenameMode::CanonicalId,
                overwrite: OverwritePolicy::Allow,
            },
        )
    }

    /// Verbatim geolocation copy from an authority file set, in place
    pub fn patch_coords(
        authority: HeaderAuthority,
        target_ids: Option<HashSet<i64>>,
        backup: bool,
    ) -> Self {
        Self::new(
            StageKind::PatchCoords {
                authority,
                target_ids,
            },
            StagePolicy::in_place(backup),
        )
    }

    /// Station id remapping through a CSV table
    ///
    /// The header is rewritten in place; the file is then renamed to its
    /// canonical `{new_id}.smet` name unless that name is already taken.
    pub fn remap_ids(table: RemapTable, backup: bool) -> Self {
        Self::new(
            StageKind::RemapIds { table },
            StagePolicy {
                no_match: NoMatchPolicy::Skip,
                output: OutputMode::InPlace { backup },
                rename: RenameMode::CanonicalId,
                overwrite: OverwritePolicy::Decline,
            },
        )
    }

    /// Positional `units_multiplier` edit for one channel, in place
    pub fn set_multiplier(channel: String, value: String, backup: bool) -> Self {
        Self::new(
            StageKind::SetMultiplier { channel, value },
            StagePolicy::in_place(backup),
        )
    }

    /// Copy files under canonical `{station_id}.smet` names, never
    /// overwriting an existing target
    pub fn rename_by_id(out_dir: PathBuf) -> Self {
        Self::new(
            StageKind::RenameById,
            StagePolicy {
                no_match: NoMatchPolicy::Skip,
                output: OutputMode::Directory { out_dir },
                rename: RenameMode::CanonicalId,
                overwrite: OverwritePolicy::Decline,
            },
        )
    }

    /// Copy through only files whose station name is in the keep-set
    pub fn filter_by_name(names: HashSet<String>, out_dir: PathBuf) -> Self {
        Self::new(
            StageKind::FilterByName { names },
            StagePolicy {
                no_match: NoMatchPolicy::Skip,
                output: OutputMode::Directory { out_dir },
                rename: RenameMode::Keep,
                overwrite: OverwritePolicy::Allow,
            },
        )
    }

    pub fn policy(&self) -> &StagePolicy {
        &self.policy
    }

    /// Reconcile a single file, returning its terminal outcome
    ///
    /// A header that cannot be parsed is an outcome
    /// ([`ReconcileOutcome::SkippedMalformed`]), not an error; errors are
    /// reserved for I/O and projection failures.
    pub fn reconcile_file(&self, path: &Path) -> Result<ReconcileOutcome> {
        let smet = match SmetFile::read(path) {
            Ok(smet) => smet,
            Err(Error::MalformedHeader { reason, .. }) => {
                return Ok(ReconcileOutcome::SkippedMalformed(reason));
            }
            Err(e) => return Err(e),
        };

        let plan = self.plan(smet)?;
        self.execute(path, plan)
    }

    /// Decide what to do with a parsed file
    fn plan(&self, mut smet: SmetFile) -> Result<StagePlan> {
        match &self.stage {
            StageKind::Reconcile {
                registry,
                projector,
            } => {
                // A header without its lookup key is structurally unusable,
                // same as a header that failed to parse
                let station_name = match smet.station_name() {
                    Some(name) => name.to_string(),
                    None => {
                        return Ok(StagePlan::Declined(ReconcileOutcome::SkippedMalformed(
                            format!("header has no {} line", fields::STATION_NAME),
                        )));
                    }
                };

                let Some(record) = registry.by_name(&station_name) else {
                    return Ok(StagePlan::NoMatch);
                };

                let (easting, northing) = projector.project(record.longitude, record.latitude)?;
                let updates = header_merge::updates_from_record(
                    record,
                    easting,
                    northing,
                    projector.target_epsg(),
                );

                let changed = header_merge::apply_updates(&mut smet.header, &updates);
                if changed == 0 && matches!(self.policy.output, OutputMode::InPlace { .. }) {
                    return Ok(StagePlan::AlreadyReconciled { station_id: None });
                }

                Ok(StagePlan::WriteModified(smet))
            }

            StageKind::PatchCoords {
                authority,
                target_ids,
            } => {
                if !smet.header.contains(fields::STATION_ID) {
                    return Ok(StagePlan::Declined(ReconcileOutcome::SkippedMalformed(
                        format!("header has no {} line", fields::STATION_ID),
                    )));
                }

                // A non-numeric id cannot appear in the authority index
                let Some(station_id) = smet.station_id_numeric() else {
                    return Ok(StagePlan::NoMatch);
                };

                if let Some(targets) = target_ids {
                    if !targets.contains(&station_id) {
                        return Ok(StagePlan::NoMatch);
                    }
                }

                let Some(authority_header) = authority.get(station_id) else {
                    return Ok(StagePlan::NoMatch);
                };

                match header_merge::plan_geo_copy(authority_header, GEO_COPY_FIELDS) {
                    Err(missing) => Ok(StagePlan::Declined(
                        ReconcileOutcome::SkippedMissingField(missing.join(", ")),
                    )),
                    Ok(updates) => {
                        if header_merge::apply_updates(&mut smet.header, &updates) == 0 {
                            Ok(StagePlan::AlreadyReconciled { station_id: None })
                        } else {
                            Ok(StagePlan::WriteModified(smet))
                        }
                    }
                }
            }

            StageKind::RemapIds { table } => {
                let current_id = match smet.station_id() {
                    Some(id) => id.to_string(),
                    None => {
                        return Ok(StagePlan::Declined(ReconcileOutcome::SkippedMalformed(
                            format!("header has no {} line", fields::STATION_ID),
                        )));
                    }
                };

                let Some(new_id) = table.lookup(&current_id) else {
                    return Ok(StagePlan::NoMatch);
                };

                // An identity mapping needs no rewrite, but the file may
                // still sit under a non-canonical name
                if new_id == current_id {
                    return Ok(StagePlan::AlreadyReconciled {
                        station_id: Some(current_id),
                    });
                }

                let new_id = new_id.to_string();
                smet.header.set(fields::STATION_ID, new_id);
                Ok(StagePlan::WriteModified(smet))
            }

            StageKind::SetMultiplier { channel, value } => {
                let Some(fields_line) = smet.header.get(fields::FIELDS).map(str::to_string)
                else {
                    return Ok(StagePlan::Declined(ReconcileOutcome::SkippedMissingField(
                        fields::FIELDS.to_string(),
                    )));
                };
                let Some(multiplier_line) =
                    smet.header.get(fields::UNITS_MULTIPLIER).map(str::to_string)
                else {
                    return Ok(StagePlan::Declined(ReconcileOutcome::SkippedMissingField(
                        fields::UNITS_MULTIPLIER.to_string(),
                    )));
                };

                match header_merge::set_channel_multiplier(
                    &fields_line,
                    &multiplier_line,
                    channel,
                    value,
                ) {
                    Err(UnitsEditError::ChannelNotFound { channel }) => Ok(StagePlan::Declined(
                        ReconcileOutcome::SkippedMissingField(channel),
                    )),
                    // A length mismatch means one of the two declarations is
                    // short a field; classified with the other field gaps
                    Err(mismatch @ UnitsEditError::TokenCountMismatch { .. }) => Ok(
                        StagePlan::Declined(ReconcileOutcome::SkippedMissingField(
                            mismatch.to_string(),
                        )),
                    ),
                    Ok(edit) if !edit.changed => {
                        Ok(StagePlan::AlreadyReconciled { station_id: None })
                    }
                    Ok(edit) => {
                        smet.header.set(fields::UNITS_MULTIPLIER, edit.line);
                        Ok(StagePlan::WriteModified(smet))
                    }
                }
            }

            StageKind::RenameById => match smet.station_id() {
                Some(id) => Ok(StagePlan::CopyVerbatim {
                    rename_to: Some(constants::canonical_file_name(id)),
                }),
                None => Ok(StagePlan::Declined(ReconcileOutcome::SkippedMalformed(
                    format!("header has no {} line", fields::STATION_ID),
                ))),
            },

            StageKind::FilterByName { names } => match smet.station_name() {
                Some(name) if names.contains(name) => {
                    Ok(StagePlan::CopyVerbatim { rename_to: None })
                }
                Some(_) => Ok(StagePlan::NoMatch),
                None => Ok(StagePlan::Declined(ReconcileOutcome::SkippedMalformed(
                    format!("header has no {} line", fields::STATION_NAME),
                ))),
            },
        }
    }

    /// Carry out a plan under the stage policy
    fn execute(&self, path: &Path, plan: StagePlan) -> Result<ReconcileOutcome> {
        match plan {
            StagePlan::Declined(outcome) => Ok(outcome),

            StagePlan::AlreadyReconciled { station_id } => {
                if self.policy.rename == RenameMode::CanonicalId
                    && matches!(self.policy.output, OutputMode::InPlace { .. })
                {
                    if let Some(id) = &station_id {
                        return Ok(match rename_in_place(path, id)? {
                            RenameResult::Renamed => ReconcileOutcome::Updated,
                            RenameResult::AlreadyCanonical => ReconcileOutcome::Unchanged,
                            RenameResult::Declined(target) => {
                                ReconcileOutcome::RenameDeclined(target)
                            }
                        });
                    }
                }
                Ok(ReconcileOutcome::Unchanged)
            }

            StagePlan::NoMatch => match (&self.policy.no_match, &self.policy.output) {
                (NoMatchPolicy::CopyUnchanged, OutputMode::Directory { out_dir }) => {
                    let dest = out_dir.join(file_name(path)?);
                    io::copy_verbatim(path, &dest)?;
                    debug!("Copied {} unchanged (no match)", path.display());
                    Ok(ReconcileOutcome::CopiedUnchanged)
                }
                _ => Ok(ReconcileOutcome::SkippedNoMatch),
            },

            StagePlan::CopyVerbatim { rename_to } => {
                let OutputMode::Directory { out_dir } = &self.policy.output else {
                    // A verbatim copy onto itself is a no-op
                    return Ok(ReconcileOutcome::Unchanged);
                };

                let outcome = if rename_to.is_some() {
                    ReconcileOutcome::Updated
                } else {
                    ReconcileOutcome::CopiedUnchanged
                };

                let name: OsString = match rename_to {
                    Some(name) => name.into(),
                    None => file_name(path)?.to_os_string(),
                };
                let dest = out_dir.join(&name);

                if self.policy.overwrite == OverwritePolicy::Decline && dest.exists() {
                    return Ok(ReconcileOutcome::RenameDeclined(dest));
                }

                io::copy_verbatim(path, &dest)?;
                debug!("Copied {} to {}", path.display(), dest.display());
                Ok(outcome)
            }

            StagePlan::WriteModified(smet) => {
                let content = smet.render();

                match &self.policy.output {
                    OutputMode::InPlace { backup } => {
                        if *backup {
                            io::ensure_backup(path)?;
                        }
                        io::write_atomic(path, &content)?;
                        debug!("Rewrote {} in place", path.display());

                        if self.policy.rename == RenameMode::CanonicalId {
                            if let Some(id) = smet.station_id() {
                                // Content is already written under the old
                                // name; only the rename can be declined
                                if let RenameResult::Declined(target) =
                                    rename_in_place(path, id)?
                                {
                                    return Ok(ReconcileOutcome::RenameDeclined(target));
                                }
                            }
                        }
                        Ok(ReconcileOutcome::Updated)
                    }
                    OutputMode::Directory { out_dir } => {
                        let name: OsString = match self.policy.rename {
                            RenameMode::CanonicalId => match smet.station_id() {
                                Some(id) => constants::canonical_file_name(id).into(),
                                None => file_name(path)?.to_os_string(),
                            },
                            RenameMode::Keep => file_name(path)?.to_os_string(),
                        };
                        let dest = out_dir.join(&name);

                        if self.policy.overwrite == OverwritePolicy::Decline && dest.exists() {
                            return Ok(ReconcileOutcome::RenameDeclined(dest));
                        }

                        io::write_atomic(&dest, &content)?;
                        debug!("Wrote {} to {}", path.display(), dest.display());
                        Ok(ReconcileOutcome::Updated)
                    }
                }
            }
        }
    }
}

/// How an in-place canonical rename ended
enum RenameResult {
    Renamed,
    AlreadyCanonical,
    Declined(PathBuf),
}

/// Move a file to its canonical `{station_id}.smet` sibling name
///
/// An existing file under the canonical name is never overwritten; the
/// rename is declined and the occupied path returned.
fn rename_in_place(path: &Path, station_id: &str) -> Result<RenameResult> {
    let name = constants::canonical_file_name(station_id);
    if file_name(path)? == OsStr::new(&name) {
        return Ok(RenameResult::AlreadyCanonical);
    }

    let target = path.with_file_name(&name);
    if target.exists() {
        return Ok(RenameResult::Declined(target));
    }

    fs::rename(path, &target).map_err(|e| {
        Error::io(
            format!(
                "failed to rename '{}' to '{}'",
                path.display(),
                target.display()
            ),
            e,
        )
    })?;
    debug!("Renamed {} to {}", path.display(), target.display());
    Ok(RenameResult::Renamed)
}

/// File name component of an input path
fn file_name(path: &Path) -> Result<&OsStr> {
    path.file_name().ok_or_else(|| {
        Error::configuration(format!("input path has no file name: {}", path.display()))
    })
}
