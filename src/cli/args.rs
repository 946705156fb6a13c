//! Command-line argument definitions for the SMET reconciler
//!
//! One subcommand per reconciliation stage, defined with the clap derive
//! API. Each stage takes its input directory as a positional argument plus
//! the collaborators it needs (reference table, authority directory, output
//! directory), with shared verbosity and config-file flags.

use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the SMET reconciler
///
/// Reconciles station metadata headers across batches of SMET weather
/// station files: matching against reference tables, merging authoritative
/// fields, reprojecting coordinates, and renaming to canonical ids.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "smet-reconciler",
    version,
    about = "Reconcile station metadata headers across batches of SMET station files",
    long_about = "Reconciles meteorological station metadata across heterogeneous batches of \
                  SMET observation files. Matches files against authoritative reference tables, \
                  overwrites identity and geolocation header fields, reprojects coordinates to \
                  the European equal-area grid, renames files to canonical station ids with \
                  collision safety, and patches unit-scaling metadata. The tabular [DATA] \
                  payload of every file is preserved byte-for-byte."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available reconciliation stages
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Reconcile headers against a JSON reference table (match by name)
    Reconcile(ReconcileArgs),
    /// Copy geolocation fields from an authority file set (match by id)
    PatchCoords(PatchCoordsArgs),
    /// Rewrite station ids through a remap table and rename canonically
    RemapIds(RemapIdsArgs),
    /// Set the units_multiplier entry for one measurement channel
    SetMultiplier(SetMultiplierArgs),
    /// Copy files under their canonical {station_id}.smet names
    Rename(RenameArgs),
    /// Keep only files whose station name appears in a reference set
    Filter(FilterArgs),
}

/// Arguments for the reconcile command (full header reconciliation)
#[derive(Debug, Clone, Parser)]
pub struct ReconcileArgs {
    /// Directory of SMET files to reconcile
    #[arg(value_name = "INPUT_DIR", help = "Directory of SMET files to reconcile")]
    pub input_dir: PathBuf,

    /// JSON reference metadata table
    ///
    /// A document with a "data" array of station records. Matched stations
    /// have their identity and geolocation header fields overwritten from
    /// this table; unmatched files are copied through unchanged.
    #[arg(
        short = 't',
        long = "table",
        value_name = "FILE",
        help = "JSON reference metadata table"
    )]
    pub table: PathBuf,

    /// Output directory for reconciled files
    ///
    /// Created if absent. Matched files land as {station_id}.smet;
    /// unmatched files keep their original names. Inputs are not modified.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory for reconciled files"
    )]
    pub output_dir: PathBuf,

    /// Path to configuration file
    ///
    /// TOML configuration file for defaults. If not specified, looks for
    /// ~/.config/smet_reconciler/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the patch-coords command (authority geolocation copy)
#[derive(Debug, Clone, Parser)]
pub struct PatchCoordsArgs {
    /// Directory of SMET files to patch in place
    #[arg(
        value_name = "INPUT_DIR",
        help = "Directory of SMET files to patch in place"
    )]
    pub input_dir: PathBuf,

    /// Authority directory of SMET files
    ///
    /// Scanned recursively; files are indexed by their embedded station_id
    /// header line. Geolocation values are copied verbatim from the
    /// matching authority header, all fields or none.
    #[arg(
        short = 'a',
        long = "authority",
        value_name = "DIR",
        help = "Authority directory of SMET files"
    )]
    pub authority_dir: PathBuf,

    /// Restrict patching to specific station ids (comma-separated)
    ///
    /// Stations outside this set are skipped even when the authority
    /// carries a record for them. If not specified, every matched station
    /// is patched.
    #[arg(
        long = "ids",
        value_name = "LIST",
        help = "Comma-separated station ids to patch (default: all matched)"
    )]
    pub target_ids: Option<IdList>,

    /// Skip the .bak backup before the first in-place edit
    #[arg(long = "no-backup", help = "Do not keep .bak backup siblings")]
    pub no_backup: bool,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the remap-ids command (station id remapping)
#[derive(Debug, Clone, Parser)]
pub struct RemapIdsArgs {
    /// Directory of SMET files to remap in place
    #[arg(
        value_name = "INPUT_DIR",
        help = "Directory of SMET files to remap in place"
    )]
    pub input_dir: PathBuf,

    /// CSV remap table (source id to canonical station id)
    ///
    /// A header row names the columns; the defaults are ingestion_id and
    /// station_id, configurable below. Matched files have their station_id
    /// header rewritten and are renamed to {new_id}.smet unless that name
    /// is already taken.
    #[arg(
        short = 't',
        long = "table",
        value_name = "FILE",
        help = "CSV remap table (source id to canonical station id)"
    )]
    pub table: PathBuf,

    /// Remap table column holding the ids to replace
    #[arg(
        long = "from-column",
        value_name = "NAME",
        help = "Remap table column holding the ids to replace [default: ingestion_id]"
    )]
    pub from_column: Option<String>,

    /// Remap table column holding the canonical ids
    #[arg(
        long = "to-column",
        value_name = "NAME",
        help = "Remap table column holding the canonical ids [default: station_id]"
    )]
    pub to_column: Option<String>,

    /// Skip the .bak backup before the first in-place edit
    #[arg(long = "no-backup", help = "Do not keep .bak backup siblings")]
    pub no_backup: bool,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the set-multiplier command (units_multiplier edit)
#[derive(Debug, Clone, Parser)]
pub struct SetMultiplierArgs {
    /// Directory of SMET files to edit in place
    #[arg(
        value_name = "INPUT_DIR",
        help = "Directory of SMET files to edit in place"
    )]
    pub input_dir: PathBuf,

    /// Measurement channel whose multiplier is set
    #[arg(
        long = "channel",
        value_name = "NAME",
        help = "Measurement channel whose multiplier is set [default: PSUM]"
    )]
    pub channel: Option<String>,

    /// Multiplier value to write for the channel
    ///
    /// Written as-is at the channel's position in units_multiplier; every
    /// other token is preserved verbatim. Files already at this value are
    /// reported unchanged and not rewritten.
    #[arg(
        long = "value",
        value_name = "VALUE",
        help = "Multiplier value to write for the channel [default: 1]"
    )]
    pub value: Option<String>,

    /// Skip the .bak backup before the first in-place edit
    #[arg(long = "no-backup", help = "Do not keep .bak backup siblings")]
    pub no_backup: bool,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the rename command (canonical-name copies)
#[derive(Debug, Clone, Parser)]
pub struct RenameArgs {
    /// Directory of SMET files to copy
    #[arg(value_name = "INPUT_DIR", help = "Directory of SMET files to copy")]
    pub input_dir: PathBuf,

    /// Output directory for renamed copies
    ///
    /// Created if absent. Each file is copied byte-for-byte as
    /// {station_id}.smet; existing targets are never overwritten. Inputs
    /// are not modified.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory for renamed copies"
    )]
    pub output_dir: PathBuf,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the filter command (reference-set filtering)
#[derive(Debug, Clone, Parser)]
pub struct FilterArgs {
    /// Directory of SMET files to filter
    #[arg(value_name = "INPUT_DIR", help = "Directory of SMET files to filter")]
    pub input_dir: PathBuf,

    /// Reference directory of SMET files defining the keep-set
    ///
    /// The distinct station_name values found under this directory form
    /// the keep-set; only input files whose station_name is in the set are
    /// copied to the output directory.
    #[arg(
        short = 'r',
        long = "reference",
        value_name = "DIR",
        help = "Reference directory of SMET files defining the keep-set"
    )]
    pub reference_dir: PathBuf,

    /// Output directory for kept files
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory for kept files"
    )]
    pub output_dir: PathBuf,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Wrapper for parsing comma-separated station id lists
#[derive(Debug, Clone)]
pub struct IdList {
    pub ids: HashSet<i64>,
}

impl FromStr for IdList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut ids = HashSet::new();

        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let id: i64 = part.parse().map_err(|_| {
                Error::configuration(format!("invalid station id '{part}' in id list"))
            })?;
            ids.insert(id);
        }

        if ids.is_empty() {
            return Err(Error::configuration("station id list cannot be empty"));
        }

        Ok(IdList { ids })
    }
}

/// Map verbosity flags to the log level every subcommand shares
pub(crate) fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Input directory and config file checks shared by every subcommand
fn validate_common(input_dir: &std::path::Path, config_file: Option<&PathBuf>) -> Result<()> {
    if !input_dir.exists() {
        return Err(Error::configuration(format!(
            "input directory does not exist: {}",
            input_dir.display()
        )));
    }
    if !input_dir.is_dir() {
        return Err(Error::configuration(format!(
            "input path is not a directory: {}",
            input_dir.display()
        )));
    }

    if let Some(config_file) = config_file {
        if !config_file.exists() {
            return Err(Error::configuration(format!(
                "config file does not exist: {}",
                config_file.display()
            )));
        }
    }

    Ok(())
}

/// Check that a named reference file exists
fn validate_table(table: &std::path::Path) -> Result<()> {
    if !table.is_file() {
        return Err(Error::configuration(format!(
            "reference table does not exist: {}",
            table.display()
        )));
    }
    Ok(())
}

/// Check that a named reference directory exists
fn validate_reference_dir(dir: &std::path::Path, what: &str) -> Result<()> {
    if !dir.is_dir() {
        return Err(Error::configuration(format!(
            "{what} directory does not exist: {}",
            dir.display()
        )));
    }
    Ok(())
}

impl ReconcileArgs {
    /// Validate the reconcile command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_common(&self.input_dir, self.config_file.as_ref())?;
        validate_table(&self.table)
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl PatchCoordsArgs {
    /// Validate the patch-coords command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_common(&self.input_dir, self.config_file.as_ref())?;
        validate_reference_dir(&self.authority_dir, "authority")
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl RemapIdsArgs {
    /// Validate the remap-ids command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_common(&self.input_dir, self.config_file.as_ref())?;
        validate_table(&self.table)
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl SetMultiplierArgs {
    /// Validate the set-multiplier command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_common(&self.input_dir, self.config_file.as_ref())?;

        if let Some(channel) = &self.channel {
            if !crate::constants::is_valid_field_name(channel) {
                return Err(Error::configuration(format!(
                    "invalid channel name '{channel}'"
                )));
            }
        }
        if let Some(value) = &self.value {
            if value.trim().is_empty() || value.split_whitespace().count() != 1 {
                return Err(Error::configuration(
                    "multiplier value must be a single token",
                ));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl RenameArgs {
    /// Validate the rename command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_common(&self.input_dir, self.config_file.as_ref())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl FilterArgs {
    /// Validate the filter command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_common(&self.input_dir, self.config_file.as_ref())?;
        validate_reference_dir(&self.reference_dir, "reference")
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}
