//! Batch processing across an input directory

use crate::app::models::BatchSummary;
use crate::constants;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{FileReconciler, OutputMode};

/// Drives one reconciliation stage across every file in a directory
pub struct BatchRunner {
    reconciler: FileReconciler,
    show_progress: bool,
}

impl BatchRunner {
    pub fn new(reconciler: FileReconciler, show_progress: bool) -> Self {
        Self {
            reconciler,
            show_progress,
        }
    }

    /// Reconcile every SMET file directly inside `input_dir`
    ///
    /// Discovery is non-recursive and sorted by name so runs are
    /// reproducible. Per-file failures are recorded in the summary and
    /// never abort the batch; only a missing input directory or an
    /// uncreatable output directory is fatal.
    pub fn run(&self, input_dir: &Path) -> Result<BatchSummary> {
        if !input_dir.is_dir() {
            return Err(Error::configuration(format!(
                "input directory does not exist: {}",
                input_dir.display()
            )));
        }

        if let OutputMode::Directory { out_dir } = &self.reconciler.policy().output {
            fs::create_dir_all(out_dir).map_err(|e| {
                Error::io(
                    format!("failed to create output directory '{}'", out_dir.display()),
                    e,
                )
            })?;
        }

        let start_time = Instant::now();

        let files = discover_smet_files(input_dir)?;
        info!(
            "Found {} SMET files in {}",
            files.len(),
            input_dir.display()
        );

        let mut summary = BatchSummary::new();
        summary.files_seen = files.len();

        let progress_bar = if self.show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb.set_message("Reconciling files...");
            Some(pb)
        } else {
            None
        };

        for (file_index, path) in files.iter().enumerate() {
            if let Some(pb) = &progress_bar {
                pb.set_position(file_index as u64);
                pb.set_message(format!(
                    "Reconciling {}",
                    path.file_name().unwrap_or_default().to_string_lossy()
                ));
            }

            match self.reconciler.reconcile_file(path) {
                Ok(outcome) => {
                    if outcome.needs_attention() {
                        warn!("{}: {}", path.display(), outcome);
                    } else {
                        debug!("{}: {}", path.display(), outcome);
                    }
                    summary.record(&outcome);
                }
                Err(e) => {
                    warn!("Failed to reconcile {}: {}", path.display(), e);
                    summary.record_failure(path, &e);
                }
            }
        }

        if let Some(pb) = &progress_bar {
            pb.finish_with_message("Reconciliation complete");
        }

        summary.elapsed = start_time.elapsed();

        info!(
            "Batch complete: {} updated, {} unchanged, {} copied, {} skipped, {} failures in {:.2}s",
            summary.updated,
            summary.unchanged,
            summary.copied_unchanged,
            summary.total_skipped(),
            summary.failures.len(),
            summary.elapsed.as_secs_f64()
        );

        Ok(summary)
    }
}

/// Enumerate the SMET files directly inside a directory, sorted by name
///
/// Subdirectories are not descended into; batches operate on one flat
/// directory at a time. `.bak` siblings are excluded by extension.
pub fn discover_smet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).max_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            Error::directory_traversal(format!("failed to read '{}'", dir.display()), e)
        })?;
        if entry.file_type().is_file() && constants::is_smet_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}
