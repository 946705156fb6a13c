//! Subcommand implementations for the SMET reconciler CLI
//!
//! Every subcommand follows the same shape: load layered configuration, set
//! up logging, validate arguments, build the stage's collaborators (reference
//! table, authority scan, projection), then hand one configured
//! [`FileReconciler`] to a [`BatchRunner`] and print the end-of-run summary.

use crate::app::models::BatchSummary;
use crate::app::services::reconciler::{BatchRunner, FileReconciler};
use crate::app::services::reproject::EtrsLaea;
use crate::app::services::station_registry::{
    HeaderAuthority, RemapTable, StationRegistry, station_names_in,
};
use crate::cli::args::{
    Commands, FilterArgs, PatchCoordsArgs, ReconcileArgs, RemapIdsArgs, RenameArgs,
    SetMultiplierArgs,
};
use crate::config::Config;
use crate::Result;
use colored::*;
use std::path::Path;
use tracing::{debug, info};

/// Dispatch a parsed subcommand to its runner
pub fn run(command: Commands) -> Result<BatchSummary> {
    match command {
        Commands::Reconcile(args) => run_reconcile(args),
        Commands::PatchCoords(args) => run_patch_coords(args),
        Commands::RemapIds(args) => run_remap_ids(args),
        Commands::SetMultiplier(args) => run_set_multiplier(args),
        Commands::Rename(args) => run_rename(args),
        Commands::Filter(args) => run_filter(args),
    }
}

/// Full header reconciliation against a JSON reference table
fn run_reconcile(args: ReconcileArgs) -> Result<BatchSummary> {
    let config = setup(args.config_file.as_deref(), args.verbose, args.quiet)?;
    args.validate()?;

    info!("Starting header reconciliation");
    let registry = StationRegistry::from_json_file(&args.table)?;
    let projector = EtrsLaea::for_pair(config.reproject.source_epsg, config.reproject.target_epsg)?;

    let reconciler =
        FileReconciler::reconcile(registry, Box::new(projector), args.output_dir.clone());
    let show_progress = args.show_progress() && config.pipeline.show_progress;
    let summary = BatchRunner::new(reconciler, show_progress).run(&args.input_dir)?;

    if !args.quiet {
        print_summary("Reconciliation Summary", &summary);
    }
    Ok(summary)
}

/// Verbatim geolocation copy from an authority file set
fn run_patch_coords(args: PatchCoordsArgs) -> Result<BatchSummary> {
    let config = setup(args.config_file.as_deref(), args.verbose, args.quiet)?;
    args.validate()?;

    info!("Starting coordinate patching");
    let show_progress = args.show_progress() && config.pipeline.show_progress;
    let (authority, scan_stats) = HeaderAuthority::from_directory(&args.authority_dir, show_progress)?;
    if scan_stats.has_errors() {
        debug!(
            "Authority scan skipped {} unreadable files",
            scan_stats.errors.len()
        );
    }

    let target_ids = args.target_ids.as_ref().map(|list| list.ids.clone());
    let backup = !args.no_backup && config.pipeline.backup;

    let reconciler = FileReconciler::patch_coords(authority, target_ids, backup);
    let summary = BatchRunner::new(reconciler, show_progress).run(&args.input_dir)?;

    if !args.quiet {
        print_summary("Coordinate Patch Summary", &summary);
    }
    Ok(summary)
}

/// Station id remapping through a CSV table
fn run_remap_ids(args: RemapIdsArgs) -> Result<BatchSummary> {
    let config = setup(args.config_file.as_deref(), args.verbose, args.quiet)?;
    args.validate()?;

    info!("Starting station id remapping");
    let from_column = args
        .from_column
        .as_deref()
        .unwrap_or(&config.remap.from_column);
    let to_column = args.to_column.as_deref().unwrap_or(&config.remap.to_column);
    let table = RemapTable::from_csv_file(&args.table, from_column, to_column)?;

    let backup = !args.no_backup && config.pipeline.backup;
    let reconciler = FileReconciler::remap_ids(table, backup);
    let show_progress = args.show_progress() && config.pipeline.show_progress;
    let summary = BatchRunner::new(reconciler, show_progress).run(&args.input_dir)?;

    if !args.quiet {
        print_summary("Id Remap Summary", &summary);
    }
    Ok(summary)
}

/// units_multiplier edit for one channel
fn run_set_multiplier(args: SetMultiplierArgs) -> Result<BatchSummary> {
    let config = setup(args.config_file.as_deref(), args.verbose, args.quiet)?;
    args.validate()?;

    let channel = args
        .channel
        .clone()
        .unwrap_or_else(|| config.multiplier.channel.clone());
    let value = args
        .value
        .clone()
        .unwrap_or_else(|| config.multiplier.value.clone());
    info!("Setting {} multiplier to {}", channel, value);

    let backup = !args.no_backup && config.pipeline.backup;
    let reconciler = FileReconciler::set_multiplier(channel, value, backup);
    let show_progress = args.show_progress() && config.pipeline.show_progress;
    let summary = BatchRunner::new(reconciler, show_progress).run(&args.input_dir)?;

    if !args.quiet {
        print_summary("Multiplier Summary", &summary);
    }
    Ok(summary)
}

/// Canonical-name copies to an output directory
fn run_rename(args: RenameArgs) -> Result<BatchSummary> {
    let config = setup(args.config_file.as_deref(), args.verbose, args.quiet)?;
    args.validate()?;

    info!("Starting canonical renaming");
    let reconciler = FileReconciler::rename_by_id(args.output_dir.clone());
    let show_progress = args.show_progress() && config.pipeline.show_progress;
    let summary = BatchRunner::new(reconciler, show_progress).run(&args.input_dir)?;

    if !args.quiet {
        print_summary("Rename Summary", &summary);
    }
    Ok(summary)
}

/// Reference-set filtering into an output directory
fn run_filter(args: FilterArgs) -> Result<BatchSummary> {
    let config = setup(args.config_file.as_deref(), args.verbose, args.quiet)?;
    args.validate()?;

    info!("Starting reference-set filtering");
    let names = station_names_in(&args.reference_dir)?;

    let reconciler = FileReconciler::filter_by_name(names, args.output_dir.clone());
    let show_progress = args.show_progress() && config.pipeline.show_progress;
    let summary = BatchRunner::new(reconciler, show_progress).run(&args.input_dir)?;

    if !args.quiet {
        print_summary("Filter Summary", &summary);
    }
    Ok(summary)
}

/// Load layered configuration and initialize logging
///
/// Verbosity flags win over the configured log level; the configuration
/// only supplies the level when neither `-v` nor `-q` was given.
fn setup(config_file: Option<&Path>, verbose: u8, quiet: bool) -> Result<Config> {
    let config = Config::load_layered(config_file)?;
    config.validate()?;

    let log_level = if quiet || verbose > 0 {
        crate::cli::args::log_level(verbose, quiet)
    } else {
        config.logging.level.as_str()
    };
    setup_logging(log_level);
    debug!("Logging initialized at level: {}", log_level);
    Ok(config)
}

/// Set up structured logging on stderr with an uptime timer
fn setup_logging(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("smet_reconciler={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Print the end-of-run summary block
fn print_summary(title: &str, summary: &BatchSummary) {
    println!("\n{}", title.bright_green().bold());
    println!(
        "  {} {}",
        "Files seen:".bright_cyan(),
        summary.files_seen.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Updated:".bright_cyan(),
        summary.updated.to_string().bright_white().bold()
    );
    if summary.unchanged > 0 {
        println!(
            "  {} {}",
            "Already reconciled:".bright_cyan(),
            summary.unchanged.to_string().bright_white()
        );
    }
    if summary.copied_unchanged > 0 {
        println!(
            "  {} {}",
            "Copied unchanged:".bright_cyan(),
            summary.copied_unchanged.to_string().bright_white()
        );
    }
    if summary.skipped_no_match > 0 {
        println!(
            "  {} {}",
            "Skipped (no match):".yellow(),
            summary.skipped_no_match.to_string().bright_white()
        );
    }
    if summary.skipped_malformed > 0 {
        println!(
            "  {} {}",
            "Skipped (malformed):".yellow(),
            summary.skipped_malformed.to_string().bright_white()
        );
    }
    if summary.skipped_missing_field > 0 {
        println!(
            "  {} {}",
            "Skipped (missing field):".yellow(),
            summary.skipped_missing_field.to_string().bright_white()
        );
    }
    if summary.renames_declined > 0 {
        println!(
            "  {} {}",
            "Renames declined:".bright_red(),
            summary.renames_declined.to_string().bright_red().bold()
        );
    }
    if !summary.failures.is_empty() {
        println!(
            "  {} {}",
            "Failures:".bright_red(),
            summary.failures.len().to_string().bright_red().bold()
        );
        for (path, error) in &summary.failures {
            println!("    {} {}", path.display().to_string().bright_red(), error);
        }
    }
    println!(
        "  {} {:.2}s",
        "Time elapsed:".bright_cyan(),
        summary.elapsed.as_secs_f64()
    );
    println!();
}
