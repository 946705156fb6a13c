use clap::Parser;
use smet_reconciler::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    match commands::run(command) {
        Ok(_summary) => {
            // Success - the summary has already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("SMET Reconciler - Station Metadata Header Repair");
    println!("================================================");
    println!();
    println!("Reconcile the [HEADER] section of SMET weather station files against");
    println!("authoritative reference metadata, leaving measurement data untouched.");
    println!();
    println!("USAGE:");
    println!("    smet-reconciler <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    reconcile         Rewrite headers from a JSON reference table (main command)");
    println!("    patch-coords      Copy geolocation fields from an authority file set");
    println!("    remap-ids         Replace station ids through a CSV remap table");
    println!("    set-multiplier    Set one channel's units_multiplier value");
    println!("    rename            Copy files under canonical {{station_id}}.smet names");
    println!("    filter            Keep only files whose station appears in a reference set");
    println!("    help              Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Reconcile a directory against a reference table:");
    println!("    smet-reconciler reconcile ./raw --table stations.json --output ./reconciled");
    println!();
    println!("    # Patch coordinates from a trusted directory, for two stations only:");
    println!("    smet-reconciler patch-coords ./data --authority ./trusted --ids 42,117");
    println!();
    println!("    # Remap ingestion ids to canonical station ids:");
    println!("    smet-reconciler remap-ids ./data --table remap.csv");
    println!();
    println!("    # Get help for specific commands:");
    println!("    smet-reconciler reconcile --help");
    println!("    smet-reconciler patch-coords --help");
    println!();
    println!("For detailed help on any command, use:");
    println!("    smet-reconciler <COMMAND> --help");
}
