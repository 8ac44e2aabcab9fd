//! sensor-things - command-line interface for SensorThings API servers
//!
//! This CLI enables operators to:
//! - Load Things, Sensors, Datastreams and related entities from YAML files
//! - List the entities of a type on the server

use clap::Parser;

use sensorthings_cli::cli::Cli;
use sensorthings_cli::commands;
use sensorthings_cli::logging::{init_logging, Verbosity};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(Verbosity::from_flags(cli.global.verbose, cli.global.silent));

    match commands::execute(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}
