//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::list::ListArgs;
use crate::commands::yaml::YamlArgs;

/// Interact with a SensorThings API instance
#[derive(Parser, Debug)]
#[command(name = "sensor-things")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Log debug output
    #[arg(short, long, conflicts_with = "silent")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub silent: bool,

    /// SensorThings destination URL [default: http://localhost:8080]
    #[arg(short, long, value_name = "URL")]
    pub destination: Option<String>,

    /// Upon startup, retrieve entities from the server
    #[arg(short, long)]
    pub refresh: bool,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Read settings from this JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create SensorThings data from YAML files (implies --refresh)
    Yaml(YamlArgs),

    /// List Things
    Things(EntityArgs),

    /// List Locations
    Locations(EntityArgs),

    /// List Sensors
    Sensors(EntityArgs),

    /// List ObservedProperties
    #[command(name = "observedProperties")]
    ObservedProperties(EntityArgs),

    /// List FeaturesOfInterest
    Features(EntityArgs),

    /// List Datastreams
    Datastreams(EntityArgs),
}

#[derive(Args, Debug)]
pub struct EntityArgs {
    #[command(subcommand)]
    pub command: Option<EntityCommands>,
}

impl EntityArgs {
    /// Arguments for the listing; a bare entity command lists with defaults.
    pub fn list_args(self) -> ListArgs {
        match self.command {
            Some(EntityCommands::List(args)) => args,
            None => ListArgs::default(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum EntityCommands {
    /// List entities of this type
    List(ListArgs),
}
