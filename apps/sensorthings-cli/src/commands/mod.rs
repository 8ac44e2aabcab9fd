//! Command implementations

pub mod list;
pub mod yaml;

use sensorthings_client::{EntityType, RemoteResourceCatalog, SensorThingsClient};
use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::CliResult;

/// A connected client plus the optional snapshot of remote entities.
pub struct Session {
    pub config: Config,
    pub client: SensorThingsClient,
    pub catalog: RemoteResourceCatalog,
}

impl Session {
    /// Discover the server's endpoints; refresh the catalog when configured.
    pub async fn connect(config: Config) -> CliResult<Self> {
        debug!(destination = %config.destination, timeout_secs = config.timeout_secs, "connecting");
        let client = SensorThingsClient::connect(&config.destination, config.timeout()).await?;
        info!(
            "Connected to {} ({} collections)",
            client.base_url(),
            client.endpoint_count()
        );

        let mut session = Self {
            config,
            client,
            catalog: RemoteResourceCatalog::new(),
        };
        if session.config.refresh {
            session.refresh().await;
        }
        Ok(session)
    }

    pub async fn refresh(&mut self) {
        self.catalog.refresh(&self.client).await;
        info!("Retrieved {} entities from the server", self.catalog.total());
    }
}

/// Run the parsed command line.
pub async fn execute(cli: Cli) -> CliResult<()> {
    let mut config = Config::resolve(&cli.global)?;
    if let Commands::Yaml(ref args) = cli.command {
        args.validate()?;
        config.refresh = true;
    }

    let session = Session::connect(config).await?;

    match cli.command {
        Commands::Yaml(args) => yaml::execute(args, &session).await,
        Commands::Things(args) => list::execute(EntityType::Thing, args.list_args(), &session).await,
        Commands::Locations(args) => {
            list::execute(EntityType::Location, args.list_args(), &session).await
        }
        Commands::Sensors(args) => list::execute(EntityType::Sensor, args.list_args(), &session).await,
        Commands::ObservedProperties(args) => {
            list::execute(EntityType::ObservedProperty, args.list_args(), &session).await
        }
        Commands::Features(args) => {
            list::execute(EntityType::FeatureOfInterest, args.list_args(), &session).await
        }
        Commands::Datastreams(args) => {
            list::execute(EntityType::Datastream, args.list_args(), &session).await
        }
    }
}
