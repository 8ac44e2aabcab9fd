//! List entities of one type

use clap::Args;
use sensorthings_client::entity::EntityRecord;
use sensorthings_client::{EntityType, ResourceGateway};

use super::Session;
use crate::error::{CliError, CliResult};
use crate::output::print_entity_list;

pub const DEFAULT_COUNT: usize = 10;

/// Arguments for the list command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Maximum number of entities to retrieve
    #[arg(short, long, default_value_t = DEFAULT_COUNT)]
    pub count: usize,

    /// Offset of the first entity to retrieve
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            offset: 0,
            json: false,
        }
    }
}

/// Fetch one page of `resource` as requested by `args`.
pub async fn fetch<G: ResourceGateway + ?Sized>(
    gateway: &G,
    resource: EntityType,
    args: &ListArgs,
) -> CliResult<Vec<EntityRecord>> {
    if args.count == 0 {
        return Err(CliError::Validation("Count must be at least 1.".to_string()));
    }
    Ok(gateway.list(resource, args.count, args.offset).await?)
}

pub async fn execute(resource: EntityType, args: ListArgs, session: &Session) -> CliResult<()> {
    let entities = fetch(&session.client, resource, &args).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entities)?);
    } else {
        print_entity_list(resource, &entities);
    }
    Ok(())
}
