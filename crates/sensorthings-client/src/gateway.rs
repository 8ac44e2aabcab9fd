//! The remote-resource capability the reconciliation engine is written against.
//!
//! Implementors only provide the two network primitives (`list` and `post`);
//! name-or-id search and idempotent creation are shared on top of them.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::entity::{matches_name_or_id, record_id, record_lookup_key, record_name, EntityRecord, EntityType};
use crate::error::{StaClientError, StaClientResult};

/// Page size used when scanning a collection for a name or identifier.
pub const SEARCH_PAGE_SIZE: usize = 20;

/// Result of an idempotent create.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// A new entity was created; holds the server's canonical record.
    Created(EntityRecord),
    /// A matching entity already existed and was returned unchanged.
    Existing(EntityRecord),
}

impl CreateOutcome {
    #[must_use]
    pub fn record(&self) -> &EntityRecord {
        match self {
            CreateOutcome::Created(r) | CreateOutcome::Existing(r) => r,
        }
    }

    #[must_use]
    pub fn into_record(self) -> EntityRecord {
        match self {
            CreateOutcome::Created(r) | CreateOutcome::Existing(r) => r,
        }
    }

    #[must_use]
    pub fn was_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// Fetch one page of a collection (`$top` / `$skip`).
    async fn list(
        &self,
        resource: EntityType,
        top: usize,
        skip: usize,
    ) -> StaClientResult<Vec<EntityRecord>>;

    /// Issue a create request and return the server's canonical record.
    async fn post(&self, resource: EntityType, record: &EntityRecord) -> StaClientResult<EntityRecord>;

    /// Find the first record whose name or identifier equals `name_or_id`.
    ///
    /// Pages through the collection in chunks of [`SEARCH_PAGE_SIZE`] and stops
    /// at the first match, or with `NotFound` once a short page has been seen.
    async fn search_by_name_or_id(
        &self,
        resource: EntityType,
        name_or_id: &str,
    ) -> StaClientResult<EntityRecord> {
        let mut offset = 0;
        loop {
            let page = self.list(resource, SEARCH_PAGE_SIZE, offset).await?;
            let page_len = page.len();

            if let Some(found) = page
                .into_iter()
                .find(|item| matches_name_or_id(item, name_or_id))
            {
                return Ok(found);
            }

            if page_len < SEARCH_PAGE_SIZE {
                return Err(StaClientError::NotFound {
                    resource,
                    name_or_id: name_or_id.to_string(),
                });
            }

            offset += SEARCH_PAGE_SIZE;
        }
    }

    /// Create `record`, returning an existing match instead when
    /// `only_if_not_exists` is set and one is found by id or name.
    async fn create(
        &self,
        resource: EntityType,
        record: &EntityRecord,
        only_if_not_exists: bool,
    ) -> StaClientResult<CreateOutcome> {
        if only_if_not_exists {
            if let Some(key) = record_lookup_key(record) {
                match self.search_by_name_or_id(resource, &key).await {
                    Ok(existing) => {
                        debug!(resource = %resource, key = %key, "entity already exists, skipping create");
                        return Ok(CreateOutcome::Existing(existing));
                    }
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            } else {
                warn!(
                    resource = %resource,
                    "{} has neither @iot.id nor name; it cannot be matched against existing entities and is created unconditionally",
                    resource.display_name()
                );
            }
        }

        let created = self.post(resource, record).await?;
        info!(
            "Created new {}: {} ({})",
            resource.display_name(),
            record_id(&created).unwrap_or_default(),
            record_name(&created).unwrap_or_default()
        );
        Ok(CreateOutcome::Created(created))
    }
}
