//! Local snapshot of remote entities, for listing and inspection only.
//!
//! Reference resolution never consults the catalog; it always queries the
//! server live.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::entity::{record_id, EntityRecord, EntityType};
use crate::gateway::ResourceGateway;

/// Page size used for each collection during a refresh.
pub const REFRESH_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct RemoteResourceCatalog {
    entities: HashMap<EntityType, BTreeMap<String, EntityRecord>>,
}

impl RemoteResourceCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repopulate every collection from the server (best effort).
    ///
    /// A collection that cannot be listed is logged and left empty.
    pub async fn refresh<G: ResourceGateway + ?Sized>(&mut self, gateway: &G) {
        for resource in EntityType::ALL {
            let by_id: BTreeMap<String, EntityRecord> =
                match gateway.list(resource, REFRESH_PAGE_SIZE, 0).await {
                    Ok(list) => {
                        debug!("Retrieved {} {}(s)", list.len(), resource);
                        list.into_iter()
                            .filter_map(|e| record_id(&e).map(|id| (id, e)))
                            .collect()
                    }
                    Err(e) => {
                        warn!(resource = %resource, error = %e, "catalog refresh failed");
                        BTreeMap::new()
                    }
                };
            self.entities.insert(resource, by_id);
        }
    }

    #[must_use]
    pub fn get(&self, resource: EntityType, id: &str) -> Option<&EntityRecord> {
        self.entities.get(&resource).and_then(|m| m.get(id))
    }

    /// Entities of one type, ordered by identifier.
    pub fn entities(&self, resource: EntityType) -> impl Iterator<Item = &EntityRecord> {
        self.entities
            .get(&resource)
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    #[must_use]
    pub fn len(&self, resource: EntityType) -> usize {
        self.entities.get(&resource).map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.entities.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
