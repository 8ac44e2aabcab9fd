//! Accumulator for records whose creation was postponed to a later pass.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::entity::{record_label, EntityRecord, EntityType};
use crate::error::UnresolvedReference;

/// A record held back because one of its references could not be found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeferredRecord {
    /// Position of the record in its document's classification order.
    pub ordinal: usize,
    /// The record as classified, with references still unresolved.
    pub record: EntityRecord,
    /// The reference that blocked it in the most recent attempt.
    pub reason: UnresolvedReference,
}

impl DeferredRecord {
    #[must_use]
    pub fn label(&self) -> String {
        record_label(&self.record)
    }
}

/// Deferred records keyed by the type they were classified as.
///
/// Records are always filed under their own type, never the type of the
/// reference that blocked them; arrival order is preserved per type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeferralTracker {
    deferred: BTreeMap<EntityType, Vec<DeferredRecord>>,
}

impl DeferralTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &mut self,
        resource: EntityType,
        ordinal: usize,
        record: EntityRecord,
        reason: UnresolvedReference,
    ) {
        self.deferred.entry(resource).or_default().push(DeferredRecord {
            ordinal,
            record,
            reason,
        });
    }

    /// Absorb `other`'s records, appending after this tracker's own per type.
    pub fn merge(&mut self, other: DeferralTracker) {
        for (resource, records) in other.deferred {
            self.deferred.entry(resource).or_default().extend(records);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deferred.values().all(Vec::is_empty)
    }

    /// Total number of deferred records across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deferred.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn records(&self, resource: EntityType) -> &[DeferredRecord] {
        self.deferred.get(&resource).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Classification ordinals of every deferred record.
    #[must_use]
    pub fn ordinals(&self) -> BTreeSet<usize> {
        self.iter().map(|(_, r)| r.ordinal).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityType, &DeferredRecord)> {
        self.deferred
            .iter()
            .flat_map(|(resource, records)| records.iter().map(move |r| (*resource, r)))
    }
}
