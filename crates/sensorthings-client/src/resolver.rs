//! Reference resolution: replace name-or-id reference fields with the
//! referenced entity's full record before creation.

use serde_json::Value;
use tracing::debug;

use crate::entity::{EntityRecord, EntityType, REFERENCE_FIELDS};
use crate::error::{StaClientError, StaClientResult, UnresolvedReference};
use crate::gateway::ResourceGateway;

/// Resolve every scalar reference field of `record`.
///
/// Works on a copy: on failure the caller still holds the original,
/// unresolved record, which is what gets deferred. Fields that already hold
/// a mapping are left untouched.
pub async fn resolve_references<G: ResourceGateway + ?Sized>(
    gateway: &G,
    record: &EntityRecord,
) -> StaClientResult<EntityRecord> {
    let mut resolved = record.clone();

    for field in REFERENCE_FIELDS {
        let Some(Value::String(name_or_id)) = record.get(field) else {
            continue;
        };
        if name_or_id.is_empty() {
            continue;
        }
        let Some(target) = EntityType::from_reference_key(field) else {
            continue;
        };

        match gateway.search_by_name_or_id(target, name_or_id).await {
            Ok(found) => {
                debug!(field, target = %target, name_or_id = %name_or_id, "resolved reference");
                resolved.insert(field.to_string(), Value::Object(found));
            }
            Err(StaClientError::NotFound { resource, name_or_id }) => {
                return Err(StaClientError::UnresolvedReference(UnresolvedReference {
                    field: field.to_string(),
                    target: resource,
                    name_or_id,
                }));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(resolved)
}
