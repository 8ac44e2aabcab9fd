//! Reconciliation driver: repeated passes over document sources.
//!
//! Each pass classifies every pending source, resolves references and
//! creates entities idempotently. Records whose references cannot be found
//! yet are deferred; a source with deferrals is reprocessed in the next pass,
//! a source without is done. Reprocessing re-reads and re-classifies the
//! document but only retries the records deferred in the previous pass, so
//! a record is created, found or failed at most once per run. After the pass
//! budget is spent, whatever is still deferred is reported per source.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::classifier::classify;
use crate::deferral::DeferralTracker;
use crate::entity::{record_id, record_label, record_name, EntityType};
use crate::error::{StaClientError, UnresolvedReference};
use crate::gateway::ResourceGateway;
use crate::resolver::resolve_references;
use crate::source::DocumentSource;

/// Default number of passes before unresolved records are reported.
pub const DEFAULT_MAX_PASSES: usize = 3;

/// An entity created, or found already present, during a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedEntity {
    pub resource: EntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source: String,
    pub pass: usize,
    /// True when the entity existed and no create request was issued.
    pub existed: bool,
}

/// A record abandoned for this pass because of a non-reference error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    pub resource: EntityType,
    pub label: String,
    pub source: String,
    pub pass: usize,
    pub error: String,
}

/// A source that could not be loaded or parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub pass: usize,
    pub error: String,
}

/// A record still blocked on a reference when the pass budget ran out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedRecord {
    pub resource: EntityType,
    pub label: String,
    pub reference: UnresolvedReference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedSource {
    pub source: String,
    pub records: Vec<UnresolvedRecord>,
}

/// What one pass over one source produced.
#[derive(Debug, Clone, Default)]
pub struct SourceOutcome {
    pub created: Vec<CreatedEntity>,
    pub failures: Vec<RecordFailure>,
    pub deferred: DeferralTracker,
}

impl SourceOutcome {
    /// Whether every record was handled (created, found or failed outright).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.deferred.is_empty()
    }
}

/// Final result of a reconciliation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationReport {
    pub passes: usize,
    pub created: Vec<CreatedEntity>,
    pub failures: Vec<RecordFailure>,
    pub source_failures: Vec<SourceFailure>,
    pub unresolved: Vec<UnresolvedSource>,
    pub cancelled: bool,
}

impl ReconciliationReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.cancelled
            && self.failures.is_empty()
            && self.source_failures.is_empty()
            && self.unresolved.is_empty()
    }

    /// Record an entity unless the same `(resource, id)` is already listed.
    fn push_created(&mut self, entity: CreatedEntity) {
        let duplicate = entity.id.is_some()
            && self
                .created
                .iter()
                .any(|c| c.resource == entity.resource && c.id == entity.id);
        if !duplicate {
            self.created.push(entity);
        }
    }

    /// Entities for which a create request was actually issued.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created.iter().filter(|c| !c.existed).count()
    }

    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.iter().map(|s| s.records.len()).sum()
    }
}

pub struct ReconciliationDriver<'a, G: ResourceGateway + ?Sized> {
    gateway: &'a G,
    max_passes: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a, G: ResourceGateway + ?Sized> ReconciliationDriver<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            max_passes: DEFAULT_MAX_PASSES,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Abort between passes and between sources once `flag` is set.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Run one pass over every record of a single document.
    pub async fn process_document(&self, source: &str, document: &Value, pass: usize) -> SourceOutcome {
        self.process_records(source, document, pass, None).await
    }

    /// Run one pass over a document, retrying only the records `previous`
    /// deferred. Records are matched by their classification ordinal.
    pub async fn reprocess_document(
        &self,
        source: &str,
        document: &Value,
        pass: usize,
        previous: &DeferralTracker,
    ) -> SourceOutcome {
        let ordinals = previous.ordinals();
        self.process_records(source, document, pass, Some(&ordinals)).await
    }

    async fn process_records(
        &self,
        source: &str,
        document: &Value,
        pass: usize,
        only: Option<&BTreeSet<usize>>,
    ) -> SourceOutcome {
        let mut outcome = SourceOutcome::default();
        let mut current_group = None;

        for (ordinal, (resource, record)) in classify(document).enumerate() {
            if only.is_some_and(|ordinals| !ordinals.contains(&ordinal)) {
                continue;
            }

            if current_group != Some(resource) {
                debug!("Processing '{}'...", resource);
                current_group = Some(resource);
            }

            let resolved = match resolve_references(self.gateway, &record).await {
                Ok(resolved) => resolved,
                Err(StaClientError::UnresolvedReference(reason)) => {
                    debug!("{}", reason);
                    debug!(
                        "Creation of {} ({}) deferred",
                        record_label(&record),
                        resource
                    );
                    outcome.deferred.append(resource, ordinal, record, reason);
                    continue;
                }
                Err(e) => {
                    error!(resource = %resource, record = %record_label(&record), error = %e, "reference resolution failed");
                    outcome.failures.push(RecordFailure {
                        resource,
                        label: record_label(&record),
                        source: source.to_string(),
                        pass,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            match self.gateway.create(resource, &resolved, true).await {
                Ok(created) => {
                    let existed = !created.was_created();
                    let entity = created.record();
                    outcome.created.push(CreatedEntity {
                        resource,
                        id: record_id(entity),
                        name: record_name(entity).map(str::to_string),
                        source: source.to_string(),
                        pass,
                        existed,
                    });
                }
                Err(e) => {
                    error!(resource = %resource, record = %record_label(&record), error = %e, "create failed");
                    outcome.failures.push(RecordFailure {
                        resource,
                        label: record_label(&record),
                        source: source.to_string(),
                        pass,
                        error: e.to_string(),
                    });
                }
            }
        }

        outcome
    }

    /// Reconcile `sources`, retrying sources with deferrals up to the pass budget.
    pub async fn run(&self, sources: Vec<DocumentSource>) -> ReconciliationReport {
        let mut report = ReconciliationReport::default();
        // `None` marks a source not processed yet; `Some` holds the records
        // its last pass deferred, which are the only ones retried.
        let mut pending: Vec<(DocumentSource, Option<DeferralTracker>)> = sources
            .into_iter()
            .map(|source| (source, None))
            .collect();

        while !pending.is_empty() && report.passes < self.max_passes {
            if self.is_cancelled() {
                warn!(pass = report.passes + 1, "reconciliation cancelled");
                report.cancelled = true;
                break;
            }

            let pass = report.passes + 1;
            let action = if pass == 1 { "Processing" } else { "Reprocessing" };
            let mut next = Vec::with_capacity(pending.len());
            let mut pass_deferred = DeferralTracker::new();

            // `pending` is consumed as a snapshot; `next` only becomes
            // visible in the following pass.
            for (source, previous) in pending {
                if report.cancelled || self.is_cancelled() {
                    report.cancelled = true;
                    next.push((source, previous));
                    continue;
                }

                let name = source.name();
                info!("{} YAML file: {}", action, name);

                let document = match source.load() {
                    Ok(document) => document,
                    Err(e) => {
                        error!(source = %name, error = %e, "failed to load document");
                        report.source_failures.push(SourceFailure {
                            source: name,
                            pass,
                            error: e.to_string(),
                        });
                        continue;
                    }
                };

                let outcome = match &previous {
                    None => self.process_document(&name, &document, pass).await,
                    Some(deferred) => {
                        self.reprocess_document(&name, &document, pass, deferred)
                            .await
                    }
                };
                for entity in outcome.created {
                    report.push_created(entity);
                }
                report.failures.extend(outcome.failures);

                if outcome.deferred.is_empty() {
                    debug!(source = %name, pass, "source fully reconciled");
                } else {
                    pass_deferred.merge(outcome.deferred.clone());
                    next.push((source, Some(outcome.deferred)));
                }
            }

            report.passes = pass;
            if !pass_deferred.is_empty() {
                info!(
                    pass,
                    deferred = pass_deferred.len(),
                    sources = next.len(),
                    "pass finished with deferred records"
                );
            }
            pending = next;
        }

        for (source, deferred) in pending {
            let name = source.name();
            let records: Vec<UnresolvedRecord> = deferred
                .iter()
                .flat_map(|tracker| tracker.iter())
                .map(|(resource, item)| UnresolvedRecord {
                    resource,
                    label: item.label(),
                    reference: item.reason.clone(),
                })
                .collect();

            for record in &records {
                warn!(
                    source = %name,
                    "{} '{}' not created: unresolved reference {}",
                    record.resource.display_name(),
                    record.label,
                    record.reference
                );
            }

            report.unresolved.push(UnresolvedSource {
                source: name,
                records,
            });
        }

        report
    }
}
