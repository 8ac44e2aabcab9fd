//! Client and reconciliation engine for OGC SensorThings API servers.
//!
//! Loads a graph of Things, Locations, Sensors, ObservedProperties,
//! Datastreams and FeaturesOfInterest described in YAML documents. Records
//! may reference entities declared later or in other documents; such records
//! are deferred and retried in later passes instead of requiring the caller
//! to order them.

pub mod catalog;
pub mod classifier;
pub mod client;
pub mod deferral;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod reconciler;
pub mod resolver;
pub mod source;

pub use catalog::RemoteResourceCatalog;
pub use client::SensorThingsClient;
pub use deferral::DeferralTracker;
pub use entity::{EntityRecord, EntityType};
pub use error::{StaClientError, StaClientResult, UnresolvedReference};
pub use gateway::{CreateOutcome, ResourceGateway};
pub use reconciler::{ReconciliationDriver, ReconciliationReport};
pub use source::DocumentSource;
