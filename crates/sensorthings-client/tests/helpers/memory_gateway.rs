//! In-memory SensorThings server for driver and gateway tests.
//!
//! Behaves like a real server for listing and creation: created entities get
//! numeric ids and self-links and show up in later list calls.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sensorthings_client::entity::{record_label, EntityRecord, EntityType};
use sensorthings_client::error::{StaClientError, StaClientResult};
use sensorthings_client::gateway::ResourceGateway;

pub const BASE_URL: &str = "http://sta.test/v1.0";

#[derive(Default)]
struct State {
    collections: HashMap<EntityType, Vec<EntityRecord>>,
    next_id: u64,
    list_calls: HashMap<EntityType, usize>,
    posts: Vec<(EntityType, EntityRecord)>,
    rejected_names: HashMap<String, String>,
    unreachable_names: Vec<String>,
    cancel_on_post: HashMap<String, Arc<AtomicBool>>,
}

#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

pub fn object(value: Value) -> EntityRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(state: &mut State, resource: EntityType, record: &EntityRecord) -> EntityRecord {
        state.next_id += 1;
        let id = state.next_id;
        let mut created = record.clone();
        created.insert("@iot.id".to_string(), json!(id));
        created.insert(
            "@iot.selfLink".to_string(),
            json!(format!("{BASE_URL}/{}({id})", resource.collection())),
        );
        state
            .collections
            .entry(resource)
            .or_default()
            .push(created.clone());
        created
    }

    /// Insert an entity directly, without counting it as a POST.
    pub fn seed(&self, resource: EntityType, record: Value) -> EntityRecord {
        let mut state = self.state.lock().unwrap();
        Self::store(&mut state, resource, &object(record))
    }

    /// Insert `count` entities named `{prefix}-{n}`.
    pub fn seed_many(&self, resource: EntityType, prefix: &str, count: usize) {
        for n in 0..count {
            self.seed(resource, json!({ "name": format!("{prefix}-{n}") }));
        }
    }

    /// Make every POST of a record with this name fail with a 400.
    pub fn reject_name(&self, name: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected_names
            .insert(name.to_string(), message.to_string());
    }

    /// Make every POST of a record with this name fail as if the
    /// connection dropped.
    pub fn drop_connection_on(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .unreachable_names
            .push(name.to_string());
    }

    /// Raise `flag` once a record with this name has been created.
    pub fn cancel_after_post(&self, name: &str, flag: Arc<AtomicBool>) {
        self.state
            .lock()
            .unwrap()
            .cancel_on_post
            .insert(name.to_string(), flag);
    }

    /// Number of POSTs whose record carries this label.
    pub fn post_count(&self, label: &str) -> usize {
        self.posts().iter().filter(|(_, l)| l == label).count()
    }

    pub fn list_calls(&self, resource: EntityType) -> usize {
        self.state
            .lock()
            .unwrap()
            .list_calls
            .get(&resource)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls.values().sum()
    }

    /// `(type, label)` of every POST, in order.
    pub fn posts(&self) -> Vec<(EntityType, String)> {
        self.state
            .lock()
            .unwrap()
            .posts
            .iter()
            .map(|(t, r)| (*t, record_label(r)))
            .collect()
    }

    /// Body of the `n`-th POST.
    pub fn post_body(&self, n: usize) -> EntityRecord {
        self.state.lock().unwrap().posts[n].1.clone()
    }

    pub fn records(&self, resource: EntityType) -> Vec<EntityRecord> {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(&resource)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResourceGateway for MemoryGateway {
    async fn list(
        &self,
        resource: EntityType,
        top: usize,
        skip: usize,
    ) -> StaClientResult<Vec<EntityRecord>> {
        let mut state = self.state.lock().unwrap();
        *state.list_calls.entry(resource).or_default() += 1;
        Ok(state
            .collections
            .get(&resource)
            .map(|items| items.iter().skip(skip).take(top).cloned().collect())
            .unwrap_or_default())
    }

    async fn post(&self, resource: EntityType, record: &EntityRecord) -> StaClientResult<EntityRecord> {
        let mut state = self.state.lock().unwrap();
        state.posts.push((resource, record.clone()));

        let name = record_label(record);
        if let Some(message) = state.rejected_names.get(&name) {
            return Err(StaClientError::RemoteRejection {
                status: 400,
                message: message.clone(),
            });
        }
        if state.unreachable_names.contains(&name) {
            return Err(StaClientError::Transport(
                "connection reset by peer".to_string(),
            ));
        }

        let created = Self::store(&mut state, resource, record);
        if let Some(flag) = state.cancel_on_post.get(&name) {
            flag.store(true, Ordering::SeqCst);
        }
        Ok(created)
    }
}
