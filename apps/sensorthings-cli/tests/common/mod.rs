//! Shared fixtures for CLI integration tests: a wiremock SensorThings server
//! and a scratch directory for YAML documents.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sensorthings_cli::config::Config;

pub const COLLECTIONS: [&str; 6] = [
    "Things",
    "Locations",
    "Sensors",
    "ObservedProperties",
    "Datastreams",
    "FeaturesOfInterest",
];

pub struct TestContext {
    pub server: MockServer,
    pub dir: TempDir,
}

impl TestContext {
    /// Start a server that advertises every collection under `/v1.0`.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/v1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": COLLECTIONS
                    .iter()
                    .map(|name| json!({ "name": name, "url": format!("{uri}/v1.0/{name}") }))
                    .collect::<Vec<_>>()
            })))
            .mount(&server)
            .await;

        Self {
            server,
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// CLI configuration pointing at this server.
    pub fn config(&self) -> Config {
        Config {
            destination: self.uri(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Every GET on the collection returns `items`, whatever the paging.
    pub async fn mock_collection(&self, collection: &str, items: Vec<Value>, calls: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/{collection}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": items })))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// GET with exact `$top` / `$skip`.
    pub async fn mock_page(&self, collection: &str, top: usize, skip: usize, items: Vec<Value>, calls: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/v1.0/{collection}")))
            .and(query_param("$top", top.to_string()))
            .and(query_param("$skip", skip.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": items })))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// POST on the collection answers 201 with `created`.
    pub async fn mock_create(&self, collection: &str, created: Value, calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/v1.0/{collection}")))
            .respond_with(ResponseTemplate::new(201).set_body_json(created))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// Write a YAML document into the scratch directory.
    pub fn write_yaml(&self, name: &str, content: &str) -> PathBuf {
        let file = self.dir.path().join(name);
        std::fs::write(&file, content).expect("Failed to write YAML fixture");
        file
    }
}
