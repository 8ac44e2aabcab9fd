//! Mock SensorThings server using wiremock for HTTP-level tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sensorthings_client::client::SensorThingsClient;

pub struct MockStaServer {
    pub server: MockServer,
}

/// API root document advertising every collection under `{uri}/v1.0`.
pub fn root_document(uri: &str) -> Value {
    let collections = [
        "Things",
        "Locations",
        "HistoricalLocations",
        "Datastreams",
        "Sensors",
        "Observations",
        "ObservedProperties",
        "FeaturesOfInterest",
    ];
    json!({
        "value": collections
            .iter()
            .map(|name| json!({ "name": name, "url": format!("{uri}/v1.0/{name}") }))
            .collect::<Vec<_>>()
    })
}

/// Entities `{prefix}-{start}` .. `{prefix}-{end - 1}` with ids equal to `n`.
pub fn entities(prefix: &str, start: usize, end: usize) -> Vec<Value> {
    (start..end)
        .map(|n| json!({ "@iot.id": n, "name": format!("{prefix}-{n}") }))
        .collect()
}

impl MockStaServer {
    /// Start a server with the API root mounted.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(root_document(&server.uri())))
            .mount(&server)
            .await;
        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn base_url(&self) -> String {
        format!("{}/v1.0", self.server.uri())
    }

    pub async fn client(&self) -> SensorThingsClient {
        SensorThingsClient::connect_with_http_client(&self.uri(), reqwest::Client::new())
            .await
            .expect("discovery against mock server")
    }

    /// Serve one page of a collection, expecting it to be requested `calls` times.
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
}
