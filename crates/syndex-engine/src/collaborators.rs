//! HTTP implementations of the collaborator traits.
//!
//! Both clients speak plain JSON over `reqwest::blocking` with a per-request
//! timeout. Any transport or decode failure maps into [`DispatchError`], which
//! the dispatchers treat as a per-file skip rather than a fatal error.

use crate::dispatch::{EmbeddingClient, FileNodeProps, GraphClient};
use serde::Deserialize;
use std::time::Duration;
use syndex_core::error::DispatchError;

const EMBEDDING_SERVICE: &str = "embedding";
const GRAPH_SERVICE: &str = "graph";

fn build_http_client(service: &str, timeout_ms: u64) -> Result<reqwest::blocking::Client, DispatchError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| DispatchError::unavailable(service, e))
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct UpsertNodeResponse {
    id: String,
}

/// Ollama-style embedding endpoint client.
pub struct HttpEmbeddingClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl HttpEmbeddingClient {
    pub fn new(endpoint: &str, model: &str, timeout_ms: u64) -> Result<Self, DispatchError> {
        Ok(Self {
            client: build_http_client(EMBEDDING_SERVICE, timeout_ms)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

impl EmbeddingClient for HttpEmbeddingClient {
    fn generate_embedding(&self, text: &str, identity: &str) -> Result<Vec<f32>, DispatchError> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": text,
                "identity": identity,
            }))
            .send()
            .map_err(|e| DispatchError::request_failed(EMBEDDING_SERVICE, e))?
            .error_for_status()
            .map_err(|e| DispatchError::request_failed(EMBEDDING_SERVICE, e))?;

        let parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| DispatchError::malformed_response(EMBEDDING_SERVICE, e))?;
        if parsed.embedding.is_empty() {
            return Err(DispatchError::malformed_response(
                EMBEDDING_SERVICE,
                "empty embedding vector",
            ));
        }
        Ok(parsed.embedding)
    }

    fn remove_embeddings(&self, paths: &[String]) -> Result<(), DispatchError> {
        let url = format!("{}/api/embeddings/delete", self.endpoint);
        self.client
            .post(&url)
            .json(&serde_json::json!({ "identities": paths }))
            .send()
            .map_err(|e| DispatchError::request_failed(EMBEDDING_SERVICE, e))?
            .error_for_status()
            .map_err(|e| DispatchError::request_failed(EMBEDDING_SERVICE, e))?;
        Ok(())
    }
}

/// Relationship-graph endpoint client.
pub struct HttpGraphClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpGraphClient {
    pub fn new(endpoint: &str, timeout_ms: u64) -> Result<Self, DispatchError> {
        Ok(Self {
            client: build_http_client(GRAPH_SERVICE, timeout_ms)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl GraphClient for HttpGraphClient {
    fn upsert_node(&self, type_tag: &str, props: &FileNodeProps) -> Result<String, DispatchError> {
        let url = format!("{}/api/nodes", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "label": type_tag,
                "properties": {
                    "identity": props.identity,
                    "relative_identity": props.relative_identity,
                    "last_modified": props.last_modified,
                },
            }))
            .send()
            .map_err(|e| DispatchError::request_failed(GRAPH_SERVICE, e))?
            .error_for_status()
            .map_err(|e| DispatchError::request_failed(GRAPH_SERVICE, e))?;

        let parsed: UpsertNodeResponse = response
            .json()
            .map_err(|e| DispatchError::malformed_response(GRAPH_SERVICE, e))?;
        Ok(parsed.id)
    }

    fn remove_nodes(&self, paths: &[String]) -> Result<(), DispatchError> {
        let url = format!("{}/api/nodes/delete", self.endpoint);
        self.client
            .post(&url)
            .json(&serde_json::json!({ "identities": paths }))
            .send()
            .map_err(|e| DispatchError::request_failed(GRAPH_SERVICE, e))?
            .error_for_status()
            .map_err(|e| DispatchError::request_failed(GRAPH_SERVICE, e))?;
        Ok(())
    }
}
