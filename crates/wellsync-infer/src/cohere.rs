//! Cohere HTTP client implementing both the embedding and rerank backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use wellsync_core::{Error, ProviderConfig, Result};

use crate::embedder::{EmbedIntent, EmbeddingBackend};
use crate::reranker::{RerankBackend, RerankHit};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Client for Cohere's `/v1/embed` and `/v1/rerank` endpoints.
#[derive(Debug, Clone)]
pub struct CohereClient {
    http: Client,
    base_url: String,
    api_key: String,
    embed_model: String,
    rerank_model: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RerankHit>,
}

impl CohereClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("Cohere API key is not configured".into()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            embed_model: config.embed_model.clone(),
            rerank_model: config.rerank_model.clone(),
        })
    }

    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }

    pub fn rerank_model(&self) -> &str {
        &self.rerank_model
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Request to {} failed: {}", path, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("Failed to read response from {}: {}", path, e)))?;

        if !status.is_success() {
            error!("Cohere API error {} on {}: {}", status, path, text);
            return Err(Error::Inference(format!("Cohere API error {}: {}", status, text)));
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::Inference(format!("Unexpected response shape from Cohere {}: {}", path, e))
        })
    }
}

#[async_trait]
impl EmbeddingBackend for CohereClient {
    async fn embed(&self, texts: &[String], intent: EmbedIntent) -> Result<Vec<Vec<f32>>> {
        let body = EmbedRequest {
            texts,
            model: &self.embed_model,
            input_type: intent.as_input_type(),
        };
        let response: EmbedResponse = self.post("/v1/embed", &body).await?;
        debug!(
            "Embedded {} texts ({}) into {} vectors",
            texts.len(),
            intent,
            response.embeddings.len()
        );
        Ok(response.embeddings)
    }

    fn model(&self) -> &str {
        &self.embed_model
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[async_trait]
impl RerankBackend for CohereClient {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        let body = RerankRequest {
            query,
            documents,
            top_n,
            model: &self.rerank_model,
        };
        let response: RerankResponse = self.post("/v1/rerank", &body).await?;
        debug!(
            "Reranked {} documents, kept {}",
            documents.len(),
            response.results.len()
        );
        Ok(response.results)
    }

    fn model(&self) -> &str {
        &self.rerank_model
    }

    fn is_available(&self) -> bool {
        true
    }
}
