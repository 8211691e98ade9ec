//! Embedding generation providers.

use crate::error::MemoryError;
use crate::Result;
use async_trait::async_trait;
use dmem_core::config::EmbedderConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Trait for embedders that turn text into fixed-size vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embedder name reported in diagnostics.
    fn name(&self) -> &str;

    /// Declared embedding dimension.
    fn dimension(&self) -> usize;

    /// Generate embeddings for texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate the embedding for a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::Embedding("No embedding returned".to_string()))
    }
}

/// OpenAI embeddings provider.
pub struct OpenAIEmbeddings {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    dimension: Option<usize>,
}

impl OpenAIEmbeddings {
    /// Create a new OpenAI embeddings provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com".to_string(),
            dimension: None,
        }
    }

    /// Build from config, reading the API key from the configured variable.
    pub fn from_config(config: &EmbedderConfig) -> Result<Self> {
        let api_key = dmem_core::env::get_var(&config.api_key_env).ok_or_else(|| {
            MemoryError::Config(format!(
                "Environment variable {} is not set",
                config.api_key_env
            ))
        })?;

        let mut embeddings = Self::new(api_key)
            .with_model(config.model.clone())
            .with_base_url(config.base_url.clone());
        embeddings.dimension = config.dimension;
        Ok(embeddings)
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Embedder for OpenAIEmbeddings {
    fn name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        if let Some(dimension) = self.dimension {
            return dimension;
        }
        match self.model.as_str() {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            _ => 1536,
        }
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct Request {
            model: String,
            input: Vec<String>,
        }

        #[derive(Deserialize)]
        struct Response {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let request = Request {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MemoryError::Embedding(format!("API error: {}", text)));
        }

        let response: Response = response.json().await?;
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
