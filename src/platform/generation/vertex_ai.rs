// Vertex AI generateContent client

use super::TextGenerator;
use crate::core::config::GenerationConfig;
use crate::models::pose::{PoseError, PoseResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding an OAuth access token (e.g. `gcloud auth print-access-token`)
pub const ACCESS_TOKEN_ENV: &str = "VERTEX_ACCESS_TOKEN";

// ==============================================================================
// Wire format
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part, trimmed
    pub fn first_text(&self) -> PoseResult<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_deref())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                PoseError::GenerationFailed("No usable response from the language model".to_string())
            })
    }
}

// ==============================================================================
// Client
// ==============================================================================

pub struct VertexAiGenerator {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    model: String,
}

impl VertexAiGenerator {
    /// Build a client from configuration; project and token are required
    pub fn new(config: &GenerationConfig) -> PoseResult<Self> {
        let project = config.project.as_deref().ok_or_else(|| {
            PoseError::InvalidConfig(
                "Vertex AI project not set (config generation.project or GOOGLE_CLOUD_PROJECT)".to_string(),
            )
        })?;

        let access_token = std::env::var(ACCESS_TOKEN_ENV)
            .map_err(|_| PoseError::InvalidConfig(format!("{} is not set", ACCESS_TOKEN_ENV)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PoseError::GenerationFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: Self::endpoint(project, &config.location, &config.model),
            access_token,
            model: config.model.clone(),
        })
    }

    pub fn endpoint(project: &str, location: &str, model: &str) -> String {
        format!(
            "https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:generateContent"
        )
    }
}

#[async_trait]
impl TextGenerator for VertexAiGenerator {
    async fn complete(&self, prompt: &str) -> PoseResult<String> {
        let body = GenerateContentRequest::from_prompt(prompt);
        log::debug!("Sending {} prompt characters to {}", prompt.len(), self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PoseError::GenerationFailed(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PoseError::GenerationFailed(format!(
                "Vertex AI returned {}: {}",
                status, detail
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PoseError::GenerationFailed(format!("Invalid response body: {}", e)))?;

        parsed.first_text()
    }

    fn get_model_info(&self) -> String {
        format!("Vertex AI {} ({})", self.model, self.endpoint)
    }
}
