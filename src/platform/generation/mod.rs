// Text generation platform integration
// The generative model only phrases feedback; all judging happens in core.

pub mod vertex_ai;

pub use vertex_ai::VertexAiGenerator;

use crate::models::pose::PoseResult;
use async_trait::async_trait;

/// Text-generation collaborator
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete a prompt, returning the generated text
    async fn complete(&self, prompt: &str) -> PoseResult<String>;

    /// Get backend info
    fn get_model_info(&self) -> String;
}
