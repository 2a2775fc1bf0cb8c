// Data models for coaching requests, replies and the trainer chat

use super::posture::{MetricsPayload, PostureEvaluation, PostureOutcome};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A structured request for the text-generation collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub payload: MetricsPayload,
    pub evaluation: PostureEvaluation,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Trainer,
}

impl Speaker {
    pub fn role(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Trainer => "Trainer",
        }
    }
}

/// One line of the trainer chat history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn trainer(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Trainer,
            text: text.into(),
        }
    }
}

/// Where the coaching message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSource {
    /// Phrased by the text-generation collaborator
    Generated,
    /// Built locally from the evaluation (no generator configured)
    Summary,
    /// Fixed instruction for a cannot-evaluate outcome
    Instruction,
}

/// Response for one coached image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingReply {
    pub request_id: Uuid,
    pub created_at: i64,
    pub message: String,
    pub source: FeedbackSource,
    pub outcome: PostureOutcome,
    pub payload: Option<MetricsPayload>,
}
