pub mod core;
pub mod models;
pub mod platform;

use crate::core::config::Config;
use crate::core::feedback_prompt::{
    build_chat_prompt, cannot_evaluate_message, first_reply_line, FeedbackPromptBuilder,
};
use crate::core::posture_pipeline::PosturePipeline;
use crate::models::feedback::{ChatTurn, CoachingReply, FeedbackRequest, FeedbackSource};
use crate::models::pose::{DecodedImage, LandmarkSet, PoseError, PoseResult};
use crate::models::posture::PostureOutcome;
use crate::platform::generation::{TextGenerator, VertexAiGenerator};
use crate::platform::pose::{DefaultMediaPipe, LandmarkDetector};
use std::sync::Arc;

pub use crate::models::posture::{MetricsPayload, PostureEvaluation, PostureMetrics, Tier};

/// Service state: configuration plus the detection and generation resources.
/// Built once at startup and shared by reference across requests.
pub struct CoachService {
    pipeline: PosturePipeline,
    prompt_builder: FeedbackPromptBuilder,
    detector: Box<dyn LandmarkDetector>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl CoachService {
    pub fn new(
        config: Config,
        detector: Box<dyn LandmarkDetector>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            pipeline: PosturePipeline::new(config.thresholds.clone(), config.detection.min_visibility),
            prompt_builder: FeedbackPromptBuilder::new(config.thresholds.clone()),
            detector,
            generator,
        }
    }

    /// Construct the default backends from configuration
    pub fn from_config(config: Config) -> PoseResult<Self> {
        config
            .validate()
            .map_err(|e| PoseError::InvalidConfig(e.to_string()))?;

        let detector = DefaultMediaPipe::new(&config.detection)?;
        log::info!("Landmark detector: {}", detector.get_model_info());

        // Without a generator, feedback falls back to the local evaluation summary
        let generator: Option<Arc<dyn TextGenerator>> = if config.generation.enabled {
            match VertexAiGenerator::new(&config.generation) {
                Ok(generator) => {
                    log::info!("Text generator: {}", generator.get_model_info());
                    Some(Arc::new(generator))
                }
                Err(e) => {
                    log::warn!("Text generation unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self::new(config, Box::new(detector), generator))
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Evaluate precomputed landmarks; `None` means no body was detected
    pub fn evaluate_landmarks(&self, landmarks: Option<&LandmarkSet>, width: u32, height: u32) -> PostureOutcome {
        self.pipeline.evaluate(landmarks, width, height)
    }

    /// Decode an uploaded image, detect landmarks and evaluate them
    pub fn evaluate_image(&self, bytes: &[u8]) -> PoseResult<PostureOutcome> {
        let image = DecodedImage::from_bytes(bytes)?;
        log::debug!("Decoded image {}x{} ({} bytes)", image.width, image.height, bytes.len());

        let landmarks = self.detector.detect(&image)?;
        if landmarks.is_none() {
            log::info!("No body detected in image");
        }

        Ok(self.pipeline.evaluate(landmarks.as_ref(), image.width, image.height))
    }

    /// Coaching request for an evaluated outcome
    pub fn feedback_request(&self, outcome: &PostureOutcome) -> Option<FeedbackRequest> {
        match outcome {
            PostureOutcome::Evaluated { metrics, evaluation } => {
                Some(self.prompt_builder.build(metrics, evaluation))
            }
            PostureOutcome::CannotEvaluate { .. } => None,
        }
    }

    /// Turn an outcome into a coaching message
    pub async fn coach(&self, outcome: PostureOutcome) -> PoseResult<CoachingReply> {
        let (message, source) = match (&outcome, self.feedback_request(&outcome)) {
            (PostureOutcome::CannotEvaluate { reason }, _) => {
                (cannot_evaluate_message(*reason).to_string(), FeedbackSource::Instruction)
            }
            (_, Some(request)) => self.phrase(&request).await,
            (PostureOutcome::Evaluated { .. }, None) => {
                return Err(PoseError::InvalidInput("evaluated outcome without feedback request".to_string()))
            }
        };

        Ok(CoachingReply {
            request_id: uuid::Uuid::new_v4(),
            created_at: chrono::Utc::now().timestamp_millis(),
            message,
            source,
            payload: outcome.payload(),
            outcome,
        })
    }

    /// Evaluate an uploaded image and coach on it
    pub async fn coach_image(&self, bytes: &[u8]) -> PoseResult<CoachingReply> {
        let outcome = self.evaluate_image(bytes)?;
        self.coach(outcome).await
    }

    /// Next trainer reply for a chat history
    pub async fn chat(&self, history: &[ChatTurn]) -> PoseResult<String> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            PoseError::InvalidConfig("No text generation backend configured".to_string())
        })?;

        let prompt = build_chat_prompt(history);
        let reply = generator.complete(&prompt).await?;

        first_reply_line(&reply).ok_or_else(|| {
            PoseError::GenerationFailed("The language model returned an empty reply".to_string())
        })
    }

    async fn phrase(&self, request: &FeedbackRequest) -> (String, FeedbackSource) {
        let summary = || (request.evaluation.summary(), FeedbackSource::Summary);

        let Some(generator) = self.generator.as_ref() else {
            return summary();
        };

        match generator.complete(&request.prompt).await {
            Ok(text) => (text, FeedbackSource::Generated),
            Err(e) => {
                log::warn!("Falling back to evaluation summary: {}", e);
                summary()
            }
        }
    }
}
