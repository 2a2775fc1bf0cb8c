// Posture pipeline - landmarks to evaluated outcome in one synchronous, side-effect free call

use crate::core::landmark_extractor::{Extraction, LandmarkExtractor};
use crate::core::posture_evaluator::{EvaluationThresholds, PostureEvaluator};
use crate::core::posture_metrics::PostureMetricCalculator;
use crate::models::pose::LandmarkSet;
use crate::models::posture::{CannotEvaluateReason, PostureOutcome};

/// Extraction → metrics → evaluation. Holds only immutable settings, so one
/// instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct PosturePipeline {
    extractor: LandmarkExtractor,
    calculator: PostureMetricCalculator,
    evaluator: PostureEvaluator,
}

impl PosturePipeline {
    pub fn new(thresholds: EvaluationThresholds, min_visibility: f64) -> Self {
        Self {
            extractor: LandmarkExtractor::new(min_visibility),
            calculator: PostureMetricCalculator::new(),
            evaluator: PostureEvaluator::new(thresholds),
        }
    }

    /// Evaluate one image's landmarks. `None` means the detector found no body.
    pub fn evaluate(&self, landmarks: Option<&LandmarkSet>, width: u32, height: u32) -> PostureOutcome {
        let points = match self.extractor.extract(landmarks, width, height) {
            Extraction::Points(points) => points,
            Extraction::NoLandmarks => {
                return PostureOutcome::CannotEvaluate {
                    reason: CannotEvaluateReason::NoBodyDetected,
                }
            }
        };

        let Some(metrics) = self.calculator.calculate(&points) else {
            return PostureOutcome::CannotEvaluate {
                reason: CannotEvaluateReason::InsufficientLandmarks,
            };
        };

        if !metrics.low_confidence.is_empty() {
            log::warn!(
                "Coincident landmarks, low-confidence metrics: {:?}",
                metrics.low_confidence
            );
        }

        let evaluation = self.evaluator.evaluate(&metrics);
        PostureOutcome::Evaluated { metrics, evaluation }
    }
}

impl Default for PosturePipeline {
    fn default() -> Self {
        Self::new(EvaluationThresholds::default(), 0.5)
    }
}
