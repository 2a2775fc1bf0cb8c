// Posture evaluation - classifies metrics against the plank threshold table

use crate::models::posture::{
    Finding, MetricKind, PostureEvaluation, PostureIssue, PostureMetrics, Tier,
};
use serde::{Deserialize, Serialize};

/// Threshold table for the plank rule set, in degrees.
/// Every boundary value belongs to the better tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationThresholds {
    /// Ideal hip angle
    pub hip_target: f64,
    /// Distance from the ideal that still counts as excellent
    pub hip_excellent_tolerance: f64,
    /// Below this the hips sag
    pub hip_acceptable_min: f64,
    /// Above this the hips have dropped too far
    pub hip_acceptable_max: f64,
    /// Below this the knees are bent
    pub knee_min: f64,
    /// Torso tilt allowed in either direction
    pub torso_tilt_limit: f64,
}

impl Default for EvaluationThresholds {
    fn default() -> Self {
        Self {
            hip_target: 165.0,
            hip_excellent_tolerance: 3.0,
            hip_acceptable_min: 155.0,
            hip_acceptable_max: 170.0,
            knee_min: 160.0,
            torso_tilt_limit: 10.0,
        }
    }
}

impl EvaluationThresholds {
    pub fn hip_excellent_min(&self) -> f64 {
        self.hip_target - self.hip_excellent_tolerance
    }

    pub fn hip_excellent_max(&self) -> f64 {
        self.hip_target + self.hip_excellent_tolerance
    }

    /// Validate threshold values
    pub fn validate(&self) -> Result<(), String> {
        let angles = [
            ("hip_target", self.hip_target),
            ("hip_acceptable_min", self.hip_acceptable_min),
            ("hip_acceptable_max", self.hip_acceptable_max),
            ("knee_min", self.knee_min),
        ];
        for (name, value) in angles {
            if !(0.0..=180.0).contains(&value) {
                return Err(format!("Invalid {}: {}. Must be between 0 and 180", name, value));
            }
        }

        if !(self.hip_excellent_tolerance >= 0.0) {
            return Err(format!(
                "Invalid hip excellent tolerance: {}. Must not be negative",
                self.hip_excellent_tolerance
            ));
        }

        if self.hip_acceptable_min > self.hip_excellent_min()
            || self.hip_excellent_max() > self.hip_acceptable_max
        {
            return Err(format!(
                "Hip excellent band {}-{} must lie within the acceptable band {}-{}",
                self.hip_excellent_min(),
                self.hip_excellent_max(),
                self.hip_acceptable_min,
                self.hip_acceptable_max
            ));
        }

        if !(0.0..=180.0).contains(&self.torso_tilt_limit) {
            return Err(format!(
                "Invalid torso tilt limit: {}. Must be between 0 and 180",
                self.torso_tilt_limit
            ));
        }

        Ok(())
    }
}

/// Rule engine: `PostureMetrics` → `PostureEvaluation`
#[derive(Debug, Clone, Default)]
pub struct PostureEvaluator {
    thresholds: EvaluationThresholds,
}

impl PostureEvaluator {
    pub fn new(thresholds: EvaluationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify_hip_angle(&self, degrees: f64) -> (Tier, Option<PostureIssue>) {
        let t = &self.thresholds;
        if degrees < t.hip_acceptable_min {
            (Tier::Poor, Some(PostureIssue::HipsSagging))
        } else if degrees > t.hip_acceptable_max {
            (Tier::Poor, Some(PostureIssue::HipsDroppedTooFar))
        } else if degrees >= t.hip_excellent_min() && degrees <= t.hip_excellent_max() {
            (Tier::Excellent, None)
        } else {
            (Tier::Acceptable, None)
        }
    }

    /// Knee angle has a single pass band, so passing is the top tier
    pub fn classify_knee_angle(&self, degrees: f64) -> (Tier, Option<PostureIssue>) {
        if degrees >= self.thresholds.knee_min {
            (Tier::Excellent, None)
        } else {
            (Tier::Poor, Some(PostureIssue::KneesBent))
        }
    }

    pub fn classify_torso_tilt(&self, degrees: f64) -> (Tier, Option<PostureIssue>) {
        if degrees.abs() <= self.thresholds.torso_tilt_limit {
            (Tier::Excellent, None)
        } else {
            (Tier::Poor, Some(PostureIssue::PostureBroken))
        }
    }

    pub fn evaluate(&self, metrics: &PostureMetrics) -> PostureEvaluation {
        let findings: Vec<Finding> = MetricKind::all()
            .into_iter()
            .filter_map(|metric| {
                let value = metrics.value(metric)?;
                let (tier, issue) = match metric {
                    MetricKind::LeftHipAngle | MetricKind::RightHipAngle => self.classify_hip_angle(value),
                    MetricKind::LeftKneeAngle | MetricKind::RightKneeAngle => self.classify_knee_angle(value),
                    MetricKind::TorsoTilt => self.classify_torso_tilt(value),
                };
                Some(Finding { metric, tier, issue })
            })
            .collect();

        let overall = findings.iter().map(|f| f.tier).min();
        let drivers = match overall {
            Some(worst) => findings
                .iter()
                .filter(|f| f.tier == worst)
                .map(|f| f.metric)
                .collect(),
            None => Vec::new(),
        };

        log::debug!(
            "Evaluated {} metrics, overall tier {:?}",
            findings.len(),
            overall
        );

        PostureEvaluation {
            overall,
            findings,
            drivers,
            hip_height: metrics.hip_height,
        }
    }
}
