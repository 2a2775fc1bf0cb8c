// Data models for plank posture metrics and their evaluation

use super::pose::Side;
use crate::core::geometry::format_two_decimals;
use serde::{Deserialize, Serialize};

/// Placeholder written into the external payload for a metric that could not be measured
pub const UNAVAILABLE: &str = "unavailable";

// ==============================================================================
// Metrics
// ==============================================================================

/// Hip position relative to the shoulder-ankle line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HipHeight {
    HeightOk,
    HipsSagging,
    HipsTooHigh,
}

impl HipHeight {
    pub fn label(&self) -> &'static str {
        match self {
            HipHeight::HeightOk => "height OK",
            HipHeight::HipsSagging => "hips sagging",
            HipHeight::HipsTooHigh => "hips too high",
        }
    }
}

/// Which sides contributed to the metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyStrategy {
    Bilateral,
    Unilateral(Side),
}

/// Individually assessed numeric metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    LeftHipAngle,
    RightHipAngle,
    LeftKneeAngle,
    RightKneeAngle,
    TorsoTilt,
}

impl MetricKind {
    pub fn all() -> [MetricKind; 5] {
        [
            MetricKind::RightHipAngle,
            MetricKind::LeftHipAngle,
            MetricKind::RightKneeAngle,
            MetricKind::LeftKneeAngle,
            MetricKind::TorsoTilt,
        ]
    }

    pub fn hip_angle(side: Side) -> Self {
        match side {
            Side::Left => MetricKind::LeftHipAngle,
            Side::Right => MetricKind::RightHipAngle,
        }
    }

    pub fn knee_angle(side: Side) -> Self {
        match side {
            Side::Left => MetricKind::LeftKneeAngle,
            Side::Right => MetricKind::RightKneeAngle,
        }
    }

    /// Field name in the external metrics payload
    pub fn field_name(&self) -> &'static str {
        match self {
            MetricKind::LeftHipAngle => "left_hip_angle",
            MetricKind::RightHipAngle => "right_hip_angle",
            MetricKind::LeftKneeAngle => "left_knee_angle",
            MetricKind::RightKneeAngle => "right_knee_angle",
            MetricKind::TorsoTilt => "torso_tilt",
        }
    }

    /// Human-facing metric name
    pub fn description(&self) -> &'static str {
        match self {
            MetricKind::LeftHipAngle => "left hip angle",
            MetricKind::RightHipAngle => "right hip angle",
            MetricKind::LeftKneeAngle => "left knee angle",
            MetricKind::RightKneeAngle => "right knee angle",
            MetricKind::TorsoTilt => "torso tilt",
        }
    }
}

/// Geometric measurements for one image. `None` means unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureMetrics {
    pub left_hip_angle: Option<f64>,
    pub right_hip_angle: Option<f64>,
    pub left_knee_angle: Option<f64>,
    pub right_knee_angle: Option<f64>,
    pub torso_tilt: Option<f64>,
    pub hip_height: Option<HipHeight>,
    pub hip_height_side: Option<Side>,
    pub strategy: BodyStrategy,
    /// Metrics computed from coincident points; the value is defined but not meaningful
    pub low_confidence: Vec<MetricKind>,
}

impl PostureMetrics {
    pub fn value(&self, metric: MetricKind) -> Option<f64> {
        match metric {
            MetricKind::LeftHipAngle => self.left_hip_angle,
            MetricKind::RightHipAngle => self.right_hip_angle,
            MetricKind::LeftKneeAngle => self.left_knee_angle,
            MetricKind::RightKneeAngle => self.right_knee_angle,
            MetricKind::TorsoTilt => self.torso_tilt,
        }
    }
}

/// The literal field-for-field payload handed to downstream collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsPayload {
    pub right_hip_angle: String,
    pub left_hip_angle: String,
    pub right_knee_angle: String,
    pub left_knee_angle: String,
    pub torso_tilt: String,
    pub shoulder_hip_ankle_alignment: String,
}

impl MetricsPayload {
    pub fn from_metrics(metrics: &PostureMetrics) -> Self {
        let number = |value: Option<f64>| {
            value
                .map(format_two_decimals)
                .unwrap_or_else(|| UNAVAILABLE.to_string())
        };

        Self {
            right_hip_angle: number(metrics.right_hip_angle),
            left_hip_angle: number(metrics.left_hip_angle),
            right_knee_angle: number(metrics.right_knee_angle),
            left_knee_angle: number(metrics.left_knee_angle),
            torso_tilt: number(metrics.torso_tilt),
            shoulder_hip_ankle_alignment: metrics
                .hip_height
                .map(|h| h.label().to_string())
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
        }
    }

    pub fn field(&self, metric: MetricKind) -> &str {
        match metric {
            MetricKind::LeftHipAngle => &self.left_hip_angle,
            MetricKind::RightHipAngle => &self.right_hip_angle,
            MetricKind::LeftKneeAngle => &self.left_knee_angle,
            MetricKind::RightKneeAngle => &self.right_knee_angle,
            MetricKind::TorsoTilt => &self.torso_tilt,
        }
    }
}

// ==============================================================================
// Evaluation
// ==============================================================================

/// Quality tier, ordered worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Poor,
    Acceptable,
    Excellent,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Poor => "Poor",
            Tier::Acceptable => "Acceptable",
            Tier::Excellent => "Excellent",
        }
    }
}

/// Qualitative fault behind a poor tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureIssue {
    HipsSagging,
    HipsDroppedTooFar,
    KneesBent,
    PostureBroken,
}

impl PostureIssue {
    pub fn label(&self) -> &'static str {
        match self {
            PostureIssue::HipsSagging => "hips sagging",
            PostureIssue::HipsDroppedTooFar => "hips dropped too far",
            PostureIssue::KneesBent => "knees bent",
            PostureIssue::PostureBroken => "posture broken",
        }
    }
}

/// Assessment of one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub metric: MetricKind,
    pub tier: Tier,
    pub issue: Option<PostureIssue>,
}

impl Finding {
    /// Qualitative one-liner; never carries numbers
    pub fn explanation(&self) -> String {
        match self.issue {
            Some(issue) => format!(
                "{}: {} ({})",
                self.metric.description(),
                self.tier.label().to_lowercase(),
                issue.label()
            ),
            None => format!(
                "{}: {}",
                self.metric.description(),
                self.tier.label().to_lowercase()
            ),
        }
    }
}

/// Classification of one image's metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureEvaluation {
    /// Worst tier across available metrics; `None` when nothing was assessable
    pub overall: Option<Tier>,
    pub findings: Vec<Finding>,
    /// Metrics whose tier equals the overall tier
    pub drivers: Vec<MetricKind>,
    /// Advisory context, not part of the tier aggregation
    pub hip_height: Option<HipHeight>,
}

impl PostureEvaluation {
    pub fn finding(&self, metric: MetricKind) -> Option<&Finding> {
        self.findings.iter().find(|f| f.metric == metric)
    }

    pub fn tier_of(&self, metric: MetricKind) -> Option<Tier> {
        self.finding(metric).map(|f| f.tier)
    }

    pub fn issues(&self) -> Vec<PostureIssue> {
        let mut issues = Vec::new();
        for issue in self.findings.iter().filter_map(|f| f.issue) {
            if !issues.contains(&issue) {
                issues.push(issue);
            }
        }
        issues
    }

    pub fn explanations(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.findings.iter().map(Finding::explanation).collect();
        if let Some(hip_height) = self.hip_height {
            lines.push(format!("hip height: {}", hip_height.label()));
        }
        lines
    }

    pub fn summary(&self) -> String {
        let Some(overall) = self.overall else {
            return "Not enough of the body was visible to assess the plank.".to_string();
        };

        let drivers: Vec<&str> = self.drivers.iter().map(|m| m.description()).collect();
        let mut summary = format!("Overall: {}", overall.label());
        if !drivers.is_empty() {
            summary.push_str(&format!(" (driven by {})", drivers.join(", ")));
        }
        let issues: Vec<&str> = self.issues().iter().map(|i| i.label()).collect();
        if !issues.is_empty() {
            summary.push_str(&format!(". Issues: {}", issues.join(", ")));
        }
        summary.push('.');
        summary
    }
}

// ==============================================================================
// Outcome
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CannotEvaluateReason {
    /// The detector found no body at all
    NoBodyDetected,
    /// Some landmarks were found, but none of the plank metrics could be measured
    InsufficientLandmarks,
}

/// Result of one evaluation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PostureOutcome {
    Evaluated {
        metrics: PostureMetrics,
        evaluation: PostureEvaluation,
    },
    CannotEvaluate {
        reason: CannotEvaluateReason,
    },
}

impl PostureOutcome {
    /// External payload; `None` for a cannot-evaluate outcome (all-or-nothing)
    pub fn payload(&self) -> Option<MetricsPayload> {
        match self {
            PostureOutcome::Evaluated { metrics, .. } => Some(MetricsPayload::from_metrics(metrics)),
            PostureOutcome::CannotEvaluate { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> PostureMetrics {
        PostureMetrics {
            left_hip_angle: Some(165.004),
            right_hip_angle: Some(150.0),
            left_knee_angle: None,
            right_knee_angle: Some(172.456),
            torso_tilt: Some(-3.14159),
            hip_height: Some(HipHeight::HipsSagging),
            hip_height_side: Some(Side::Left),
            strategy: BodyStrategy::Bilateral,
            low_confidence: vec![],
        }
    }

    #[test]
    fn test_payload_fields() {
        let payload = MetricsPayload::from_metrics(&sample_metrics());
        assert_eq!(payload.left_hip_angle, "165.00");
        assert_eq!(payload.right_hip_angle, "150.00");
        assert_eq!(payload.left_knee_angle, UNAVAILABLE);
        assert_eq!(payload.right_knee_angle, "172.46");
        assert_eq!(payload.torso_tilt, "-3.14");
        assert_eq!(payload.shoulder_hip_ankle_alignment, "hips sagging");
    }

    #[test]
    fn test_payload_json_field_names() {
        let payload = MetricsPayload::from_metrics(&sample_metrics());
        let json = serde_json::to_value(&payload).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 6);
        for key in [
            "right_hip_angle",
            "left_hip_angle",
            "right_knee_angle",
            "left_knee_angle",
            "torso_tilt",
            "shoulder_hip_ankle_alignment",
        ] {
            assert!(object.contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::Poor < Tier::Acceptable);
        assert!(Tier::Acceptable < Tier::Excellent);
        assert_eq!([Tier::Excellent, Tier::Poor, Tier::Acceptable].iter().min(), Some(&Tier::Poor));
    }

    #[test]
    fn test_cannot_evaluate_has_no_payload() {
        let outcome = PostureOutcome::CannotEvaluate {
            reason: CannotEvaluateReason::NoBodyDetected,
        };
        assert!(outcome.payload().is_none());

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"cannot_evaluate\""));
        assert!(json.contains("no_body_detected"));
    }

    #[test]
    fn test_summary_without_overall() {
        let evaluation = PostureEvaluation {
            overall: None,
            findings: vec![],
            drivers: vec![],
            hip_height: None,
        };
        assert!(evaluation.summary().contains("Not enough"));
    }
}
