// Posture metric calculation - joint angles, torso tilt and hip height from named points

use crate::core::geometry::{angle, horizontal_tilt, is_degenerate, Point2};
use crate::core::landmark_extractor::{AnatomicalPoint, AnatomicalPoints};
use crate::models::pose::{BodyPart, Side};
use crate::models::posture::{BodyStrategy, HipHeight, MetricKind, PostureMetrics};

/// Share of the shoulder-ankle vertical span the hip may deviate from the midpoint
pub const HIP_HEIGHT_TOLERANCE: f64 = 0.1;

const HIP_ANGLE_PARTS: [BodyPart; 3] = [BodyPart::Shoulder, BodyPart::Hip, BodyPart::Knee];
const KNEE_ANGLE_PARTS: [BodyPart; 3] = [BodyPart::Hip, BodyPart::Knee, BodyPart::Ankle];
const TORSO_PARTS: [BodyPart; 2] = [BodyPart::Shoulder, BodyPart::Hip];
const HIP_HEIGHT_PARTS: [BodyPart; 3] = [BodyPart::Shoulder, BodyPart::Hip, BodyPart::Ankle];

/// What one side of the body can contribute, given the detected points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SideCapability {
    hip_angle: bool,
    knee_angle: bool,
    torso: bool,
    hip_height: bool,
}

impl SideCapability {
    fn probe(points: &AnatomicalPoints, side: Side) -> Self {
        Self {
            hip_angle: points.has_all(side, &HIP_ANGLE_PARTS),
            knee_angle: points.has_all(side, &KNEE_ANGLE_PARTS),
            torso: points.has_all(side, &TORSO_PARTS),
            hip_height: points.has_all(side, &HIP_HEIGHT_PARTS),
        }
    }

    fn any(&self) -> bool {
        self.hip_angle || self.knee_angle || self.torso || self.hip_height
    }
}

/// Classify the hip against the vertical midpoint of shoulder and ankle.
///
/// Image y grows downward, so a hip below the midpoint has the larger y. The
/// tolerance boundary itself counts as OK.
pub fn classify_hip_height(shoulder: Point2, hip: Point2, ankle: Point2) -> HipHeight {
    let center_y = (shoulder.y + ankle.y) / 2.0;
    let threshold = HIP_HEIGHT_TOLERANCE * (ankle.y - shoulder.y).abs();

    if (hip.y - center_y).abs() <= threshold {
        HipHeight::HeightOk
    } else if hip.y > center_y {
        HipHeight::HipsSagging
    } else {
        HipHeight::HipsTooHigh
    }
}

/// Computes `PostureMetrics`, selecting bilateral or unilateral computation
/// from whichever points were detected
#[derive(Debug, Clone, Copy, Default)]
pub struct PostureMetricCalculator;

impl PostureMetricCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when neither side has enough points for any metric
    pub fn calculate(&self, points: &AnatomicalPoints) -> Option<PostureMetrics> {
        let left = SideCapability::probe(points, Side::Left);
        let right = SideCapability::probe(points, Side::Right);

        let strategy = match (left.any(), right.any()) {
            (true, true) => BodyStrategy::Bilateral,
            (true, false) => BodyStrategy::Unilateral(Side::Left),
            (false, true) => BodyStrategy::Unilateral(Side::Right),
            (false, false) => return None,
        };
        log::debug!("Metric strategy: {:?}", strategy);

        let mut low_confidence = Vec::new();
        let mut hip_angles = [None, None];
        let mut knee_angles = [None, None];
        let mut tilts = Vec::with_capacity(2);

        for (slot, (side, capability)) in [(Side::Left, left), (Side::Right, right)].into_iter().enumerate() {
            let at = |part| point(points, side, part);

            if capability.hip_angle {
                let (shoulder, hip, knee) = (at(BodyPart::Shoulder), at(BodyPart::Hip), at(BodyPart::Knee));
                if let (Some(s), Some(h), Some(k)) = (shoulder, hip, knee) {
                    if is_degenerate(s, h, k) {
                        low_confidence.push(MetricKind::hip_angle(side));
                    }
                    hip_angles[slot] = Some(angle(s, h, k));
                }
            }

            if capability.knee_angle {
                let (hip, knee, ankle) = (at(BodyPart::Hip), at(BodyPart::Knee), at(BodyPart::Ankle));
                if let (Some(h), Some(k), Some(a)) = (hip, knee, ankle) {
                    if is_degenerate(h, k, a) {
                        low_confidence.push(MetricKind::knee_angle(side));
                    }
                    knee_angles[slot] = Some(angle(h, k, a));
                }
            }

            if capability.torso {
                if let (Some(s), Some(h)) = (at(BodyPart::Shoulder), at(BodyPart::Hip)) {
                    tilts.push(horizontal_tilt(h, s));
                }
            }
        }

        // Missing sides are left out of the mean rather than counted as zero
        let torso_tilt = if tilts.is_empty() {
            None
        } else {
            Some(tilts.iter().sum::<f64>() / tilts.len() as f64)
        };

        let hip_height_side = Self::hip_height_side(points, left, right);
        let hip_height = hip_height_side.and_then(|side| {
            let shoulder = point(points, side, BodyPart::Shoulder)?;
            let hip = point(points, side, BodyPart::Hip)?;
            let ankle = point(points, side, BodyPart::Ankle)?;
            Some(classify_hip_height(shoulder, hip, ankle))
        });

        Some(PostureMetrics {
            left_hip_angle: hip_angles[0],
            right_hip_angle: hip_angles[1],
            left_knee_angle: knee_angles[0],
            right_knee_angle: knee_angles[1],
            torso_tilt,
            hip_height,
            hip_height_side,
            strategy,
            low_confidence,
        })
    }

    /// Reference side for the hip-height heuristic: the side whose shoulder, hip
    /// and ankle have the higher minimum visibility, left on ties
    fn hip_height_side(points: &AnatomicalPoints, left: SideCapability, right: SideCapability) -> Option<Side> {
        let confidence = |side: Side| -> f64 {
            HIP_HEIGHT_PARTS
                .iter()
                .filter_map(|part| points.get(side, *part))
                .map(|p: &AnatomicalPoint| p.visibility)
                .fold(f64::INFINITY, f64::min)
        };

        match (left.hip_height, right.hip_height) {
            (true, true) => {
                if confidence(Side::Right) > confidence(Side::Left) {
                    Some(Side::Right)
                } else {
                    Some(Side::Left)
                }
            }
            (true, false) => Some(Side::Left),
            (false, true) => Some(Side::Right),
            (false, false) => None,
        }
    }
}

fn point(points: &AnatomicalPoints, side: Side, part: BodyPart) -> Option<Point2> {
    points.get(side, part).map(AnatomicalPoint::point)
}
