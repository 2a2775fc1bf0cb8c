// Landmark extraction - maps normalized detector output to named points in pixel space

use crate::core::geometry::Point2;
use crate::models::pose::{AnatomicalRole, BodyPart, LandmarkSet, Side};
use std::collections::HashMap;

/// A landmark scaled to pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnatomicalPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub visibility: f64,
}

impl AnatomicalPoint {
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Named points detected in one image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnatomicalPoints {
    points: HashMap<AnatomicalRole, AnatomicalPoint>,
}

impl AnatomicalPoints {
    pub fn get(&self, side: Side, part: BodyPart) -> Option<&AnatomicalPoint> {
        self.points.get(&AnatomicalRole::new(side, part))
    }

    pub fn by_name(&self, name: &str) -> Option<&AnatomicalPoint> {
        self.points
            .iter()
            .find(|(role, _)| role.name() == name)
            .map(|(_, point)| point)
    }

    pub fn insert(&mut self, role: AnatomicalRole, point: AnatomicalPoint) {
        self.points.insert(role, point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when every listed part was detected on `side`
    pub fn has_all(&self, side: Side, parts: &[BodyPart]) -> bool {
        parts.iter().all(|part| self.get(side, *part).is_some())
    }
}

/// Result of extraction. `NoLandmarks` is terminal: the image cannot be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    NoLandmarks,
    Points(AnatomicalPoints),
}

/// Scales the plank-relevant landmarks of a `LandmarkSet` into pixel space
#[derive(Debug, Clone, Copy)]
pub struct LandmarkExtractor {
    min_visibility: f64,
}

impl LandmarkExtractor {
    /// Create an extractor
    ///
    /// # Arguments
    /// * `min_visibility` - Landmarks with a lower visibility score are treated as undetected
    pub fn new(min_visibility: f64) -> Self {
        Self { min_visibility }
    }

    pub fn extract(&self, landmarks: Option<&LandmarkSet>, width: u32, height: u32) -> Extraction {
        let landmarks = match landmarks {
            Some(set) if !set.is_empty() => set,
            _ => return Extraction::NoLandmarks,
        };

        let (w, h) = (f64::from(width), f64::from(height));
        let mut points = AnatomicalPoints::default();

        for role in AnatomicalRole::all() {
            if let Some(lm) = landmarks.detected(role.landmark(), self.min_visibility) {
                points.insert(
                    role,
                    AnatomicalPoint {
                        x: lm.x * w,
                        y: lm.y * h,
                        z: lm.z,
                        visibility: lm.visibility,
                    },
                );
            }
        }

        if points.is_empty() {
            log::debug!("Landmark set has no visible plank landmarks");
            return Extraction::NoLandmarks;
        }

        Extraction::Points(points)
    }
}
