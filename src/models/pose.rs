// Data models for body landmarks and the detection boundary

use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// Body Landmarks (33 keypoints)
// ==============================================================================

/// MediaPipe Pose Landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    /// Number of landmarks in the MediaPipe body vocabulary
    pub const COUNT: usize = 33;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Body side, as seen by the detector (the subject's own left/right)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn all() -> [Side; 2] {
        [Side::Left, Side::Right]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Joints the plank evaluation reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Shoulder,
    Hip,
    Knee,
    Ankle,
}

impl BodyPart {
    pub fn all() -> [BodyPart; 4] {
        [BodyPart::Shoulder, BodyPart::Hip, BodyPart::Knee, BodyPart::Ankle]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Shoulder => "shoulder",
            BodyPart::Hip => "hip",
            BodyPart::Knee => "knee",
            BodyPart::Ankle => "ankle",
        }
    }
}

/// A named anatomical role, e.g. `left_shoulder`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnatomicalRole {
    pub side: Side,
    pub part: BodyPart,
}

impl AnatomicalRole {
    pub const fn new(side: Side, part: BodyPart) -> Self {
        Self { side, part }
    }

    /// All eight roles used by the plank evaluation
    pub fn all() -> Vec<AnatomicalRole> {
        Side::all()
            .into_iter()
            .flat_map(|side| BodyPart::all().into_iter().map(move |part| Self::new(side, part)))
            .collect()
    }

    /// Landmark index backing this role
    pub fn landmark(&self) -> BodyLandmark {
        match (self.side, self.part) {
            (Side::Left, BodyPart::Shoulder) => BodyLandmark::LeftShoulder,
            (Side::Right, BodyPart::Shoulder) => BodyLandmark::RightShoulder,
            (Side::Left, BodyPart::Hip) => BodyLandmark::LeftHip,
            (Side::Right, BodyPart::Hip) => BodyLandmark::RightHip,
            (Side::Left, BodyPart::Knee) => BodyLandmark::LeftKnee,
            (Side::Right, BodyPart::Knee) => BodyLandmark::RightKnee,
            (Side::Left, BodyPart::Ankle) => BodyLandmark::LeftAnkle,
            (Side::Right, BodyPart::Ankle) => BodyLandmark::RightAnkle,
        }
    }

    pub fn name(&self) -> String {
        format!("{}_{}", self.side.as_str(), self.part.as_str())
    }
}

impl fmt::Display for AnatomicalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ==============================================================================
// Landmark / LandmarkSet
// ==============================================================================

/// A detected keypoint with visibility score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64, // Normalized [0, 1] for image coordinates
    pub y: f64, // Normalized [0, 1] for image coordinates
    #[serde(default)]
    pub z: f64, // Depth relative to the hip midpoint
    #[serde(default = "default_visibility")]
    pub visibility: f64, // Detection confidence [0, 1]
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    pub fn is_visible(&self, threshold: f64) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.visibility >= threshold
    }
}

/// Landmarks for one detected body, indexed by `BodyLandmark`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn get(&self, landmark: BodyLandmark) -> Option<&Landmark> {
        self.landmarks.get(landmark.index())
    }

    /// Landmark for `landmark` if it passes the visibility threshold
    pub fn detected(&self, landmark: BodyLandmark, min_visibility: f64) -> Option<&Landmark> {
        self.get(landmark).filter(|lm| lm.is_visible(min_visibility))
    }

    /// Set a landmark, growing the set with invisible placeholders if needed
    pub fn set(&mut self, landmark: BodyLandmark, value: Landmark) {
        let index = landmark.index();
        if self.landmarks.len() <= index {
            self.landmarks
                .resize(index + 1, Landmark::new(f64::NAN, f64::NAN, 0.0, 0.0));
        }
        self.landmarks[index] = value;
    }
}

/// Landmarks captured from one image, with the image's pixel size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkCapture {
    pub width: u32,
    pub height: u32,
    pub landmarks: LandmarkSet,
}

// ==============================================================================
// Decoded image (detector input)
// ==============================================================================

/// Raw RGB8 pixel grid handed to the landmark detector
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl DecodedImage {
    /// Decode an uploaded image (JPEG, PNG, ...) into RGB8
    pub fn from_bytes(bytes: &[u8]) -> PoseResult<Self> {
        if bytes.is_empty() {
            return Err(PoseError::ImageDecode("empty upload".to_string()));
        }
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();

        Ok(Self {
            width,
            height,
            rgb: rgb.into_raw(),
        })
    }
}

// ==============================================================================
// Detection configuration
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseConfig {
    pub min_detection_confidence: f32, // Minimum confidence for a body detection (default: 0.5)
    pub min_visibility: f64,           // Landmarks below this visibility are undetected (default: 0.5)
    pub model_complexity: ModelComplexity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelComplexity {
    Lite = 0,   // Fastest, less accurate
    Full = 1,   // Balanced
    Heavy = 2,  // Slowest, most accurate
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.5,
            min_visibility: 0.5,
            model_complexity: ModelComplexity::Full,
        }
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Image decode failed: {0}")]
    ImageDecode(String),

    #[error("Model loading failed: {0}")]
    ModelLoadFailed(String),

    #[error("Landmark detection failed: {0}")]
    DetectionFailed(String),

    #[error("Text generation failed: {0}")]
    GenerationFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<image::ImageError> for PoseError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageDecode(err.to_string())
    }
}

pub type PoseResult<T> = Result<T, PoseError>;
