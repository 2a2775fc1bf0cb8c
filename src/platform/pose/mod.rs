// Pose estimation platform integration
// Provides the MediaPipe landmark detection bridge

pub mod mediapipe_bridge;

pub use mediapipe_bridge::{DefaultMediaPipe, LandmarkDetector};
