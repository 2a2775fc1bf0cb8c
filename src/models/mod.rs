// Data models for landmarks, posture metrics/evaluation, and coaching feedback

pub mod pose;
pub mod posture;
pub mod feedback;
