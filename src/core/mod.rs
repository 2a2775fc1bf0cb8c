pub mod config;

// Plank posture evaluation
pub mod geometry;
pub mod landmark_extractor;
pub mod posture_metrics;
pub mod posture_evaluator;
pub mod posture_pipeline;

// Coaching feedback
pub mod feedback_prompt;
