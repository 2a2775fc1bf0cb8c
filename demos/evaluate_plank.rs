/// Example program to exercise the plank evaluation pipeline on synthetic poses
/// Run with: cargo run --example evaluate_plank

use plank_coach::core::feedback_prompt::FeedbackPromptBuilder;
use plank_coach::core::posture_pipeline::PosturePipeline;
use plank_coach::models::pose::{BodyLandmark, Landmark, LandmarkSet};
use plank_coach::models::posture::PostureOutcome;

/// Side-on plank whose hip sits `drop` (normalized units) below the shoulder line
fn side_on_plank(drop: f64) -> LandmarkSet {
    let mut set = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0, 0.1); BodyLandmark::COUNT]);
    let joints = [
        (BodyLandmark::LeftShoulder, BodyLandmark::RightShoulder, 0.70, 0.50),
        (BodyLandmark::LeftHip, BodyLandmark::RightHip, 0.50, 0.50 + drop),
        (BodyLandmark::LeftKnee, BodyLandmark::RightKnee, 0.30, 0.50),
        (BodyLandmark::LeftAnkle, BodyLandmark::RightAnkle, 0.10, 0.50 - drop),
    ];
    for (left, right, x, y) in joints {
        set.set(left, Landmark::new(x, y, -0.05, 0.95));
        set.set(right, Landmark::new(x + 0.01, y, 0.05, 0.80));
    }
    set
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Plank Evaluation Demo ===\n");

    let pipeline = PosturePipeline::default();
    let prompts = FeedbackPromptBuilder::default();

    let poses = [
        ("Solid plank", side_on_plank(0.2 * 7.5f64.to_radians().tan())),
        ("Sagging hips", side_on_plank(0.2 * 16.0f64.to_radians().tan())),
        ("Nobody in frame", LandmarkSet::empty()),
    ];

    for (name, landmarks) in &poses {
        println!("{}:", name);
        let outcome = pipeline.evaluate(Some(landmarks), 1280, 1280);

        match &outcome {
            PostureOutcome::Evaluated { metrics, evaluation } => {
                for line in evaluation.explanations() {
                    println!("  {}", line);
                }
                println!("  {}", evaluation.summary());

                let request = prompts.build(metrics, evaluation);
                println!("  Prompt: {} characters", request.prompt.len());
            }
            PostureOutcome::CannotEvaluate { reason } => {
                println!("  Cannot evaluate: {:?}", reason);
            }
        }

        println!("  JSON: {}", serde_json::to_string(&outcome)?);
        println!();
    }

    println!("=== Demo Complete ===");
    Ok(())
}
