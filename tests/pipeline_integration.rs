use plank_coach::core::config::Config;
use plank_coach::core::posture_evaluator::EvaluationThresholds;
use plank_coach::core::posture_pipeline::PosturePipeline;
use plank_coach::models::pose::{BodyLandmark, Landmark, LandmarkCapture, LandmarkSet};
use plank_coach::models::posture::{
    BodyStrategy, CannotEvaluateReason, MetricKind, PostureIssue, PostureOutcome, Tier,
};

/// Side-on plank with both sides visible. The hip sits below the straight
/// shoulder-knee line by `bend` degrees on each segment.
fn plank(bend_degrees: f64) -> LandmarkSet {
    let drop = 0.2 * bend_degrees.to_radians().tan();
    let mut set = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0, 0.05); BodyLandmark::COUNT]);
    for (left, right, x, y) in [
        (BodyLandmark::LeftShoulder, BodyLandmark::RightShoulder, 0.70, 0.50),
        (BodyLandmark::LeftHip, BodyLandmark::RightHip, 0.50, 0.50 + drop),
        (BodyLandmark::LeftKnee, BodyLandmark::RightKnee, 0.30, 0.50),
        (BodyLandmark::LeftAnkle, BodyLandmark::RightAnkle, 0.10, 0.50 - drop),
    ] {
        set.set(left, Landmark::new(x, y, 0.0, 0.9));
        set.set(right, Landmark::new(x, y, 0.0, 0.8));
    }
    set
}

/// The same plank with the head on the left of the image
fn mirrored(set: &LandmarkSet) -> LandmarkSet {
    let mut flipped = set.clone();
    for landmark in [
        BodyLandmark::LeftShoulder,
        BodyLandmark::RightShoulder,
        BodyLandmark::LeftHip,
        BodyLandmark::RightHip,
        BodyLandmark::LeftKnee,
        BodyLandmark::RightKnee,
        BodyLandmark::LeftAnkle,
        BodyLandmark::RightAnkle,
    ] {
        if let Some(lm) = set.get(landmark) {
            flipped.set(landmark, Landmark::new(1.0 - lm.x, lm.y, lm.z, lm.visibility));
        }
    }
    flipped
}

fn evaluated(outcome: PostureOutcome) -> (plank_coach::PostureMetrics, plank_coach::PostureEvaluation) {
    match outcome {
        PostureOutcome::Evaluated { metrics, evaluation } => (metrics, evaluation),
        other => panic!("expected an evaluation, got {:?}", other),
    }
}

#[test]
fn test_solid_plank_is_excellent() {
    let pipeline = PosturePipeline::default();
    let (metrics, evaluation) = evaluated(pipeline.evaluate(Some(&plank(7.5)), 1000, 1000));

    assert_eq!(metrics.strategy, BodyStrategy::Bilateral);
    assert!((metrics.left_hip_angle.unwrap() - 165.0).abs() < 1e-4);
    assert!((metrics.right_hip_angle.unwrap() - 165.0).abs() < 1e-4);
    assert!((metrics.left_knee_angle.unwrap() - 180.0).abs() < 1e-4);
    assert!((metrics.torso_tilt.unwrap() + 7.5).abs() < 1e-4);

    assert_eq!(evaluation.overall, Some(Tier::Excellent));
    assert!(evaluation.issues().is_empty());
    assert_eq!(evaluation.tier_of(MetricKind::TorsoTilt), Some(Tier::Excellent));
}

#[test]
fn test_head_left_plank_matches_head_right() {
    let pipeline = PosturePipeline::default();
    let (metrics, evaluation) = evaluated(pipeline.evaluate(Some(&mirrored(&plank(7.5))), 1000, 1000));

    assert!((metrics.left_hip_angle.unwrap() - 165.0).abs() < 1e-4);
    assert!((metrics.torso_tilt.unwrap() + 7.5).abs() < 1e-4);
    assert_eq!(evaluation.overall, Some(Tier::Excellent));
    assert!(evaluation.issues().is_empty());
    assert_eq!(evaluation.tier_of(MetricKind::TorsoTilt), Some(Tier::Excellent));
}

#[test]
fn test_head_left_shoulders_straddling_hip_line() {
    let mut set = mirrored(&plank(7.5));
    set.set(BodyLandmark::LeftShoulder, Landmark::new(0.30, 0.50 + 0.0263 + 0.01, 0.0, 0.9));
    set.set(BodyLandmark::RightShoulder, Landmark::new(0.30, 0.50 + 0.0263 - 0.01, 0.0, 0.8));

    let pipeline = PosturePipeline::default();
    let (metrics, _) = evaluated(pipeline.evaluate(Some(&set), 1000, 1000));
    let tilt = metrics.torso_tilt.unwrap();
    assert!(tilt.abs() < 1.0, "tilt {} should stay near level", tilt);
}

#[test]
fn test_sagging_plank_is_poor() {
    let pipeline = PosturePipeline::default();
    let (metrics, evaluation) = evaluated(pipeline.evaluate(Some(&plank(15.0)), 1000, 1000));

    assert!((metrics.left_hip_angle.unwrap() - 150.0).abs() < 1e-4);
    assert_eq!(evaluation.overall, Some(Tier::Poor));

    let issues = evaluation.issues();
    assert!(issues.contains(&PostureIssue::HipsSagging));
    assert!(issues.contains(&PostureIssue::PostureBroken));
    assert!(evaluation.drivers.contains(&MetricKind::LeftHipAngle));
    assert!(evaluation.summary().starts_with("Overall: Poor"));
}

#[test]
fn test_scaling_does_not_change_verdict() {
    let pipeline = PosturePipeline::default();
    let (_, square) = evaluated(pipeline.evaluate(Some(&plank(7.5)), 1000, 1000));
    let (_, large) = evaluated(pipeline.evaluate(Some(&plank(7.5)), 3000, 3000));
    assert_eq!(square.overall, large.overall);
}

#[test]
fn test_cannot_evaluate() {
    let pipeline = PosturePipeline::default();

    assert_eq!(
        pipeline.evaluate(None, 640, 480),
        PostureOutcome::CannotEvaluate {
            reason: CannotEvaluateReason::NoBodyDetected
        }
    );
    assert_eq!(
        pipeline.evaluate(Some(&LandmarkSet::empty()), 640, 480),
        PostureOutcome::CannotEvaluate {
            reason: CannotEvaluateReason::NoBodyDetected
        }
    );

    // Ankles alone support no metric
    let mut ankles = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0, 0.0); BodyLandmark::COUNT]);
    ankles.set(BodyLandmark::LeftAnkle, Landmark::new(0.1, 0.5, 0.0, 0.9));
    ankles.set(BodyLandmark::RightAnkle, Landmark::new(0.1, 0.5, 0.0, 0.9));
    assert_eq!(
        pipeline.evaluate(Some(&ankles), 640, 480),
        PostureOutcome::CannotEvaluate {
            reason: CannotEvaluateReason::InsufficientLandmarks
        }
    );
}

#[test]
fn test_custom_thresholds() {
    let thresholds = EvaluationThresholds {
        hip_acceptable_max: 164.0,
        ..EvaluationThresholds::default()
    };
    let pipeline = PosturePipeline::new(thresholds, 0.5);
    let (_, evaluation) = evaluated(pipeline.evaluate(Some(&plank(7.5)), 1000, 1000));

    assert_eq!(evaluation.overall, Some(Tier::Poor));
    assert!(evaluation.issues().contains(&PostureIssue::HipsDroppedTooFar));
}

#[test]
fn test_capture_json_and_outcome_json() {
    let capture = LandmarkCapture {
        width: 1000,
        height: 1000,
        landmarks: plank(7.5),
    };
    let json = serde_json::to_string(&capture).unwrap();
    let parsed: LandmarkCapture = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.landmarks.len(), BodyLandmark::COUNT);

    let config = Config::default();
    let pipeline = PosturePipeline::new(config.thresholds.clone(), config.detection.min_visibility);
    let outcome = pipeline.evaluate(Some(&parsed.landmarks), parsed.width, parsed.height);

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["status"], "evaluated");

    let payload = outcome.payload().unwrap();
    assert_eq!(payload.left_hip_angle, "165.00");
    assert_eq!(payload.torso_tilt, "-7.50");
}
