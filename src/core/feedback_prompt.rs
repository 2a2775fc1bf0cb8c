// Feedback prompt building - assembles coaching requests for the text-generation backend

use crate::core::posture_evaluator::EvaluationThresholds;
use crate::models::feedback::{ChatTurn, FeedbackRequest, Speaker};
use crate::models::posture::{
    CannotEvaluateReason, MetricKind, MetricsPayload, PostureEvaluation, PostureMetrics,
};

/// User-facing instruction when no body was found in the image
pub fn no_body_message() -> &'static str {
    "I can't see you yet! Step back and position your whole body in frame, side-on, then try again."
}

/// User-facing instruction for a cannot-evaluate outcome
pub fn cannot_evaluate_message(reason: CannotEvaluateReason) -> &'static str {
    match reason {
        CannotEvaluateReason::NoBodyDetected => no_body_message(),
        CannotEvaluateReason::InsufficientLandmarks => {
            "Only part of your body is visible. Make sure your shoulders, hips, knees and ankles are all in frame."
        }
    }
}

/// Builds the plank coaching request from metrics and their evaluation
#[derive(Debug, Clone, Default)]
pub struct FeedbackPromptBuilder {
    thresholds: EvaluationThresholds,
}

impl FeedbackPromptBuilder {
    pub fn new(thresholds: EvaluationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn build(&self, metrics: &PostureMetrics, evaluation: &PostureEvaluation) -> FeedbackRequest {
        let payload = MetricsPayload::from_metrics(metrics);
        let prompt = self.render_prompt(&payload, evaluation);

        FeedbackRequest {
            payload,
            evaluation: evaluation.clone(),
            prompt,
        }
    }

    fn render_prompt(&self, payload: &MetricsPayload, evaluation: &PostureEvaluation) -> String {
        let t = &self.thresholds;
        let mut prompt = String::new();

        prompt.push_str(
            "Using the [Skeleton data] below, judge whether this plank is correct according to the \
             [Guidelines] and give short advice following the [Advice style].\n\
             Leave out anything unnecessary and answer in one short sentence.\n\n",
        );

        prompt.push_str("[Skeleton data]\n");
        for metric in MetricKind::all() {
            prompt.push_str(&format!(
                "- {} ({}): {}\n",
                metric.description(),
                metric.field_name(),
                degrees(payload.field(metric))
            ));
        }
        prompt.push_str(&format!(
            "- hip height (shoulder_hip_ankle_alignment): {}\n\n",
            payload.shoulder_hip_ankle_alignment
        ));

        prompt.push_str("[Guidelines]\n");
        prompt.push_str(&format!(
            "- A hip angle between {} and {} degrees is good. Below {} the hips are sagging; above {} they have dropped too far.\n",
            t.hip_acceptable_min, t.hip_acceptable_max, t.hip_acceptable_min, t.hip_acceptable_max
        ));
        prompt.push_str(&format!(
            "- A hip angle of {} degrees, give or take {}, is an excellent posture.\n",
            t.hip_target, t.hip_excellent_tolerance
        ));
        prompt.push_str(&format!(
            "- A knee angle of {} degrees or more is good; anything less means the knees are bent.\n",
            t.knee_min
        ));
        prompt.push_str(&format!(
            "- A torso tilt between -{} and {} degrees means the back is straight; beyond that the posture is broken.\n",
            t.torso_tilt_limit, t.torso_tilt_limit
        ));
        prompt.push_str("- Take the hip height assessment into account as well.\n\n");

        prompt.push_str("[Assessment]\n");
        match evaluation.overall {
            Some(overall) => prompt.push_str(&format!("- overall: {}\n", overall.label())),
            None => prompt.push_str("- overall: not assessable\n"),
        }
        for line in evaluation.explanations() {
            prompt.push_str(&format!("- {}\n", line));
        }
        prompt.push('\n');

        prompt.push_str("[Advice style]\n");
        prompt.push_str(
            "- Speak like a fired-up personal trainer, e.g. \"Looking great!\" or \
             \"That won't get you where you want to be!\"\n",
        );
        prompt.push_str("- If the whole posture is excellent, praise it to the skies.\n");
        prompt.push_str("- If something is off, point it out first, then cheer them on.\n");
        prompt.push_str("- Keep it as short as possible, one or two sentences.\n\n");

        prompt.push_str(
            "Write the advice as a single sentence. Do not include specific numbers such as \
             degree values or thresholds in the advice.\n",
        );

        prompt
    }
}

fn degrees(value: &str) -> String {
    if value.parse::<f64>().is_ok() {
        format!("{}°", value)
    } else {
        value.to_string()
    }
}

/// Render the trainer chat history, leaving an open `Trainer:` line for the reply
pub fn build_chat_prompt(history: &[ChatTurn]) -> String {
    let mut lines: Vec<String> = history
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker.role(), turn.text.trim()))
        .collect();
    lines.push(format!("{}:", Speaker::Trainer.role()));
    lines.join("\n")
}

/// First non-empty line of a generated reply
pub fn first_reply_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("Trainer:").unwrap_or(line).trim().to_string())
        .filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::posture_evaluator::PostureEvaluator;
    use crate::models::pose::Side;
    use crate::models::posture::{BodyStrategy, HipHeight};

    fn metrics() -> PostureMetrics {
        PostureMetrics {
            left_hip_angle: Some(150.0),
            right_hip_angle: Some(151.237),
            left_knee_angle: Some(172.0),
            right_knee_angle: None,
            torso_tilt: Some(-4.5),
            hip_height: Some(HipHeight::HipsSagging),
            hip_height_side: Some(Side::Left),
            strategy: BodyStrategy::Bilateral,
            low_confidence: vec![],
        }
    }

    #[test]
    fn test_prompt_embeds_every_field() {
        let m = metrics();
        let evaluation = PostureEvaluator::default().evaluate(&m);
        let request = FeedbackPromptBuilder::default().build(&m, &evaluation);

        assert!(request.prompt.contains("right_hip_angle): 151.24°"));
        assert!(request.prompt.contains("left_hip_angle): 150.00°"));
        assert!(request.prompt.contains("left_knee_angle): 172.00°"));
        assert!(request.prompt.contains("right_knee_angle): unavailable"));
        assert!(request.prompt.contains("torso_tilt): -4.50°"));
        assert!(request.prompt.contains("shoulder_hip_ankle_alignment): hips sagging"));
        assert!(request.prompt.contains("- overall: Poor"));
        assert!(request.prompt.contains("Do not include specific numbers"));
        assert_eq!(request.payload.right_hip_angle, "151.24");
    }

    #[test]
    fn test_guidelines_follow_thresholds() {
        let thresholds = EvaluationThresholds {
            hip_acceptable_max: 175.0,
            ..Default::default()
        };
        let m = metrics();
        let evaluation = PostureEvaluator::new(thresholds.clone()).evaluate(&m);
        let request = FeedbackPromptBuilder::new(thresholds).build(&m, &evaluation);
        assert!(request.prompt.contains("between 155 and 175 degrees"));
        assert!(request.prompt.contains("165 degrees, give or take 3"));
    }

    #[test]
    fn test_chat_prompt() {
        let history = vec![
            ChatTurn::user("How was my plank?"),
            ChatTurn::trainer("Hips up, champ!"),
            ChatTurn::user("  Like this?  "),
        ];
        assert_eq!(
            build_chat_prompt(&history),
            "User: How was my plank?\nTrainer: Hips up, champ!\nUser: Like this?\nTrainer:"
        );
        assert_eq!(build_chat_prompt(&[]), "Trainer:");
    }

    #[test]
    fn test_first_reply_line() {
        assert_eq!(
            first_reply_line("\n  Great form!\nKeep going.").as_deref(),
            Some("Great form!")
        );
        assert_eq!(first_reply_line("Trainer: Push it!").as_deref(), Some("Push it!"));
        assert_eq!(first_reply_line("   \n\n"), None);
    }

    #[test]
    fn test_cannot_evaluate_messages() {
        assert!(cannot_evaluate_message(CannotEvaluateReason::NoBodyDetected).contains("whole body in frame"));
        assert!(cannot_evaluate_message(CannotEvaluateReason::InsufficientLandmarks).contains("ankles"));
    }
}
