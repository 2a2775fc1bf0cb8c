use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use plank_coach::core::config::Config;
use plank_coach::models::feedback::ChatTurn;
use plank_coach::models::pose::{LandmarkCapture, LandmarkSet};
use plank_coach::models::posture::PostureOutcome;
use plank_coach::CoachService;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Plank posture coach
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    plank-coach evaluate --image plank.jpg --feedback
    plank-coach evaluate --landmarks capture.json --json
    plank-coach evaluate --landmarks landmarks.json --width 1280 --height 720
    plank-coach prompt --landmarks capture.json
    plank-coach chat --history history.json
    plank-coach config show"#)]
struct Cli {
    /// Configuration file [default: ~/.plank_coach/config/settings.json]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a plank from an image or precomputed landmarks
    Evaluate(EvaluateArgs),
    /// Print the coaching prompt for precomputed landmarks
    Prompt(PromptArgs),
    /// Ask the trainer for the next chat reply
    Chat(ChatArgs),
    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Image file (JPEG, PNG, ...)
    #[arg(long, conflicts_with = "landmarks", required_unless_present = "landmarks")]
    image: Option<PathBuf>,

    /// Landmark JSON: a capture object or a bare landmark array
    #[arg(long)]
    landmarks: Option<PathBuf>,

    /// Image width in pixels for a bare landmark array
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels for a bare landmark array
    #[arg(long)]
    height: Option<u32>,

    /// Print the outcome as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Produce a coaching message
    #[arg(long, default_value_t = false)]
    feedback: bool,
}

#[derive(Args, Debug)]
struct PromptArgs {
    /// Landmark JSON: a capture object or a bare landmark array
    #[arg(long)]
    landmarks: PathBuf,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,
}

#[derive(Args, Debug)]
struct ChatArgs {
    /// JSON array of {"speaker": "user"|"trainer", "text": ...}
    #[arg(long)]
    history: PathBuf,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the active configuration
    Show,
    /// Restore default settings
    Reset,
    /// Print the configuration file location
    Path,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkInput {
    Capture(LandmarkCapture),
    Bare(LandmarkSet),
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    config.map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

fn read_landmarks(path: &Path, width: Option<u32>, height: Option<u32>) -> Result<LandmarkCapture> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: LandmarkInput = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid landmark JSON in {}", path.display()))?;

    match input {
        LandmarkInput::Capture(mut capture) => {
            capture.width = width.unwrap_or(capture.width);
            capture.height = height.unwrap_or(capture.height);
            Ok(capture)
        }
        LandmarkInput::Bare(landmarks) => match (width, height) {
            (Some(width), Some(height)) => Ok(LandmarkCapture {
                width,
                height,
                landmarks,
            }),
            _ => bail!("--width and --height are required for a bare landmark array"),
        },
    }
}

fn print_outcome(outcome: &PostureOutcome) {
    match outcome {
        PostureOutcome::Evaluated { evaluation, .. } => {
            let payload = outcome.payload();
            if let Some(payload) = payload {
                println!("left hip angle:   {}", payload.left_hip_angle);
                println!("right hip angle:  {}", payload.right_hip_angle);
                println!("left knee angle:  {}", payload.left_knee_angle);
                println!("right knee angle: {}", payload.right_knee_angle);
                println!("torso tilt:       {}", payload.torso_tilt);
                println!("hip height:       {}", payload.shoulder_hip_ankle_alignment);
            }
            println!();
            for line in evaluation.explanations() {
                println!("  {}", line);
            }
            println!("{}", evaluation.summary());
        }
        PostureOutcome::CannotEvaluate { reason } => {
            println!("Cannot evaluate: {:?}", reason);
        }
    }
}

async fn evaluate(service: &CoachService, args: EvaluateArgs) -> Result<()> {
    let outcome = match (&args.image, &args.landmarks) {
        (Some(image), _) => {
            let bytes = std::fs::read(image)
                .with_context(|| format!("Failed to read {}", image.display()))?;
            service.evaluate_image(&bytes)?
        }
        (None, Some(path)) => {
            let capture = read_landmarks(path, args.width, args.height)?;
            service.evaluate_landmarks(Some(&capture.landmarks), capture.width, capture.height)
        }
        (None, None) => bail!("Either --image or --landmarks is required"),
    };

    if args.feedback {
        if !service.has_generator() {
            log::info!("No text generator available, coaching from the evaluation summary");
        }
        let reply = service.coach(outcome).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&reply)?);
        } else {
            print_outcome(&reply.outcome);
            println!();
            println!("{}", reply.message);
        }
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn prompt(service: &CoachService, args: PromptArgs) -> Result<()> {
    let capture = read_landmarks(&args.landmarks, args.width, args.height)?;
    let outcome = service.evaluate_landmarks(Some(&capture.landmarks), capture.width, capture.height);

    match service.feedback_request(&outcome) {
        Some(request) => println!("{}", request.prompt),
        None => print_outcome(&outcome),
    }
    Ok(())
}

async fn chat(service: &CoachService, args: ChatArgs) -> Result<()> {
    let contents = std::fs::read_to_string(&args.history)
        .with_context(|| format!("Failed to read {}", args.history.display()))?;
    let history: Vec<ChatTurn> = serde_json::from_str(&contents).context("Invalid chat history")?;

    let reply = service.chat(&history).await?;
    println!("{}", reply);
    Ok(())
}

fn config_command(path: Option<&Path>, command: ConfigCommand) -> Result<()> {
    let file = match path {
        Some(path) => path.to_path_buf(),
        None => Config::get_config_path().map_err(|e| anyhow::anyhow!("{}", e))?,
    };

    match command {
        ConfigCommand::Show => {
            let config = load_config(path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Reset => {
            let reset = match path {
                Some(path) => Config::default().save_to(path),
                None => Config::reset().map(|_| ()),
            };
            reset.map_err(|e| anyhow::anyhow!("Failed to reset configuration: {}", e))?;
            println!("Configuration reset: {}", file.display());
        }
        ConfigCommand::Path => println!("{}", file.display()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = match cli.command {
        Commands::Config(command) => return config_command(cli.config.as_deref(), command),
        command => command,
    };

    let config = load_config(cli.config.as_deref())?;
    let service = CoachService::from_config(config)?;

    match command {
        Commands::Evaluate(args) => evaluate(&service, args).await,
        Commands::Prompt(args) => prompt(&service, args),
        Commands::Chat(args) => chat(&service, args).await,
        Commands::Config(_) => Ok(()),
    }
}
