//! Campus portal CLI: dry-run liveness sessions and inspect configuration.

use anyhow::Context;
use campus_liveness::{LivenessEngine, LivenessEvent, LivenessStatus};
use campus_nullables::{NullCamera, NullClock, ScriptedDetector};
use campus_portal::{init_logging, PortalConfig};
use campus_types::PortalParams;
use campus_utils::format_countdown;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "campus-portal", about = "Student voting portal tools")]
struct Cli {
    /// Path to a TOML configuration file. Its `[params]` table tunes the
    /// simulated sessions; CLI flags override it.
    #[arg(long, env = "CAMPUS_PORTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a liveness session against a simulated camera and detector.
    Simulate {
        /// Number of challenges to draw (1-5).
        #[arg(long)]
        challenges: Option<u32>,

        /// Seed for the challenge order. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,

        /// Make every K-th challenge check fail.
        #[arg(long, value_name = "K")]
        fail_every: Option<u32>,

        /// Simulated milliseconds per real millisecond.
        #[arg(long, default_value_t = 10)]
        speed: u64,

        /// Print events as JSON lines.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let config = PortalConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            init_logging(config.log_format()?, &config.log_level)?;
            tracing::info!("Loaded config from {}", path.display());
            config
        }
        None => {
            campus_utils::init_tracing();
            PortalConfig::default()
        }
    };

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Simulate {
            challenges,
            seed,
            fail_every,
            speed,
            json,
        } => {
            let mut params = config.params;
            if let Some(count) = challenges {
                params.challenge_count = count;
            }
            let detector = scripted_detector(&params, fail_every);
            simulate(params, detector, seed, speed.max(1), json).await?;
        }
    }

    Ok(())
}

/// Passes every check except each `k`-th one.
fn scripted_detector(params: &PortalParams, fail_every: Option<u32>) -> ScriptedDetector {
    let Some(k) = fail_every.filter(|k| *k > 0) else {
        return ScriptedDetector::passing();
    };
    let checks = params.challenge_count * params.max_challenge_attempts.unwrap_or(10).max(1);
    ScriptedDetector::passing().with_challenges((1..=checks).map(|i| i % k != 0))
}

async fn simulate(
    params: PortalParams,
    detector: ScriptedDetector,
    seed: Option<u64>,
    speed: u64,
    json: bool,
) -> anyhow::Result<()> {
    let tick_ms = params.tick_ms;
    let camera = NullCamera::new();
    let mut engine = match seed {
        Some(seed) => LivenessEngine::with_seed(camera.clone(), detector, params, seed)?,
        None => LivenessEngine::new(camera.clone(), detector, params)?,
    };

    let instructions: Vec<&str> = engine.challenges().iter().map(|c| c.instruction()).collect();
    tracing::info!(challenges = ?instructions, "Starting simulated liveness session");

    let clock = NullClock::new(0);
    engine.start(clock.now())?;

    let step = Duration::from_millis(50);
    let mut ticker = tokio::time::interval(step);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = clock.advance(step.as_millis() as u64 * speed);
                engine.advance(now);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, tearing down session");
                engine.teardown();
                break;
            }
        }
        for event in engine.drain_events() {
            print_event(&event, tick_ms, clock.now().as_millis(), json)?;
        }
        if engine.status().is_terminal() {
            break;
        }
    }

    tracing::info!(
        streams_open = camera.open_streams(),
        "Session ended: {}",
        engine.status()
    );
    match engine.status() {
        LivenessStatus::Verified => Ok(()),
        status => anyhow::bail!(
            "liveness not verified ({status}): {}",
            engine.last_error().unwrap_or("session interrupted")
        ),
    }
}

fn print_event(event: &LivenessEvent, tick_ms: u64, at: u64, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    let line = match event {
        LivenessEvent::CameraStarted => "camera started".to_string(),
        LivenessEvent::CameraFailed(message) => format!("camera failed: {message}"),
        LivenessEvent::FaceDetected(true) => "face detected".to_string(),
        LivenessEvent::FaceDetected(false) => "no face in frame".to_string(),
        LivenessEvent::ChallengeStarted { index, kind } => {
            format!("challenge {}: {}", index + 1, kind.instruction())
        }
        LivenessEvent::CountdownTick { remaining } => {
            format!("  {}", format_countdown(u64::from(*remaining) * tick_ms))
        }
        LivenessEvent::ChallengeFailed { index, attempt } => {
            format!("challenge {} not confirmed (attempt {attempt})", index + 1)
        }
        LivenessEvent::ChallengeCompleted { index } => format!("challenge {} completed", index + 1),
        LivenessEvent::Progress(p) => format!("progress {p:.0}%"),
        LivenessEvent::Processing => "processing...".to_string(),
        LivenessEvent::Verified(true) => "liveness verified".to_string(),
        LivenessEvent::Verified(false) => "liveness failed".to_string(),
        LivenessEvent::Skipped => "liveness skipped".to_string(),
    };
    println!("[{:>6}] {line}", format_countdown(at));
    Ok(())
}
