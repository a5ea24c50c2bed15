use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use aperture_gateway::classify::{DurationClassifier, RemoteClassifier};
use aperture_gateway::speech::{RemoteSynthesizer, SpeechOutput, Speaker, Synthesizer};
use aperture_gateway::telemetry::DisplayState;
use aperture_gateway::{Config, Engine, PatientContext};

/// Aperture - Lip-aperture assistive communication gateway
#[derive(Parser)]
#[command(name = "aperture", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable speech output (for headless hosts without audio hardware)
    #[arg(long, env = "APERTURE_DISABLE_SPEECH")]
    disable_speech: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Feed a recorded aperture trace through the full pipeline
    Replay {
        /// JSONL file of aperture samples
        file: PathBuf,

        /// Frame rate to assume for records without timestamps
        #[arg(long, default_value = "30")]
        fps: f64,
    },
    /// Classify a single utterance duration
    Classify {
        /// Duration in seconds
        duration: f64,
    },
    /// Test speech output
    Say {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the speech output.")]
        text: String,
    },
    /// List available synthesizer voices
    Voices,
}

/// One recorded frame: normalized inner-lip distance, optionally stamped
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    /// Milliseconds from the start of the recording
    #[serde(default)]
    t_ms: Option<u64>,
    /// Normalized inner-lip distance for the frame
    inner_distance: f64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Third-party targets are noisy at info; keep the sink filtered so
    // library code never has to touch global output
    let filter = match cli.verbose {
        0 => "info,aperture_gateway=info,hyper=warn,reqwest=warn,cpal=warn",
        1 => "info,aperture_gateway=debug,hyper=warn,reqwest=warn",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_with_options(cli.disable_speech)?;

    match cli.command {
        Command::Replay { file, fps } => replay(&config, &file, fps).await,
        Command::Classify { duration } => classify_once(&config, duration).await,
        Command::Say { text } => say(&config, &text).await,
        Command::Voices => list_voices(&config).await,
    }
}

fn build_classifier(
    config: &Config,
    display: &Arc<DisplayState>,
    speaker: Option<Arc<dyn Speaker>>,
) -> Arc<DurationClassifier> {
    let provider = Arc::new(RemoteClassifier::new(
        config.classifier.endpoint.clone(),
        config.classifier.api_key.clone(),
        config.classifier.mapping.clone(),
    ));

    Arc::new(DurationClassifier::new(
        provider,
        Arc::clone(display),
        PatientContext::shared(),
        speaker,
    ))
}

fn build_speaker(config: &Config) -> anyhow::Result<Option<Arc<dyn Speaker>>> {
    if !config.speech.enabled {
        return Ok(None);
    }

    let Some(api_key) = config.speech.api_key.clone() else {
        return Ok(None);
    };

    let synth = RemoteSynthesizer::new(
        config.speech.endpoint.clone(),
        api_key,
        config.speech.model.clone(),
        config.speech.speed,
    )?;

    let speaker: Arc<dyn Speaker> = Arc::new(SpeechOutput::new(Arc::new(synth)));
    Ok(Some(speaker))
}

async fn replay(config: &Config, file: &Path, fps: f64) -> anyhow::Result<()> {
    anyhow::ensure!(fps > 0.0, "fps must be positive");

    let raw = std::fs::read_to_string(file)?;
    let display = Arc::new(DisplayState::new());
    let speaker = build_speaker(config)?;
    let classifier = build_classifier(config, &display, speaker);
    let mut engine = Engine::new(Arc::clone(&display), Arc::clone(&classifier));

    let frame_interval_ms = 1000.0 / fps;
    let base = Instant::now();
    let mut frames = 0u64;

    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: ReplayRecord = serde_json::from_str(line)
            .map_err(|e| anyhow::anyhow!("{}:{}: {e}", file.display(), index + 1))?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let t_ms = record
            .t_ms
            .unwrap_or_else(|| (index as f64 * frame_interval_ms) as u64);

        engine.process_distance(record.inner_distance, base + Duration::from_millis(t_ms));
        frames += 1;
    }

    tracing::info!(frames, "trace replayed, draining classifications");

    // Classifications are fire-and-forget; wait for the last one to land
    let deadline = Instant::now() + Duration::from_secs(180);
    loop {
        tokio::time::sleep(Duration::from_millis(200)).await;
        if !display.snapshot().in_progress || Instant::now() > deadline {
            break;
        }
    }

    let snapshot = display.snapshot();
    match snapshot.prediction {
        Some(prediction) => println!(
            "{} (confidence {:.2}, {})",
            prediction.detected_sentence, prediction.confidence, prediction.engine
        ),
        None => println!("no prediction"),
    }
    if let Some(status) = snapshot.status {
        println!("status: {status}");
    }

    Ok(())
}

async fn classify_once(config: &Config, duration: f64) -> anyhow::Result<()> {
    let display = Arc::new(DisplayState::new());
    let classifier = build_classifier(config, &display, None);

    match classifier.classify(duration).await {
        Ok(result) => {
            println!(
                "{} (confidence {:.2}, {})",
                result.detected_sentence, result.confidence, result.engine
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", e.user_message());
            Err(e.into())
        }
    }
}

async fn say(config: &Config, text: &str) -> anyhow::Result<()> {
    let Some(speaker) = build_speaker(config)? else {
        anyhow::bail!("speech output is disabled");
    };

    speaker.speak(text).await?;

    // Playback is asynchronous; give the utterance time to finish
    tokio::time::sleep(Duration::from_secs(5)).await;
    Ok(())
}

async fn list_voices(config: &Config) -> anyhow::Result<()> {
    let Some(api_key) = config.speech.api_key.clone() else {
        anyhow::bail!("no speech credential configured");
    };

    let synth = RemoteSynthesizer::new(
        config.speech.endpoint.clone(),
        api_key,
        config.speech.model.clone(),
        config.speech.speed,
    )?;

    for voice in synth.voices().await? {
        let tier = if voice.enhanced { "enhanced" } else { "standard" };
        println!("{}  {} [{}] ({tier})", voice.id, voice.name, voice.language);
    }

    Ok(())
}
