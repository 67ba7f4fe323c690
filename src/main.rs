use anyhow::{Context, Result};
use callscribe::{Config, RemoteTranscriber, SessionConfig, SessionEvent, SpeechSegmentSession};
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Transcribe a raw 8kHz mu-law audio stream as if it arrived from a phone call.
///
/// Frames are pushed at real-time pacing so utterance boundaries are detected
/// the same way they would be on a live call. Final transcripts go to stdout.
#[derive(Parser, Debug)]
#[command(name = "callscribe", version, about)]
struct Cli {
    /// Raw mu-law input file, or '-' to read from stdin.
    input: String,

    /// Path to the configuration file (default: XDG config location).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transcription model override.
    #[arg(long)]
    model: Option<String>,

    /// Samples pushed per frame (160 = 20ms at 8kHz).
    #[arg(long, default_value_t = 160)]
    chunk_size: usize,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?.with_env_overrides();
    if let Some(model) = cli.model {
        config.stt.model = model;
    }

    let transcriber = Arc::new(RemoteTranscriber::new(&config.stt)?);
    let (session, mut events) = SpeechSegmentSession::new(
        SessionConfig::from(&config.audio),
        transcriber,
    );

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::SpeechStart => info!("Speech started"),
                SessionEvent::Partial(placeholder) => debug!(%placeholder, "Utterance flushed"),
                SessionEvent::Transcript(text) => println!("{text}"),
            }
        }
    });

    let data = read_input(&cli.input)?;
    info!(
        bytes = data.len(),
        seconds = data.len() as f32 / config.audio.sample_rate as f32,
        "Streaming audio"
    );

    let frame_duration = Duration::from_millis(
        (cli.chunk_size as u64 * 1000) / config.audio.sample_rate as u64,
    );
    for chunk in data.chunks(cli.chunk_size) {
        session.send_audio(chunk);
        tokio::time::sleep(frame_duration).await;
    }

    // Trail the stream with silence so the last utterance hits its timeout.
    let silence = vec![0xFFu8; cli.chunk_size];
    let trailing_frames = (config.audio.silence_duration_ms as u64 * 2)
        .div_ceil(frame_duration.as_millis().max(1) as u64);
    for _ in 0..trailing_frames {
        session.send_audio(&silence);
        tokio::time::sleep(frame_duration).await;
    }

    // Bounded grace period for an in-flight final request.
    if let Err(e) = session.wait_for_transcript(Duration::from_secs(5)).await {
        debug!(error = %e, "No further transcript");
    }

    session.close();
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "callscribe=debug"
    } else {
        "callscribe=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => {
            Config::load(p).with_context(|| format!("Failed to load config from {}", p.display()))
        }
        None => match Config::default_path() {
            Some(p) => Config::load_or_default(&p),
            None => Ok(Config::default()),
        },
    }
}

fn read_input(input: &str) -> Result<Vec<u8>> {
    if input == "-" {
        let mut buffer = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read(input).with_context(|| format!("Failed to read {input}"))
    }
}
