use ai_pipeline::{
    build_scene_prompt, find_style, ArtStyle, BackendConfig, BackendFactory, BackendType,
    ART_STYLES,
};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use media_io::{AudioFile, DefaultProbe};
use session::{read_duration, SessionConfig, SessionState, Studio};
use std::path::{Path, PathBuf};
use timeline::{plan, SEGMENT_DURATION};
use tracing::{info, warn};

mod player;
mod view;

use player::PlayerOptions;
use view::GenerationView;

#[derive(Parser)]
#[command(name = "music-video")]
#[command(about = "AI music video generator - one generated image per audio segment, played in sync")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available art styles
    Styles,

    /// Print the segment plan and scene prompts for an audio file (no API calls)
    Plan {
        /// Audio file
        audio: PathBuf,

        /// Scene description applied to every segment
        #[arg(short, long)]
        prompt: String,

        /// Art style name
        #[arg(short, long, default_value = "Cinematic")]
        style: String,

        /// Seconds of audio per generated image
        #[arg(long, default_value_t = SEGMENT_DURATION)]
        segment_length: f64,
    },

    /// Generate one image per segment and play them in sync with the track
    Generate {
        /// Audio file
        audio: PathBuf,

        /// Scene description applied to every segment
        #[arg(short, long)]
        prompt: String,

        /// Art style name
        #[arg(short, long, default_value = "Cinematic")]
        style: String,

        /// Image backend (imagen, mock)
        #[arg(long, default_value = "imagen")]
        backend: String,

        /// Backend model override
        #[arg(long)]
        model: Option<String>,

        /// API key for the image backend
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// API base URL override
        #[arg(long)]
        api_url: Option<String>,

        /// Aspect ratio of generated frames
        #[arg(long, default_value = "16:9")]
        aspect_ratio: String,

        /// Seconds of audio per generated image
        #[arg(long, default_value_t = SEGMENT_DURATION)]
        segment_length: f64,

        /// Stop after generation
        #[arg(long)]
        no_play: bool,

        /// Start playback at this fraction of the track (0.0 - 1.0)
        #[arg(long)]
        seek: Option<f64>,

        /// Play once more after the track finishes
        #[arg(long)]
        replay: bool,

        /// Playback speed (1.0 = normal)
        #[arg(long, default_value_t = 1.0)]
        rate: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Styles => styles_command(),
        Commands::Plan {
            audio,
            prompt,
            style,
            segment_length,
        } => plan_command(audio, prompt, style, segment_length),
        Commands::Generate {
            audio,
            prompt,
            style,
            backend,
            model,
            api_key,
            api_url,
            aspect_ratio,
            segment_length,
            no_play,
            seek,
            replay,
            rate,
        } => {
            let backend_config = backend_config(&backend, model, api_key, api_url)?
                .with_aspect_ratio(aspect_ratio);
            let options = PlayerOptions {
                seek,
                replay,
                rate,
                ..PlayerOptions::default()
            };
            generate_command(
                audio,
                prompt,
                style,
                backend_config,
                segment_length,
                (!no_play).then_some(options),
            )
            .await
        }
    }
}

fn styles_command() -> Result<()> {
    for style in ART_STYLES {
        println!("{:<12} {}", style.name, style.prompt);
    }
    Ok(())
}

fn lookup_style(name: &str) -> Result<&'static ArtStyle> {
    find_style(name).ok_or_else(|| {
        let known: Vec<&str> = ART_STYLES.iter().map(|s| s.name).collect();
        anyhow!("unknown style '{}' (available: {})", name, known.join(", "))
    })
}

fn intake(path: &Path) -> Option<AudioFile> {
    let file = AudioFile::from_path(path);
    if file.is_none() {
        warn!("ignoring {:?}: not an existing audio file", path);
    }
    file
}

fn plan_command(audio: PathBuf, prompt: String, style: String, segment_length: f64) -> Result<()> {
    let style = lookup_style(&style)?;
    let file = intake(&audio).ok_or_else(|| anyhow!(session::VALIDATION_MESSAGE))?;
    let duration = read_duration(&DefaultProbe, &file).map_err(|e| {
        warn!(error = ?e, "duration probe failed");
        anyhow!(e.user_message())
    })?;
    let segments = plan(duration, segment_length)?;
    info!("Planned {} segments for {:.2}s of audio", segments.len(), duration);

    let scenes: Vec<_> = segments
        .iter()
        .map(|segment| {
            serde_json::json!({
                "index": segment.index,
                "timestamp": segment.timestamp,
                "prompt": build_scene_prompt(&prompt, style, segment.timestamp),
            })
        })
        .collect();
    let output = serde_json::json!({
        "audio": file.file_name(),
        "media_type": file.media_type(),
        "duration_seconds": duration,
        "segment_length": segment_length,
        "style": style.name,
        "segments": scenes,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn backend_config(
    backend: &str,
    model: Option<String>,
    api_key: Option<String>,
    api_url: Option<String>,
) -> Result<BackendConfig> {
    let backend_type: BackendType = backend.parse()?;
    let mut config = BackendConfig::new(backend_type);
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    if let Some(model) = model {
        config = config.with_model(model);
    }
    if let Some(url) = api_url {
        config = config.with_api_url(url);
    }
    Ok(config)
}

async fn generate_command(
    audio: PathBuf,
    prompt: String,
    style: String,
    backend_config: BackendConfig,
    segment_length: f64,
    player: Option<PlayerOptions>,
) -> Result<()> {
    let style = lookup_style(&style)?;
    let backend = BackendFactory::create(backend_config).context("failed to set up image backend")?;
    let probe = DefaultProbe;
    info!("Using {} backend, style {}", backend.name(), style.name);

    let mut studio = Studio::new(&probe, backend.as_ref())
        .with_config(SessionConfig::default().with_segment_length(segment_length));
    studio.select_audio(intake(&audio));
    studio.set_prompt(prompt);
    studio.set_style(style);

    let mut view = GenerationView::new();
    let result = studio.generate(&mut view).await;
    view.finish();
    if let Err(err) = result {
        bail!(err.user_message());
    }

    let SessionState::Ready(mut ready) = studio.into_state() else {
        bail!("generation did not complete");
    };
    println!(
        "Generated {} images for {}",
        ready.images().len(),
        ready.audio().display_name(40)
    );

    match player {
        Some(options) => player::play(&mut ready.synchronizer, &options).await,
        None => Ok(()),
    }
}
