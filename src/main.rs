use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use square_motion::{
    audio::AudioLibrary,
    composition::{AudioChoice, CompositionEngine},
    config::Config,
    export::write_artifacts,
    imaging::SourceImage,
};

#[derive(Parser)]
#[command(
    name = "square-motion",
    version,
    about = "Turn still images into framed clips and one combined video",
    long_about = "Square-Motion places each image over a blurred copy of itself, crops it to a fixed aspect ratio, holds it on screen for a few seconds and joins the clips into one video, optionally with a background track."
)]
struct Cli {
    /// Image files (PNG, JPEG), in the order they should appear
    #[arg(short, long, num_args = 1.., required_unless_present = "list_library")]
    images: Vec<PathBuf>,

    /// Directory the processed stills, ZIP and videos are written to
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Background audio file or video container to take the track from
    #[arg(short, long, conflicts_with = "library_track")]
    audio: Option<PathBuf>,

    /// Background track from the bundled library, by name
    #[arg(short, long)]
    library_track: Option<String>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for clip durations, for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// List the bundled library tracks and exit
    #[arg(long)]
    list_library: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting Square-Motion v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    if cli.list_library {
        let library = AudioLibrary::new(&config.audio.library_dir);
        for name in library.names()? {
            println!("{}", name);
        }
        return Ok(());
    }

    if cli.seed.is_some() {
        config.pipeline.seed = cli.seed;
    }

    let audio_choice = match (&cli.audio, &cli.library_track) {
        (Some(path), _) => AudioChoice::File(path.clone()),
        (None, Some(name)) => AudioChoice::Library(name.clone()),
        (None, None) => AudioChoice::None,
    };

    info!("Images: {}", cli.images.len());
    info!("Output: {:?}", cli.output);

    let images = cli
        .images
        .iter()
        .map(|path| SourceImage::open(path).with_context(|| format!("Failed to open {:?}", path)))
        .collect::<Result<Vec<_>>>()?;

    let mut engine = CompositionEngine::new(config)?;
    let audio = engine.load_audio(&audio_choice)?;

    info!("Starting composition process...");
    let output = engine.compose(&images, audio.as_ref())?;
    let written = write_artifacts(&output, &cli.output)?;

    for path in &written {
        info!("   {:?}", path);
    }
    info!("Composition complete! Output saved to: {:?}", cli.output);
    Ok(())
}
