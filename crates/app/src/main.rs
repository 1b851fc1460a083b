use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use video_text_core::{
    AppConfig, AssetStore, IntroCamera, PlaylistVideoTexture, PointerState, RenderGraph,
    SceneDescriptor, SceneError, SimulatedSurface, SurfaceLedger,
};

fn main() -> video_text_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            frames,
            fps,
            pointer,
        } => run(config.as_deref(), frames, fps, pointer),
        Commands::Describe { config } => describe(config.as_deref()),
        Commands::DefaultConfig { output } => write_default_config(&output),
    }
}

fn load_config(path: Option<&Path>) -> video_text_core::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path),
        None => {
            let config = AppConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn run(
    config_path: Option<&Path>,
    frames: u64,
    fps: f32,
    pointer: Option<PointerArg>,
) -> video_text_core::Result<()> {
    if fps <= 0.0 {
        return Err(SceneError::configuration("--fps must be positive"));
    }

    let config = load_config(config_path)?;
    let scene = SceneDescriptor::video_text_demo(&config);
    AssetStore::for_scene(&scene).resolve_scene_assets(&scene)?;
    tracing::info!(
        frames,
        fps,
        clips = config.playlist.sources.len(),
        "starting headless render"
    );

    let ledger = SurfaceLedger::new();
    let mut graph = RenderGraph::new(scene, IntroCamera::new(&config.camera));
    let catalog = config.clips.clone();
    let surface_ledger = ledger.clone();
    let video = PlaylistVideoTexture::activate(config.playlist.sources.clone(), move || {
        Ok(SimulatedSurface::new(catalog, surface_ledger))
    })?
    .with_encoding(config.playlist.encoding);
    graph.mount_video(video)?;

    let pointer = pointer.map_or_else(PointerState::default, |p| PointerState::new(p.x, p.y));
    let delta = 1.0 / fps;
    let mut last_source = None;
    for _ in 0..frames {
        match graph.render_frame(pointer, delta) {
            Ok(report) => {
                if report.video_source != last_source {
                    tracing::info!(
                        frame = report.frame,
                        elapsed = report.elapsed,
                        source = report.video_source.as_deref().unwrap_or("-"),
                        "now showing"
                    );
                    last_source = report.video_source.clone();
                }
                tracing::trace!(?report, "frame rendered");
            }
            // The playlist stays on the failed clip; keep rendering the rest of the scene.
            Err(err @ SceneError::MediaLoad { .. }) => tracing::error!(%err, "media failed"),
            Err(err) => return Err(err),
        }
    }

    let position = graph.camera().position();
    tracing::info!(
        x = position.x,
        y = position.y,
        z = position.z,
        "final camera position"
    );
    drop(graph);

    let stats = ledger.snapshot();
    tracing::info!(
        loads = stats.loads.len(),
        live_surfaces = stats.live_surfaces(),
        live_listeners = stats.live_listeners,
        "playback surfaces released"
    );
    Ok(())
}

fn describe(config_path: Option<&Path>) -> video_text_core::Result<()> {
    let config = load_config(config_path)?;
    let scene = SceneDescriptor::video_text_demo(&config);
    println!("{}", serde_json::to_string_pretty(&scene)?);
    Ok(())
}

fn write_default_config(output: &Path) -> video_text_core::Result<()> {
    tracing::info!(?output, "writing default configuration");
    std::fs::write(output, AppConfig::default().to_json()?)?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Normalised pointer position given as `X,Y`.
#[derive(Debug, Clone, Copy)]
struct PointerArg {
    x: f32,
    y: f32,
}

fn parse_pointer(raw: &str) -> Result<PointerArg, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{raw}`"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f32>()
            .map_err(|err| format!("invalid coordinate `{value}`: {err}"))
    };
    Ok(PointerArg {
        x: parse(x)?,
        y: parse(y)?,
    })
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Video-textured text scene", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the scene headlessly, cycling the video playlist.
    Run {
        /// JSON configuration file. Built-in defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to render.
        #[arg(short, long, default_value_t = 600)]
        frames: u64,
        /// Simulated frame rate.
        #[arg(long, default_value_t = 60.0)]
        fps: f32,
        /// Fixed pointer position in [-1, 1], e.g. `0.5,-0.2`.
        #[arg(long, value_parser = parse_pointer, allow_hyphen_values = true)]
        pointer: Option<PointerArg>,
    },
    /// Print the scene tree as JSON.
    Describe {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration to a file.
    DefaultConfig {
        /// Destination path for the configuration JSON.
        output: PathBuf,
    },
}
