use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tactical::render::composite::unpremultiply_rgba8_in_place;
use tactical::{
    AnalysisJob, Canvas2D, CoordinateDataset, CpuSurface, FrameRGBA, HttpBackend, JobReport,
    OverlayCompositor, PitchRenderer, PitchStyle, SimulatedPlayback, SurfaceSize,
    TacticalConfig, TextureSlot, VideoElement, VideoUpload,
};

#[derive(Parser, Debug)]
#[command(name = "tactical", version)]
struct Cli {
    /// Config JSON; `TACTICAL_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a video for analysis and wait for the result.
    Analyze(AnalyzeArgs),
    /// Render the board for one playback position as a PNG.
    Frame(FrameArgs),
    /// Render the empty board as a PNG.
    Pitch(PitchArgs),
    /// Play a dataset back on a simulated clock and write the last frame.
    Play(PlayArgs),
}

#[derive(clap::Args, Debug)]
struct SurfaceArgs {
    #[arg(long, default_value_t = 320)]
    width: u32,

    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Pitch background image; falls back to the config's `texture_path`.
    #[arg(long)]
    texture: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Video file to upload.
    #[arg(long)]
    video: PathBuf,

    /// Save the resulting coordinate dataset as JSON.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also render the first analysed frame to this PNG.
    #[arg(long)]
    preview: Option<PathBuf>,

    #[command(flatten)]
    surface: SurfaceArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Coordinate dataset JSON (as saved by `analyze --out`).
    #[arg(long)]
    dataset: PathBuf,

    /// Playback position in seconds.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    surface: SurfaceArgs,
}

#[derive(Parser, Debug)]
struct PitchArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    surface: SurfaceArgs,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[arg(long)]
    dataset: PathBuf,

    /// Video frame rate of the simulated playback.
    #[arg(long, default_value_t = 25)]
    video_fps: u32,

    /// Sleep between frames like a real player would.
    #[arg(long, default_value_t = false)]
    paced: bool,

    /// Start playback at this position (seconds).
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Output PNG path for the last composited frame.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    surface: SurfaceArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tactical=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = TacticalConfig::load(cli.config.as_deref()).context("load config")?;
    match cli.cmd {
        Command::Analyze(args) => cmd_analyze(&config, args).await,
        Command::Frame(args) => cmd_frame(&config, args).await,
        Command::Pitch(args) => cmd_pitch(&config, args).await,
        Command::Play(args) => cmd_play(&config, args).await,
    }
}

async fn compositor(
    config: &TacticalConfig,
    surface: &SurfaceArgs,
) -> anyhow::Result<OverlayCompositor<CpuSurface>> {
    let texture = match surface.texture.as_ref().or(config.texture_path.as_ref()) {
        Some(path) => TextureSlot::load(path),
        None => TextureSlot::Absent,
    };
    let mut pitch = PitchRenderer::new(texture, PitchStyle::default());
    // One-shot renders would otherwise race the loader and draw without the texture.
    if !pitch.wait_for_texture().await {
        tracing::debug!("rendering without pitch texture");
    }

    let visible = CpuSurface::new(SurfaceSize::new(surface.width, surface.height))?;
    let comp = OverlayCompositor::new(visible, pitch, config.fps()?)?
        .with_entity_style(tactical::EntityStyle {
            player_class_id: config.player_class_id,
            ..tactical::EntityStyle::default()
        });
    Ok(comp)
}

fn load_dataset(path: &Path) -> anyhow::Result<CoordinateDataset> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read dataset '{}'", path.display()))?;
    Ok(CoordinateDataset::from_json_str(&json)?)
}

fn write_png(path: &Path, frame: &FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let mut rgba = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba);
    }

    image::save_buffer_with_format(
        path,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;

    eprintln!("wrote {}", path.display());
    Ok(())
}

fn print_report(report: &JobReport) {
    match report {
        JobReport::Submitted => eprintln!("submitted"),
        JobReport::Pending(progress) => eprintln!("{progress}"),
        JobReport::Succeeded(ds) => eprintln!("done ({} frames)", ds.len()),
        JobReport::Failed { reason } => eprintln!("error: {reason}"),
    }
}

async fn cmd_analyze(config: &TacticalConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let video = VideoUpload::from_path(&args.video).await?;
    let backend = HttpBackend::new(config)?;
    let mut job = AnalysisJob::new(backend, config.poll_interval());
    let mut comp = compositor(config, &args.surface).await?;

    let dataset = match job.run(&video, &comp.publisher(), print_report).await {
        Ok(dataset) => dataset,
        // Rejections and failed jobs already carry the backend's own message.
        Err(e) if e.is_user_visible() => return Err(e.into()),
        Err(e) => {
            return Err(anyhow::Error::new(e).context(format!(
                "analyse '{}' via {}",
                args.video.display(),
                config.server_url
            )));
        }
    };

    if let Some(out) = &args.out {
        std::fs::write(out, dataset.to_json_string()?)
            .with_context(|| format!("write dataset '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }

    if let Some(preview) = &args.preview {
        comp.tick(0.0)?;
        write_png(preview, &comp.visible_mut().snapshot()?)?;
    }
    Ok(())
}

async fn cmd_frame(config: &TacticalConfig, args: FrameArgs) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.dataset)?;
    let mut comp = compositor(config, &args.surface).await?;
    comp.activate(Arc::new(dataset));

    let report = comp.tick(args.time)?;
    tracing::info!(
        frame = ?report.frame.map(|f| f.0),
        entities = report.entities_drawn,
        data_gap = report.data_gap,
        "rendered frame"
    );
    write_png(&args.out, &comp.visible_mut().snapshot()?)
}

async fn cmd_pitch(config: &TacticalConfig, args: PitchArgs) -> anyhow::Result<()> {
    let mut comp = compositor(config, &args.surface).await?;
    comp.tick(0.0)?;
    write_png(&args.out, &comp.visible_mut().snapshot()?)
}

async fn cmd_play(config: &TacticalConfig, args: PlayArgs) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.dataset)?;
    let analysis_fps = config.fps()?;
    let duration_s = dataset
        .bounds()
        .map(|b| analysis_fps.frames_to_secs(b.last.0.saturating_add(1)))
        .unwrap_or(0.0);

    let mut comp = compositor(config, &args.surface).await?;
    comp.activate(Arc::new(dataset));

    let mut video = SimulatedPlayback::new(tactical::Fps::new(args.video_fps, 1)?, duration_s);
    if args.paced {
        video = video.paced();
    }
    video.seek(args.start);
    video.play();

    let summary = comp.run(&mut video).await;
    eprintln!(
        "played {} frames ({} failed, {} without detections), stopped: {:?}",
        summary.ticks, summary.failed_ticks, summary.data_gaps, summary.stop
    );
    write_png(&args.out, &comp.visible_mut().snapshot()?)
}
