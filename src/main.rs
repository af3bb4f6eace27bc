use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pixmill::bitmap::generate;
use pixmill::config::{parse_backbuffer, DemoConfig};
use pixmill::demo;
use pixmill::loader::{Loader, LoaderContext};
use pixmill::render::{Platform, Renderer, RendererMode, StopFlag};
use pixmill::transform::{self, ResizeMode};
use pixmill::{analysis, Error, PixelBuffer};

#[derive(Parser, Debug)]
#[command(name = "pixmill", version, about)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode an image and print its dominant colors.
    Info(InfoArgs),
    /// Run one transform and save the result.
    Transform(TransformArgs),
    /// Open a window and run a test scene.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    file: PathBuf,

    #[arg(long, value_enum, default_value_t = LoaderChoice::Software)]
    loader: LoaderChoice,

    /// Number of colors to list.
    #[arg(long, default_value_t = 5)]
    colors: usize,
}

#[derive(Parser, Debug)]
struct TransformArgs {
    #[arg(long, value_enum)]
    op: TransformOp,

    /// Source image. Defaults to the 200x200 quadrant test image.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output path; the extension picks the format.
    #[arg(long)]
    out: PathBuf,

    /// Target size for `scale`, as WxH.
    #[arg(long, default_value = "400x400")]
    size: String,

    /// Resize policy for `scale`.
    #[arg(long, value_enum, default_value_t = AspectChoice::Stretch)]
    mode: AspectChoice,

    /// Angle for `rotate`, in radians.
    #[arg(long, default_value_t = 0.5)]
    angle: f32,

    #[arg(long, value_enum, default_value_t = LoaderChoice::Software)]
    loader: LoaderChoice,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// JSON settings file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Test scene (0..=3).
    #[arg(short, long)]
    test: Option<u32>,

    /// Backbuffer size as WxH.
    #[arg(short, long)]
    backbuffer: Option<String>,

    #[arg(short, long)]
    display: Option<u32>,

    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    #[arg(long, value_enum)]
    aspect: Option<AspectChoice>,

    /// Print available displays and exit.
    #[arg(short = 's', long)]
    list_displays: bool,

    /// Stop after this many frames. Without a display backend this defaults to 300.
    #[arg(long)]
    frames: Option<u64>,

    /// Save the last presented frame.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LoaderChoice {
    Software,
    Accelerated,
}

impl From<LoaderChoice> for Loader {
    fn from(choice: LoaderChoice) -> Self {
        match choice {
            LoaderChoice::Software => Loader::software(),
            LoaderChoice::Accelerated => Loader::accelerated(),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TransformOp {
    Copy,
    Scale,
    Rotate,
    FlipX,
    FlipY,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Window,
    Fullscreen,
    WindowedFullscreen,
}

impl From<ModeChoice> for RendererMode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Window => RendererMode::Window,
            ModeChoice::Fullscreen => RendererMode::FullScreen,
            ModeChoice::WindowedFullscreen => RendererMode::WindowedFullScreen,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AspectChoice {
    None,
    Stretch,
    Outside,
    Inside,
}

impl From<AspectChoice> for ResizeMode {
    fn from(choice: AspectChoice) -> Self {
        match choice {
            AspectChoice::None => ResizeMode::None,
            AspectChoice::Stretch => ResizeMode::Stretch,
            AspectChoice::Outside => ResizeMode::TouchFromOutside,
            AspectChoice::Inside => ResizeMode::TouchFromInside,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Transform(args) => cmd_transform(args),
        Command::Play(args) => cmd_play(args),
    }
}

/// Decode with the chosen backend, falling back to the other one on a decode error
fn decode_with_fallback(ctx: &mut LoaderContext, path: &Path) -> anyhow::Result<PixelBuffer> {
    match ctx.decode_file(path) {
        Err(Error::Decode(reason)) => {
            let fallback = match ctx.loader() {
                Loader::Software(_) => Loader::accelerated(),
                Loader::Accelerated(_) => Loader::software(),
            };
            warn!(%reason, "decode failed, retrying with another loader");
            let previous = ctx.set_loader(fallback);
            let result = ctx.decode_file(path);
            ctx.set_loader(previous);
            result.with_context(|| format!("decode '{}'", path.display()))
        },
        other => other.with_context(|| format!("decode '{}'", path.display())),
    }
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let mut ctx = LoaderContext::new(args.loader.into());
    let image = decode_with_fallback(&mut ctx, &args.file)?;
    info!(width = image.width(), height = image.height(), "loaded {}", args.file.display());

    let colors = analysis::detect_colors(&image, args.colors)?;
    for (rank, color) in colors.iter().enumerate() {
        println!("{:>2}. {}", rank + 1, color);
    }
    Ok(())
}

fn cmd_transform(args: TransformArgs) -> anyhow::Result<()> {
    let mut ctx = LoaderContext::new(args.loader.into());
    let source = match &args.in_path {
        Some(path) => decode_with_fallback(&mut ctx, path)?,
        None => generate::quadrants(200, 200)?,
    };

    let result = match args.op {
        TransformOp::Copy => {
            let blank = PixelBuffer::new(source.width(), source.height())?;
            transform::draw(&blank, &source, 0.0, 0.0, &transform::Translation::new())?
        },
        TransformOp::Scale => {
            let (w, h) = parse_backbuffer(&args.size)?;
            transform::resize(&source, w, h, args.mode.into())?
        },
        TransformOp::Rotate => transform::rotate(&source, args.angle)?,
        TransformOp::FlipX => transform::flip_horizontal(&source)?,
        TransformOp::FlipY => transform::flip_vertical(&source)?,
    };

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    ctx.save(&result, &args.out)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    info!(op = ?args.op, width = result.width(), height = result.height(), "wrote {}", args.out.display());
    Ok(())
}

fn play_config(args: &PlayArgs) -> anyhow::Result<DemoConfig> {
    let mut config = match &args.config {
        Some(path) => DemoConfig::load(path).with_context(|| format!("load '{}'", path.display()))?,
        None => DemoConfig::default(),
    };
    if let Some(test) = args.test {
        anyhow::ensure!(test <= demo::MAX_TEST, "test number must be 0..={}", demo::MAX_TEST);
        config.test = test;
    }
    if let Some(backbuffer) = &args.backbuffer {
        config.set_backbuffer(backbuffer)?;
    }
    if let Some(display) = args.display {
        config.display = display;
    }
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(aspect) = args.aspect {
        config.aspect = aspect.into();
    }
    Ok(config)
}

fn run_play<P: Platform>(
    platform: P,
    args: &PlayArgs,
    config: &DemoConfig,
    max_frames: Option<u64>,
) -> anyhow::Result<()> {
    let mut renderer = Renderer::new(platform);
    anyhow::ensure!(renderer.is_available(), "{} renderer is not available", renderer.platform().name());

    if args.list_displays {
        for device in renderer.devices()? {
            println!("{}", device);
        }
        return Ok(());
    }

    demo::initialize(&mut renderer, config).context("initialize renderer")?;
    let outcome = demo::play(&mut renderer, config, &StopFlag::new(), max_frames)?;
    info!(frames = outcome.frames, reason = ?outcome.reason, "exit");

    if let (Some(path), Some(frame)) = (&args.snapshot, renderer.frame()) {
        LoaderContext::default()
            .save(frame, path)
            .with_context(|| format!("write '{}'", path.display()))?;
    }
    Ok(())
}

#[cfg(feature = "sdl")]
fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let config = play_config(&args)?;
    let platform = pixmill::render::SdlPlatform::new().context("start SDL")?;
    run_play(platform, &args, &config, args.frames)
}

#[cfg(not(feature = "sdl"))]
fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let config = play_config(&args)?;
    warn!("built without a display backend; rendering offscreen");
    let platform = pixmill::render::HeadlessPlatform::new().with_frame_history(1);
    run_play(platform, &args, &config, Some(args.frames.unwrap_or(300)))
}
