use std::path::PathBuf;

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand, ValueEnum};

use reelforge::preset::{PresetOverrides, catalog};
use reelforge::{Canvas, DurationMode, RenderJob, SceneSpec, render_reel};

#[derive(Parser, Debug)]
#[command(name = "reelforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 reel (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// List the style preset catalog, grouped by category.
    Presets,
}

/// Output canvas shape.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    /// 1080x1920 vertical.
    Reel,
    /// 1080x1080 square.
    Square,
    /// 1920x1080 horizontal.
    Wide,
}

impl Format {
    fn canvas(self) -> Canvas {
        match self {
            Format::Reel => Canvas::PORTRAIT,
            Format::Square => Canvas::SQUARE,
            Format::Wide => Canvas::LANDSCAPE,
        }
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render job JSON; scene and style flags are ignored when set.
    #[arg(long)]
    job: Option<PathBuf>,

    /// Scene image, in order (repeatable, up to 5).
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Caption for the matching --image, paired by position. An empty
    /// string leaves that scene uncaptioned.
    #[arg(long = "caption")]
    captions: Vec<String>,

    /// Style preset id (see `reelforge presets`).
    #[arg(long)]
    preset: Option<String>,

    /// Output canvas shape.
    #[arg(long, value_enum, default_value_t = Format::Reel)]
    format: Format,

    /// Seconds per scene (defaults to the preset's duration).
    #[arg(long)]
    duration: Option<f64>,

    /// Total reel length in seconds, split evenly across scenes.
    #[arg(long, conflicts_with = "duration")]
    total_secs: Option<f64>,

    /// Music file path, or `auto` to pick a bundled track for the
    /// preset's genre.
    #[arg(long)]
    music: Option<String>,

    /// Watermark logo image.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Watermark opacity (0..=1).
    #[arg(long, default_value_t = reelforge::DEFAULT_WATERMARK_OPACITY)]
    opacity: f32,

    /// Override the caption color (hex, e.g. #FFD700).
    #[arg(long)]
    text_color: Option<String>,

    /// Override the caption background plate color (hex).
    #[arg(long)]
    bg_color: Option<String>,

    /// Drop the preset's caption background plate.
    #[arg(long, default_value_t = false, conflicts_with = "bg_color")]
    no_bg: bool,

    /// Bundled assets root (`fonts/`, `bgm/`).
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Presets => cmd_presets(),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let job = match &args.job {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read job file '{}'", path.display()))?;
            serde_json::from_str::<RenderJob>(&text)
                .with_context(|| format!("parse job file '{}'", path.display()))?
        }
        None => job_from_flags(&args)?,
    };

    let out = render_reel(&job)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn job_from_flags(args: &RenderArgs) -> anyhow::Result<RenderJob> {
    let Some(preset_id) = args.preset.as_deref() else {
        bail!("--preset is required (try `reelforge presets`)");
    };
    let Some(preset) = catalog::get(preset_id) else {
        bail!("unknown preset '{preset_id}' (try `reelforge presets`)");
    };
    if args.captions.len() > args.images.len() {
        bail!(
            "{} captions given for {} images",
            args.captions.len(),
            args.images.len()
        );
    }

    let overrides = PresetOverrides {
        text_color: args.text_color.clone(),
        text_bg_color: if args.no_bg {
            Some(None)
        } else {
            args.bg_color.clone().map(Some)
        },
        duration_secs: args.duration,
    };
    let working = preset.to_working(overrides);

    let scenes = args
        .images
        .iter()
        .enumerate()
        .map(|(i, image)| SceneSpec {
            ordinal: i as u32,
            image_path: image.clone(),
            caption: args
                .captions
                .get(i)
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
        .collect();

    let duration = match args.total_secs {
        Some(total) => DurationMode::TotalSecs(total),
        None => DurationMode::PerScene(working.duration_secs),
    };

    let music_path = match args.music.as_deref() {
        Some("auto") => match working.music_genre.as_deref() {
            Some(genre) => {
                let picked = reelforge::assets::music::pick(&args.assets, genre);
                if picked.is_none() {
                    eprintln!("no bundled track for genre '{genre}', rendering silent");
                }
                picked
            }
            None => {
                eprintln!("preset '{preset_id}' has no music genre, rendering silent");
                None
            }
        },
        Some(path) => Some(PathBuf::from(path)),
        None => None,
    };

    Ok(RenderJob {
        scenes,
        preset: working,
        duration,
        canvas: args.format.canvas(),
        logo_path: args.logo.clone(),
        watermark_opacity: args.opacity,
        music_path,
        assets_dir: args.assets.clone(),
        out_path: args.out.clone(),
    })
}

fn cmd_presets() -> anyhow::Result<()> {
    for category in catalog::categories() {
        println!("{category}");
        for preset in catalog::by_category(category) {
            let genre = preset.music_genre.as_deref().unwrap_or("-");
            println!(
                "  {:<22} {}  ({}s, music: {genre})",
                preset.id, preset.display_name, preset.duration_secs
            );
        }
    }
    Ok(())
}
