use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "greenroom", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Export the project as an alpha-preserving WebM (requires `ffmpeg` on PATH).
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timestamp in seconds.
    #[arg(long)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory; the file is named `{project}_transparent.webm`.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Output frame rate (24, 30 or 60).
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Quality preset: low, medium, high or ultra.
    #[arg(long, default_value = "medium")]
    quality: greenroom::Quality,

    /// Codec: vp9 or vp8.
    #[arg(long, default_value = "vp9")]
    codec: greenroom::encode::Codec,

    /// Also flatten the result over the project background into an opaque MP4 at this path.
    #[arg(long)]
    mp4: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("greenroom=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = greenroom::Project::from_json_file(&args.in_path)?;
    let base_dir = args.in_path.parent().unwrap_or_else(|| Path::new("."));

    let assets = greenroom::assets::PreparedAssets::prepare(&project, base_dir);
    let mut compositor = greenroom::FrameCompositor::new(&project, assets);
    let mut frame = compositor.render_frame(args.at)?;
    frame.unpremultiply_in_place();

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let project = greenroom::Project::from_json_file(&args.in_path)?;
    let base_dir = args
        .in_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let settings = greenroom::ExportSettings {
        quality: args.quality,
        fps: args.fps,
        codec: args.codec,
    };
    let mut session =
        greenroom::ExportSession::new(project, &base_dir, &args.out_dir, settings)?;

    let out_path = session.run(|p| {
        eprint!(
            "\r{:?} {:5.1}% ({}/{} frames)",
            p.status, p.percent, p.processed_frames, p.total_frames
        );
        if let Some(eta) = p.estimated_remaining_sec {
            eprint!(" eta {eta:.0}s");
        }
    })?;
    eprintln!();

    eprintln!("wrote {}", out_path.display());

    if let Some(mp4) = &args.mp4 {
        let mp4_path = session.remux_opaque_mp4(mp4)?;
        eprintln!("wrote {}", mp4_path.display());
    }
    Ok(())
}
