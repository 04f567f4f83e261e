use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "retrosurf", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a script and write the composited output as a PNG.
    Frame(FrameArgs),
    /// Print the formats the software backend accepts, as JSON.
    Formats,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Composite once more after the script, even if no update is pending.
    #[arg(long)]
    force: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Formats => cmd_formats(),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let script = retrosurf::Script::from_path(&args.in_path)
        .with_context(|| format!("load script '{}'", args.in_path.display()))?;
    let mut backend = script.build_backend()?;
    let summary = script.run(backend.as_mut());
    if args.force {
        backend.real_update_screen();
    }
    tracing::info!(steps = summary.steps, composites = summary.composites, "script done");

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    save_output(&*backend, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn save_output(backend: &dyn retrosurf::GraphicsBackend, out: &Path) -> anyhow::Result<()> {
    // The output is true-colour; the palette is never consulted.
    let palette = retrosurf::Palette::default();
    backend
        .screen()
        .save_png(out, &palette)
        .with_context(|| format!("write png '{}'", out.display()))
}

fn cmd_formats() -> anyhow::Result<()> {
    let backend = retrosurf::create_backend(
        retrosurf::BackendKind::Software,
        retrosurf::CompositorOpts::default(),
        retrosurf::HostServices::detached(),
    )?;
    let formats: Vec<serde_json::Value> = backend
        .supported_formats()
        .into_iter()
        .map(|f| serde_json::json!({ "name": f.to_string(), "format": f }))
        .collect();
    println!("{}", serde_json::to_string_pretty(&formats)?);
    Ok(())
}
