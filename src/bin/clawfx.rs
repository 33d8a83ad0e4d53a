use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use clawfx::{JsonLinesSink, Millis, Scene, SceneConfig};

#[derive(Parser, Debug)]
#[command(name = "clawfx", version)]
struct Cli {
    /// Log verbosity (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every grab-cycle state change up to a point in time.
    States(StatesArgs),
    /// Sample the whole scene at a fixed step and write JSON lines.
    Trace(TraceArgs),
}

#[derive(Parser, Debug)]
struct StatesArgs {
    /// Scene config JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop time in milliseconds.
    #[arg(long)]
    until: u64,
}

#[derive(Parser, Debug)]
struct TraceArgs {
    /// Scene config JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop time in milliseconds (inclusive).
    #[arg(long)]
    until: u64,

    /// Sampling step in milliseconds.
    #[arg(long, default_value_t = 16)]
    step: u64,

    /// Override the config's random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Output JSON-lines path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::States(args) => cmd_states(args),
        Command::Trace(args) => cmd_trace(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(p) => SceneConfig::from_path(p).with_context(|| "load scene config"),
        None => Ok(SceneConfig::default()),
    }
}

fn cmd_states(args: StatesArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let mut scene = Scene::mount_seeded(&cfg, Millis::ZERO)?;
    let changes = scene.advance_to(Millis(args.until))?;
    scene.teardown();
    for change in changes {
        println!("t={} {}", change.at.0, change.state);
    }
    Ok(())
}

fn cmd_trace(args: TraceArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(&args.out)
        .with_context(|| format!("create trace '{}'", args.out.display()))?;
    let mut sink = JsonLinesSink::new(BufWriter::new(f));

    let mut scene = Scene::mount_seeded(&cfg, Millis::ZERO)?;
    let frames = scene
        .run(Millis::ZERO, Millis(args.until), args.step, &mut sink)
        .with_context(|| format!("write trace '{}'", args.out.display()))?;
    scene.teardown();

    eprintln!("wrote {} frames to {}", frames, args.out.display());
    Ok(())
}
