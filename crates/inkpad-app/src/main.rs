//! Command line entry point.

use clap::{Args, Parser, Subcommand};
use inkpad_app::{App, AppConfig, AppError, FixedPaths};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inkpad", about = "Render Inkpad drawings to PNG")]
struct Cli {
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// TrueType/OpenType font, overriding the configuration.
    #[arg(long)]
    font: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a document and export it.
    Render(RenderArgs),
    /// Replay recorded input events and export the result.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    document: PathBuf,

    #[arg(short, long)]
    output: PathBuf,

    /// Zoom and pan so the whole drawing is visible.
    #[arg(long)]
    fit: bool,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// JSON array of canvas events.
    events: PathBuf,

    #[arg(short, long)]
    output: PathBuf,

    /// Path offered to save and quicksave requests.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Path offered to load requests.
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        eprintln!("inkpad: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(font) = cli.font {
        config.font = Some(font);
    }
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }

    match cli.command {
        Command::Render(args) => {
            let mut app = App::new(config, Box::new(FixedPaths::default()))?;
            app.open(&args.document)?;
            if args.fit {
                app.fit_to_content();
            }
            app.export_png(&args.output)
        }
        Command::Replay(args) => {
            let picker = FixedPaths {
                save: args.save,
                load: args.load,
            };
            let mut app = App::new(config, Box::new(picker))?;
            let failures = app.replay_file(&args.events)?;
            if failures > 0 {
                log::warn!("{failures} events failed");
            }
            app.export_png(&args.output)
        }
    }
}
