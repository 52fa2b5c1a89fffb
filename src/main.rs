mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use bglock::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bglock")]
#[command(about = "Lock the desktop background for all users")]
#[command(
    long_about = "bglock copies an image into /usr/share/backgrounds and writes dconf \
    overrides that pin it as every user's background. Needs root."
)]
struct Args {
    /// Config file (default: /etc/bglock.conf if present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy an image into the system directory and lock it as the background
    Lock {
        /// Path to the background image
        image: PathBuf,

        /// Show what would be written without changing anything
        #[arg(long, short = 'n')]
        dry_run: bool,
    },

    /// Remove the background lock
    Unlock,

    /// Show whether the background is locked
    Status,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("bglock: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Command::Lock { image, dry_run } => commands::lock(settings, &image, dry_run, args.json),
        Command::Unlock => commands::unlock(settings, args.json),
        Command::Status => commands::status(settings, args.json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("bglock: {}", e);
            ExitCode::FAILURE
        }
    }
}
