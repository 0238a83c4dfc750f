/// Soundboard - toggle sounds from a directory, one volume slider per sound
mod app;
mod config;
mod error;
mod shell;

use clap::Parser;
use crate::config::SoundboardConfig;
use crate::shell::Command;
use soundboard_audio_desktop::CpalBackend;
use soundboard_playback::{PlaybackTracker, SoundLibrary};
use std::io::Write;
use std::ops::ControlFlow;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "soundboard")]
#[command(about = "Terminal soundboard: one button and one volume per sound file", long_about = None)]
struct Cli {
    /// Directory containing the sound files
    #[arg(short, long, env = "SOUNDBOARD_DIR")]
    dir: Option<PathBuf>,

    /// Configuration file path (default: ./soundboard.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only one sound at a time, every sound loops; starting another stops the current one
    #[arg(long)]
    single_slot: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, stdout belongs to the shell)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "soundboard=info,soundboard_playback=info,soundboard_audio_desktop=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration, CLI flags win over file and environment
    let mut config = SoundboardConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.dir {
        config.sounds.directory = dir;
    }
    if cli.single_slot {
        config.set_single_slot();
    }
    config.validate()?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    run(config).await
}

async fn run(config: SoundboardConfig) -> anyhow::Result<()> {
    let directory = config.sounds.directory.clone();
    let library = match SoundLibrary::scan(&directory, &config.scan_options()) {
        Ok(library) => library,
        Err(e) => {
            // Shown once; the board opens with no buttons
            println!("{}", e);
            SoundLibrary::empty(directory.clone())
        }
    };

    let backend = CpalBackend::new(&config.desktop_config())?;
    let tracker = PlaybackTracker::new(backend, library, config.tracker_config())?;
    tracing::info!(
        "Soundboard ready: {} sounds from {}",
        tracker.sounds().len(),
        directory.display()
    );

    // Button state changes (including one-shots finishing on their own)
    let events = tracker.subscribe();
    std::thread::Builder::new()
        .name("soundboard-events".into())
        .spawn(move || {
            for event in events.iter() {
                if let Some(line) = app::describe(&event) {
                    println!("  {}", line);
                }
            }
        })?;

    let columns = config.ui.columns;
    println!("{}", shell::render_grid(&app::buttons(&tracker), columns));
    println!("Type 'help' for commands.");

    let mut lines = spawn_stdin_reader()?;
    loop {
        prompt();

        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            line = lines.recv() => line,
        };

        // End of input behaves like quit
        let Some(line) = line else { break };

        match line.parse::<Command>() {
            Ok(command) => match app::execute(&tracker, command, columns) {
                ControlFlow::Continue(Some(output)) => println!("{}", output),
                ControlFlow::Continue(None) => {}
                ControlFlow::Break(output) => {
                    println!("{}", output);
                    break;
                }
            },
            Err(e) => println!("{}", e),
        }
    }

    tracker.shutdown()?;
    tracing::info!("Soundboard closed");
    Ok(())
}

/// Forward stdin lines from a plain thread
fn spawn_stdin_reader() -> std::io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("soundboard-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
