//! Sekitoritchi Entry Point
//!
//! Launches the terminal UI for the wrestler, or runs him without one.
//!
//! Usage:
//!   sekitoritchi [OPTIONS]
//!
//! Options:
//!   --config <PATH>        Config file (env: SEKITORITCHI_CONFIG)
//!   --save-file <PATH>     Where the pet is saved
//!   --interval-secs <SECS> Seconds between decay ticks
//!   --seed <SEED>          Fixed random seed
//!   --headless             No UI; log every change until Ctrl-C
//!   --status               Print the saved pet as JSON and exit
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::io;
use std::panic;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sekitoritchi_core::runtime::drive;
use sekitoritchi_core::{JsonFileStore, PetController, PetSnapshot, SurfaceGone};
use sekitoritchi_tui::cli::Cli;
use sekitoritchi_tui::App;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging (stderr, so it never lands inside the UI or --status output)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = cli.load_config().context("Failed to load configuration")?;
    let save_path = config.resolved_save_path();
    tracing::debug!(path = %save_path.display(), source = ?config.source(), "Configuration loaded");

    let pet = PetController::new(config, JsonFileStore::new(save_path));

    if cli.status {
        let json = serde_json::to_string_pretty(&pet.snapshot())?;
        println!("{json}");
        return Ok(());
    }

    if cli.headless {
        return run_headless(&pet).await;
    }

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: sekitoritchi requires a terminal (TTY)");
        eprintln!();
        eprintln!("Try one of:");
        eprintln!("  • sekitoritchi --headless   (no UI, logs to stderr)");
        eprintln!("  • sekitoritchi --status     (print the saved pet)");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let size = terminal.size()?;
    let mut app = App::new(pet, (size.width, size.height));
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    println!("\n\x1b[31mSekitoritchi:\x1b[0m {}\n", app.goodbye());
    Ok(())
}

/// Drive the pet with no UI until Ctrl-C, logging each published state
async fn run_headless(pet: &PetController) -> anyhow::Result<()> {
    pet.subscribe(Rc::new(|snap: &PetSnapshot| -> Result<(), SurfaceGone> {
        tracing::info!(
            name = %snap.name,
            age = snap.age,
            weight = snap.weight,
            health = snap.health,
            mood = snap.mood.label(),
            poop = snap.poop_level,
            action = %snap.action,
            "Pet updated"
        );
        Ok(())
    }));

    tracing::info!("Running headless, press Ctrl-C to stop");
    drive(pet, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    })
    .await;

    Ok(())
}
