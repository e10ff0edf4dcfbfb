//! tls-dh: TLS with fixed Diffie-Hellman, step by step
//!
//! Interactive terminal walkthrough of a toy handshake, plus `trace` and
//! `modpow` subcommands for scripted use.

mod app;
mod events;
mod theme;
mod trace;
mod ui;

use anyhow::{bail, Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use events::EventHandler;
use num_traits::Zero;
use ratatui::prelude::*;
use std::fs::File;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tlsdh_config::{Config, ThemeName};
use tlsdh_core::{mod_pow, parse_biguint};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tls-dh")]
#[command(about = "Step through a TLS handshake with a toy fixed Diffie-Hellman exchange")]
#[command(version)]
struct Cli {
    /// Config file (defaults to <config dir>/tls-dh/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seed the random source for a reproducible session
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Use a fixed server secret b instead of a random one
    #[arg(long, global = true)]
    server_secret: Option<u64>,

    /// Color theme: dark, light, ocean, amber
    #[arg(long)]
    theme: Option<ThemeName>,

    /// Where the interactive UI writes its log
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through every stage without the UI and print the result
    Trace {
        /// Use a fixed client secret a instead of a random one
        #[arg(long)]
        client_secret: Option<u64>,

        /// Print JSON snapshots instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compute BASE^EXP mod MODULUS
    Modpow {
        base: String,
        exp: String,
        modulus: String,
    },
}

impl Cli {
    /// Command-line values win over the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(secret) = self.server_secret {
            config.server_secret = Some(secret);
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// The UI owns the terminal, so interactive logs go to a file.
fn init_file_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter("info"))
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(env_filter("warn"))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    cli.apply(&mut config);
    config.validate().context("Invalid settings")?;

    match &cli.command {
        Some(Commands::Trace { client_secret, json }) => {
            init_stderr_logging();
            trace::run(&config, *client_secret, *json)
        }
        Some(Commands::Modpow { base, exp, modulus }) => {
            init_stderr_logging();
            run_modpow(base, exp, modulus)
        }
        None => {
            let log_path = config
                .log_file
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("tls-dh.log"));
            init_file_logging(&log_path)?;
            run_interactive(&config).await
        }
    }
}

fn run_modpow(base: &str, exp: &str, modulus: &str) -> Result<()> {
    let base = parse_biguint(base)?;
    let exp = parse_biguint(exp)?;
    let modulus = parse_biguint(modulus)?;
    if modulus.is_zero() {
        bail!("Modulus must be positive");
    }
    println!("{}", mod_pow(&base, &exp, &modulus));
    Ok(())
}

async fn run_interactive(config: &Config) -> Result<()> {
    let handshake = config.handshake().context("Failed to build handshake")?;
    let mut app = App::new(handshake, config.theme.into());
    info!(theme = app.theme.name(), "Starting interactive session");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    app.handle_resize(size.width, size.height);

    let event_handler = EventHandler::new(config.tick_rate_ms);
    let result = run_app(&mut terminal, &mut app, event_handler).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("Session ended");
    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut event_handler: EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        match event_handler.next().await? {
            events::Event::Tick => {}
            events::Event::Key(key) => {
                if app.handle_key(key) {
                    return Ok(());
                }
            }
            events::Event::Mouse(mouse) => app.handle_mouse(mouse),
            events::Event::Resize(width, height) => app.handle_resize(width, height),
        }
    }
}
