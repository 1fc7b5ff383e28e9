mod anim;
mod app;
mod bingo;
mod config;
mod countdown;
mod display;
mod file;
mod mirror;
mod selection;
mod spinner;
mod tick;
mod time_format;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use config::Config;
use display::{EventConfig, Events, TerminalApp};
use file::JsonFileStore;
use mirror::{DisplayMirror, NullMirror, TerminalTitle};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "spinboard")]
#[command(about = "Countdown timer, chance spinner and bingo roller", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where widget state is kept (overrides the config)
    #[arg(short, long, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create log directory {}", parent.display()))?;
    }
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path.display()))?;

    // the terminal belongs to the UI, so logs go to a file
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::read(cli.config.as_deref());
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    init_logging(&config.log_path)?;
    if let Err(err) = loaded {
        warn!(%err, "could not read config, using defaults");
    }
    info!(store = %config.store_path.display(), "starting spinboard");

    let store = file::shared(JsonFileStore::open(&config.store_path));
    let mut events = Events::with_config(EventConfig {
        tick_rate: Duration::from_millis(config.input_poll_ms.max(10)),
        ..Default::default()
    });

    let mirror: Box<dyn DisplayMirror> = if config.mirror_title {
        Box::new(TerminalTitle::new(&config.title))
    } else {
        Box::new(NullMirror)
    };

    let mut terminal = TerminalApp::new()?;
    let mut app = App::new(
        &config,
        store,
        mirror,
        events.sender(),
        StdRng::from_entropy(),
    );

    terminal.draw(&app)?;
    while let Some(event) = events.next().await {
        app.handle_event(event);
        if app.exit {
            break;
        }
        terminal.draw(&app)?;
    }

    // cancels the ticker and restores the title before the screen is left
    drop(app);
    drop(terminal);
    info!("spinboard closed");

    Ok(())
}
