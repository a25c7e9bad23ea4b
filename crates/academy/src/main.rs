//! academy - Linux Mastery Academy interactive console
//!
//! This is the main entry point for the academy console.
//! It wires together all the components:
//! - Configuration loading (file or built-in curriculum)
//! - Store initialization
//! - Access gate and progress tracking
//! - Lab controller and session timer

mod console;

use anyhow::{Context, Result};
use academy_config::{Curriculum, builtin_curriculum, load_config};
use academy_store::{AuditEvent, AuditEventType, SqliteStore, Store};
use academy_util::{DB_FILENAME, default_config_path};
use clap::Parser;
use console::Console;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// academy - Interactive Linux labs with progress tracking
#[derive(Parser, Debug)]
#[command(name = "academy")]
#[command(about = "Interactive Linux labs with progress tracking", long_about = None)]
struct Args {
    /// Curriculum file (default: ~/.config/academy/config.toml, falls back
    /// to the built-in course when absent)
    #[arg(short, long, env = "ACADEMY_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory override (or set ACADEMY_DATA_DIR env var)
    #[arg(short, long, env = "ACADEMY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Log in immediately with this access code
    #[arg(short, long)]
    access_code: Option<String>,

    /// E-mail to record on the profile at login
    #[arg(short, long)]
    email: Option<String>,
}

fn load_curriculum(args: &Args) -> Result<Curriculum> {
    if let Some(path) = &args.config {
        return load_config(path)
            .with_context(|| format!("Failed to load curriculum from {:?}", path));
    }

    let path = default_config_path();
    if path.exists() {
        return load_config(&path)
            .with_context(|| format!("Failed to load curriculum from {:?}", path));
    }

    info!("No curriculum file found, using the built-in course");
    builtin_curriculum().context("Built-in curriculum is invalid")
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_prompt(console: &Console) {
    print!("{}", console.prompt());
    let _ = std::io::stdout().flush();
}

async fn run(args: Args) -> Result<()> {
    let curriculum = load_curriculum(&args)?;
    info!(
        sessions = curriculum.sessions.len(),
        labs = curriculum.labs.len(),
        learners = curriculum.learners.len(),
        "Curriculum loaded"
    );

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| curriculum.console.data_dir.clone());
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = data_dir.join(DB_FILENAME);
    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?,
    );
    info!(db_path = %db_path.display(), "Store initialized");
    if !store.is_healthy() {
        warn!("Store health check failed, progress may not be saved");
    }

    store.append_audit(AuditEvent::new(AuditEventType::ConsoleStarted))?;

    let mut console = Console::new(Arc::new(curriculum), store.clone());

    println!("Linux Mastery Academy");
    if let Some(code) = &args.access_code {
        let reply = console.login(code, args.email.as_deref()).await;
        print_lines(&reply.lines);
    }
    if !console.is_logged_in() {
        println!("Enter your access code to begin (or 'quit').");
    }

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_prompt(&console);
    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                println!();
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    // EOF
                    println!();
                    break;
                };
                let reply = console.handle(&line).await;
                print_lines(&reply.lines);
                if reply.quit {
                    break;
                }
                print_prompt(&console);
            }
        }
    }

    if console.is_logged_in() {
        console.logout().await;
    }

    if let Err(e) = store.append_audit(AuditEvent::new(AuditEventType::ConsoleStopped)) {
        warn!(error = %e, "Failed to log console shutdown");
    }
    info!("Shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout belongs to the console, logs go to stderr
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "academy starting");
    if academy_util::is_mock_time_active() {
        warn!("Mock time is active, timestamps are not real");
    }

    run(args).await
}
