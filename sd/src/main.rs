//! siftdaemon - guided search dialogs over a line corpus
//!
//! CLI entry point for serving sessions over JSON lines or a terminal.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tokio::io::BufReader;
use tracing::{debug, error, info, warn};

use corpusstore::{Corpus, SiteSet, SiteSetError};
use siftdaemon::cli::{Cli, Command, get_log_path};
use siftdaemon::config::Config;
use siftdaemon::dispatch::Dispatcher;
use siftdaemon::events::SessionKey;
use siftdaemon::session::DialogContext;
use siftdaemon::transport::{ConsoleMessenger, JsonLinesMessenger, Messenger, run_console, serve};

fn parse_level(level_str: Option<&str>) -> tracing::Level {
    match level_str.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Stdout carries the JSON-lines protocol, so logs go to a file
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = parse_level(cli_log_level.or(config_log_level));

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(path) = cli.corpus {
        debug!(path = %path.display(), "main: corpus path overridden on the command line");
        config.corpus.path = path;
    }
    info!(corpus = %config.corpus.path.display(), sites = config.corpus.sites.len(), "siftdaemon loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Serve => cmd_serve(&config).await,
        Command::Console { user, name } => cmd_console(&config, user, name).await,
        Command::Check => cmd_check(&config),
    }
}

/// Load the corpus and compile the common-sites list
///
/// Neither failure is fatal: an unready corpus and a missing site list are
/// reported to users when they pick a mode that needs them.
fn load_data(config: &Config) -> (Arc<Corpus>, Option<Arc<SiteSet>>) {
    debug!("load_data: called");
    let corpus = Corpus::load(&config.corpus.path);
    if !corpus.is_ready() {
        warn!(path = %config.corpus.path.display(), "Corpus not loaded, search modes are unavailable");
    }

    let sites = match config.corpus.site_set() {
        Ok(sites) => {
            info!(count = sites.len(), "Compiled common-sites list");
            Some(Arc::new(sites))
        }
        Err(SiteSetError::Empty) => {
            warn!("No common sites configured, mode 2 is unavailable");
            None
        }
        Err(e) => {
            error!(error = %e, "Failed to compile common-sites list, mode 2 is unavailable");
            None
        }
    };

    (Arc::new(corpus), sites)
}

fn start_dispatcher(config: &Config, messenger: Arc<dyn Messenger>) -> Dispatcher {
    let (corpus, sites) = load_data(config);
    let ctx = DialogContext::new(corpus, sites, messenger).with_settings(config.dialog_settings());
    Dispatcher::with_buffer(ctx, config.session.channel_buffer)
}

/// Serve JSON-line events from stdin until it closes or ctrl-c
async fn cmd_serve(config: &Config) -> Result<()> {
    debug!("cmd_serve: called");
    let messenger = Arc::new(JsonLinesMessenger::new(tokio::io::stdout()));
    let dispatcher = start_dispatcher(config, messenger);

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = serve(&dispatcher, stdin) => {
            let submitted = result?;
            info!(submitted, "Event stream finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    dispatcher
        .shutdown()
        .await
        .map_err(|e| eyre::eyre!("Failed to shut down dispatcher: {}", e))?;
    Ok(())
}

/// Run one interactive session on this terminal
async fn cmd_console(config: &Config, user: String, name: Option<String>) -> Result<()> {
    debug!(%user, ?name, "cmd_console: called");
    let messenger = Arc::new(ConsoleMessenger::new(config.artifact.output_dir.clone()));
    let dispatcher = start_dispatcher(config, messenger);

    let stdin = BufReader::new(tokio::io::stdin());
    run_console(&dispatcher, SessionKey::new(user), name, stdin).await?;

    dispatcher
        .shutdown()
        .await
        .map_err(|e| eyre::eyre!("Failed to shut down dispatcher: {}", e))?;
    Ok(())
}

/// Print what the daemon would start with
fn cmd_check(config: &Config) -> Result<()> {
    debug!("cmd_check: called");
    let (corpus, sites) = load_data(config);
    let stats = corpus.stats();

    println!("Corpus: {}", config.corpus.path.display().to_string().cyan());
    if stats.ready {
        println!("  Status: {}", "ready".green());
        println!("  Lines: {}", stats.line_count);
        println!("  Total bytes: {}", stats.total_bytes);
    } else {
        println!("  Status: {}", "unavailable".red());
    }
    match &sites {
        Some(sites) => println!("Common sites: {}", sites.len()),
        None => println!("Common sites: {}", "none configured".yellow()),
    }
    println!("Search timeout: {}", match config.session.search_timeout() {
        Some(limit) => format!("{} ms", limit.as_millis()),
        None => "disabled".to_string(),
    });
    println!("Results directory: {}", config.artifact.output_dir.display());
    println!("Log file: {}", get_log_path().display());

    if !stats.ready {
        return Err(eyre::eyre!("Corpus unavailable: {}", config.corpus.path.display()));
    }
    Ok(())
}
