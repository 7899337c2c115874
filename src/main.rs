use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::{info, warn};

use ytscribe::config::{self, Config};
use ytscribe::page::PageController;
use ytscribe::server::{self, AppState};
use ytscribe::session::SessionStore;
use ytscribe::summarize::GeminiClient;
use ytscribe::youtube::YouTubeCaptions;

mod cli;

use cli::Cli;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytscribe.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytscribe")
        .join("logs")
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();
    setup_logging()?;

    let cli = <Cli as clap::Parser>::parse();

    // Config file is non-fatal if missing/invalid
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file {}: {e}", config::config_path().display());
        Config::default()
    });

    // CLI flags take priority over the config file
    let bind = cli.bind.or(config.bind).unwrap_or_else(|| config::DEFAULT_BIND.to_string());
    let model = cli.model.or(config.model).unwrap_or_else(|| config::DEFAULT_MODEL.to_string());
    let lang = cli.lang.or(config.lang).unwrap_or_else(|| config::DEFAULT_LANG.to_string());
    let query_limit = cli.query_limit.or(config.query_limit).unwrap_or(config::DEFAULT_QUERY_LIMIT);
    let idle_minutes = cli
        .session_idle_minutes
        .or(config.session_idle_minutes)
        .unwrap_or(config::DEFAULT_SESSION_IDLE_MINUTES);

    let api_key = config::api_key_from_env();
    if api_key.is_none() {
        warn!("{} is not set; summaries will fail until it is", config::API_KEY_ENV);
    }

    if cli.verbose {
        let config_path = config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!("Logs: {}", log_dir().join("ytscribe.log").display());
        eprintln!("Model: {model}\nCaption language: {lang}\nQuery limit: {query_limit}\nSession idle timeout: {idle_minutes}m");
        if api_key.is_none() {
            eprintln!("Warning: {} is not set", config::API_KEY_ENV);
        }
    }

    let client = reqwest::Client::new();
    let controller = PageController::new(
        Arc::new(YouTubeCaptions::new(client.clone(), lang)),
        Arc::new(GeminiClient::new(client, model, api_key)),
    );

    let state = AppState {
        controller: Arc::new(controller),
        sessions: Arc::new(SessionStore::new(
            query_limit,
            Duration::from_secs(idle_minutes.saturating_mul(60)),
        )),
    };

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .wrap_err_with(|| format!("failed to bind {bind}"))?;
    info!("Serving on http://{bind}");
    eprintln!("Serving on http://{bind}");

    axum::serve(listener, server::router(state)).await?;
    Ok(())
}
