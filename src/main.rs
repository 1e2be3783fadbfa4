use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use taskboard::api::ApiClient;
use taskboard::app::App;
use taskboard::config::Config;
use taskboard::runtime::Runtime;
use taskboard::session::Session;
use taskboard::{logging, paths};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version)]
#[command(about = "Terminal client for the task board API")]
struct Cli {
    /// Config file (default: $TASKBOARD_HOME/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL of the API, overriding the config file
    #[arg(long, env = "TASKBOARD_API_URL")]
    api_url: Option<String>,

    /// Path to open first
    #[arg(long, default_value = "/")]
    route: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(paths::config_path);
    let mut config = Config::load_from(&config_path)?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    let _log_guard = logging::init(&config)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let session = Session::default();
    let api = ApiClient::new(&config.api_url, session.clone())
        .with_context(|| format!("Invalid api_url: {}", config.api_url))?;
    tracing::info!(api_url = %api.base_url(), "starting");

    let app = App::new(session, config.notifications);
    let result = Runtime::new(app, api, rt.handle().clone()).run(&cli.route);

    rt.shutdown_background();
    if let Err(err) = &result {
        tracing::error!(error = %err, "exited with error");
    }
    result
}
