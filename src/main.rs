mod alerts;
mod collectors;
mod config;
mod history;
mod http;
mod monitor;
mod snapshot;

use clap::Parser;
use collectors::system::SystemSource;
use config::Config;
use history::HistoryStore;
use monitor::Monitor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

#[derive(Parser, Debug)]
#[command(name = "vigild")]
#[command(version)]
struct Cli {
    /// Path to the YAML config file.
    #[arg(long)]
    config: Option<String>,
    /// Print the annotated default configuration and exit.
    #[arg(long)]
    print_default_config: bool,
    /// Override the listen address from the config file.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let mut cfg = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };
    if let Some(listen) = cli.listen {
        cfg.listen = listen;
        if let Err(err) = cfg.validate() {
            error!(error = %err, "invalid --listen override");
            std::process::exit(1);
        }
    }

    info!(
        listen = %cfg.listen,
        interval_secs = cfg.interval_secs,
        "starting vigild"
    );

    let history = match HistoryStore::new(cfg.history_capacity, cfg.history_read_limit) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            error!(error = %err, "failed to initialize history store");
            std::process::exit(1);
        }
    };
    info!(
        capacity = history.capacity(),
        default_read_limit = cfg.history_read_limit,
        "history store initialized"
    );
    let source = SystemSource::new(cfg.disk_path.clone());
    let monitor = Arc::new(Monitor::new(Box::new(source), history));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_task = {
        let cfg = cfg.clone();
        let monitor = monitor.clone();
        let mut shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move {
            let app = http::build_router(monitor);
            let addr: SocketAddr = match cfg.listen.parse() {
                Ok(addr) => addr,
                Err(err) => {
                    error!(error = %err, listen = %cfg.listen, "invalid listen address");
                    return;
                }
            };

            let listener = match TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(err) => {
                    error!(error = %err, "failed to start HTTP server");
                    return;
                }
            };

            info!(addr = %addr, "HTTP API listening");
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            });

            if let Err(err) = server.await {
                error!(error = %err, "HTTP server error");
            }
        })
    };

    let collector_task = tokio::spawn(monitor::run_collector(
        monitor.clone(),
        Duration::from_secs(cfg.interval_secs),
        shutdown_rx.clone(),
    ));

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to wait for Ctrl+C");
    }
    info!("received Ctrl+C, shutting down");

    let _ = shutdown_tx.send(true);

    let _ = collector_task.await;
    let _ = http_task.await;
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&str>) -> Result<Config, config::ConfigError> {
    match path {
        Some(path) => Config::load_from_file(path),
        None => {
            if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() {
                Config::load_from_file(DEFAULT_CONFIG_PATH)
            } else {
                info!("no config file found, using built-in defaults");
                Ok(Config::default())
            }
        }
    }
}
