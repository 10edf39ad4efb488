use anyhow::Result;
use clap::Parser;
use clap_serde_derive::ClapSerde;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::inference::ModelState;
use crate::routes::{router, AppState};
use crate::telemetry::init_telemetry;

#[macro_export]
macro_rules! exit_err {
    ($msg:literal) => {{
        ::tracing::error!($msg);
        std::process::exit(1);
    }};
    ($code:expr, $fmt:literal $(, $arg:expr)*) => {{
        ::tracing::error!($fmt $(, $arg)*);
        std::process::exit($code);
    }};
}

mod config;
mod error;
mod extractors;
#[allow(dead_code)]
mod inference;
mod routes;
mod schema;
mod telemetry;

#[cfg(unix)]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const DEFAULT_CONFIG_FILE: &str = "InsurancePremium.toml";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env, default_value = DEFAULT_CONFIG_FILE)]
    config_file: String,

    /// Configuration options
    #[command(flatten)]
    pub opt_config: <Config as ClapSerde>::Opt,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry();

    let args = Args::parse();
    let config = match Config::from_toml(&args.config_file) {
        Ok(Some(opt)) => Config::from(opt).merge(args.opt_config),
        Ok(None) if args.config_file == DEFAULT_CONFIG_FILE => {
            Config::default().merge(args.opt_config)
        }
        Ok(None) => exit_err!(1, "Configuration file {} does not exist", args.config_file),
        Err(err) => exit_err!(1, "Failed to load configuration: {:#}", err),
    };

    let model = ModelState::load(&config.model_path);
    if !model.is_loaded() {
        warn!("Starting without a model, /predict will fail until the service is restarted with a valid artifact");
    }

    let app = router(AppState { model }, config.body_limit);
    let listener = TcpListener::bind(format!("{}:{}", config.address, config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down...");
}
