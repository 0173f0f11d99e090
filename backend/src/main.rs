//! Backend entry-point: reads configuration, prepares the database, and
//! serves the REST API.

mod server;

use std::process::ExitCode;

use mockable::DefaultEnv;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use conduit::config::AppConfig;
use conduit::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(error = %message, "server terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let config = AppConfig::from_env(&DefaultEnv::new()).map_err(|e| e.to_string())?;

    run_pending_migrations(&config.database_url)
        .await
        .map_err(|e| e.to_string())?;

    let pool_config = PoolConfig::new(config.database_url.as_str()).with_max_size(config.pool_max_size);
    let pool = DbPool::new(pool_config)
        .await
        .map_err(|e| e.to_string())?;

    let server = create_server(ServerConfig::new(config.bind_addr, pool, config.token_key))
        .map_err(|e| format!("failed to bind {}: {e}", config.bind_addr))?;
    info!(bind_addr = %config.bind_addr, "listening");
    server.await.map_err(|e| e.to_string())
}
