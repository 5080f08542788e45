use anyhow::Context;
use std::sync::Arc;
use tracing::{info, info_span};

use subscription_tracker::{
    app,
    config::Config,
    database,
    logging::{LogFormat, init_logging},
    service::SubscriptionService,
    store::LibsqlSubscriptionStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load environment variables
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_logging(LogFormat::Pretty);
            return Err(e).context("Failed to load configuration");
        }
    };
    init_logging(config.log_format);
    info!(
        host = %config.host,
        port = %config.port,
        data_path = %config.data_path,
        query_timeout = ?config.query_timeout,
        "Configuration loaded"
    );

    let db = database::init_db(&config.data_path)
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.data_path))?;
    info!(file = %config.database_file().display(), "Database ready");

    let store = LibsqlSubscriptionStore::new(
        db,
        config.query_timeout,
        info_span!("subscription_store"),
    );
    let service = SubscriptionService::new(Arc::new(store), info_span!("subscription_service"));

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Server running on http://{}", bind_address);

    axum::serve(listener, app(service))
        .await
        .context("Server error")?;
    Ok(())
}
