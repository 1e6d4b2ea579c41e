//! Federation Entity Server Binary
//!
//! Runs one federation entity. The entity name comes from the first command
//! line argument and determines the entity identifier and listening port.

use std::env;
use std::sync::Arc;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use federation_core::{KeyManager, SystemClock};
use federation_entity::{create_router, EntityContext, EntitySettings, ReqwestFetcher};

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = env::var("FEDERATION_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // One process = one entity; the name selects identity and port
    let entity_name = env::args().nth(1).unwrap_or_else(|| "node1".into());
    let settings = EntitySettings::for_entity(&entity_name);

    info!(
        entity = %settings.entity_name,
        entity_id = %settings.entity_id,
        port = settings.port,
        "Starting federation entity"
    );

    // Without a signing key the entity cannot participate at all
    let keys = match KeyManager::initialize(&entity_name) {
        Ok(keys) => Arc::new(keys),
        Err(e) => {
            error!(error = %e, "Failed to initialize signing keys");
            std::process::exit(1);
        }
    };

    let ctx = Arc::new(EntityContext::new(
        settings.clone(),
        keys,
        Arc::new(SystemClock),
        Arc::new(ReqwestFetcher::new()),
    ));

    let app = create_router(ctx);

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(
        addr = %addr,
        config_url = %format!("{}/.well-known/openid-federation", settings.base_url),
        "Federation entity listening"
    );

    axum::serve(listener, app).await.expect("Server error");
}
