//! Kundeshop B2B server.
//!
//! Serves the three storefront-facing JSON endpoints over the engine.
//! All durable state lives in Shopify; this process holds nothing
//! between requests and can be restarted freely.

#![cfg_attr(not(test), forbid(unsafe_code))]

use kundeshop_engine::{Engine, ShopifyConfig};
use kundeshop_server::config::ServerConfig;
use kundeshop_server::state::AppState;

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kundeshop_server=info,kundeshop_engine=info,tower_http=debug".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Credentials are validated here, before any request is served.
    let shopify_config = ShopifyConfig::from_env().expect("Failed to load Shopify configuration");
    let server_config = ServerConfig::from_env().expect("Failed to load server configuration");

    let engine = Engine::new(shopify_config).expect("Failed to build engine");
    let app = kundeshop_server::app(AppState::new(engine));

    let addr = server_config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "kundeshop server listening");

    axum::serve(listener, app).await.expect("Server error");
}
