//! Axum API server binary.

use std::net::SocketAddr;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ryu_api::{create_router, AdminBootstrap, ApiConfig, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("ryu=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting ryu-api");

    // Load configuration
    let config = ApiConfig::from_env();
    info!("API config: host={}, port={}", config.host, config.port);

    if config.is_production() && config.uses_dev_secret() {
        warn!("TOKEN_SECRET is unset; running production with the dev fallback secret");
    }

    // Create application state
    let state = match AppState::new(config.clone()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create application state: {}", e);
            std::process::exit(1);
        }
    };

    // Bootstrap the admin account when credentials are provided. The
    // store lives in-process, so this runs at startup rather than as a
    // separate script; it is idempotent either way.
    if let (Ok(email), Ok(password)) =
        (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD"))
    {
        let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin User".to_string());
        match state.accounts.ensure_admin(&name, &email, &password).await {
            Ok(AdminBootstrap::Created(admin)) => {
                info!("Admin account created: {}", admin.email)
            }
            Ok(AdminBootstrap::AlreadyExists(admin)) => {
                info!("Admin account already exists: {}", admin.email)
            }
            Err(e) => {
                error!("Admin bootstrap failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid bind address");

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Received shutdown signal");
}
