//! Lyked - user accounts and upload metadata API
//! Mission: Serve register/login/refresh and per-user upload CRUD over HTTP

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use lyked_backend::{
    auth::{password, JwtHandler, UserStore},
    build_router,
    uploads::UploadStore,
    AppConfig, AppState,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = AppConfig::parse();
    config.validate().context("Refusing to start")?;
    let addr = config.bind_addr()?;

    info!("🚀 Lyked backend starting");

    let user_store = Arc::new(
        UserStore::new(&config.auth_db_path)
            .with_context(|| format!("Failed to open credential store at {}", config.auth_db_path))?,
    );
    info!("🔐 Credential store ready at: {}", config.auth_db_path);

    let upload_store = Arc::new(
        UploadStore::new(&config.uploads_db_path)
            .with_context(|| format!("Failed to open upload store at {}", config.uploads_db_path))?,
    );
    info!("📼 Upload store ready at: {}", config.uploads_db_path);

    password::init_dummy_hash().context("Failed to prepare password verification")?;

    let jwt_handler =
        Arc::new(JwtHandler::new(config.jwt_secret.clone()).with_issuer(&config.token_issuer));

    let app = build_router(AppState::new(user_store, upload_store, jwt_handler));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate root (running with --manifest-path from elsewhere)
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyked_backend=debug,lyked=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    info!("🛑 Shutdown signal received, draining connections");
}
