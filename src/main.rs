use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use vitalflow_api::config::{AppConfig, StoreBackend};
use vitalflow_api::database::{
    connection::get_db_pool, schema::run_migrations, CredentialStore, MemoryStore, PgCredentialStore,
};
use vitalflow_api::services::mail_service::{LogNotifier, MailService, OtpNotifier};
use vitalflow_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    let store = initialize_store(&config).await?;
    let notifier = initialize_notifier(&config)?;

    let app_state = AppState::new(store, notifier, config.auth.clone());
    let app = build_router(app_state);

    start_server(app, &config).await
}

async fn initialize_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    match (config.store_backend, config.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(url)) => {
            let pool = get_db_pool(url).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PgCredentialStore::new(pool)))
        }
        (StoreBackend::Postgres, None) => anyhow::bail!("DATABASE_URL must be set"),
        (StoreBackend::Memory, _) => {
            tracing::warn!("⚠️ Using in-memory credential store, data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn initialize_notifier(config: &AppConfig) -> anyhow::Result<Arc<dyn OtpNotifier>> {
    match &config.email {
        Some(email) => {
            tracing::info!("📧 OTP emails will be sent from {}", email.sender);
            Ok(Arc::new(MailService::new(email.clone())?))
        }
        None => {
            tracing::warn!("EMAIL_API_KEY/EMAIL_SENDER not set, OTPs will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

async fn start_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid HOST/PORT: {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("🚀 Server starting on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
