use anyhow::Context;
use dotenvy::dotenv;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::AppState;
use config::AppConfig;
use jobs::spawn_all_jobs;
use otp::{MongoOtpStore, OtpManager};
use sms::{HttpSmsSender, LogSmsSender, SmsSender};
use users::MongoUserStore;

#[cfg(not(test))]
use database::AppDatabase;
#[cfg(test)]
use database::MockAppDatabase as AppDatabase;

pub mod app;
pub mod auth;
pub mod config;
pub mod constants;
pub mod database;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod otp;
pub mod sms;
pub mod swagger;
pub mod users;
pub mod utils;

pub async fn start_web_server() -> anyhow::Result<()> {
    // import .env file
    dotenv().ok();
    initialize_logging();
    let config = AppConfig::from_env().context("Invalid configuration")?;
    // create database client
    let db_client = AppDatabase::new(&config)
        .await
        .context("Unable to accquire database client")?;
    let db_client = Arc::new(db_client);

    let otp_store = Arc::new(MongoOtpStore::new(db_client.clone()));
    otp_store.ensure_indexes().await?;
    let user_store = Arc::new(MongoUserStore::new(db_client.clone()));
    user_store.ensure_indexes().await?;

    let sms: Arc<dyn SmsSender> = match config.sms.clone() {
        Some(sms_config) => Arc::new(HttpSmsSender::new(sms_config)?),
        None => {
            tracing::warn!("SMS_DRY_RUN is enabled, verification codes are not delivered");
            Arc::new(LogSmsSender)
        }
    };
    let otp = OtpManager::new(otp_store.clone(), config.otp_ttl_secs);
    let jobs = spawn_all_jobs(otp_store, config.cleanup_interval_secs);

    let state = AppState {
        config: Arc::new(config),
        otp: Arc::new(otp),
        users: user_store,
        sms,
    };
    let served = start_server(state).await;

    for job in jobs {
        job.abort();
        let _ = job.await;
    }
    // every other owner of the client is dropped once the server and jobs stop
    match Arc::try_unwrap(db_client) {
        Ok(db_client) => db_client.close().await,
        Err(_) => tracing::warn!("Database client still in use, skipping close"),
    }
    served
}

fn initialize_logging() {
    // create default env filter
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or("phone_verify_backend=debug,tower_http=debug".into());

    // initialize tracing subscriber for logging
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

async fn start_server(state: AppState) -> anyhow::Result<()> {
    // build the socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    // create the app instance
    let app = app::build_app(state);
    tracing::debug!("Starting the app in: {addr}");
    // start serving the app in the socket address
    axum::Server::try_bind(&addr)
        .with_context(|| format!("Unable to bind {addr}"))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Unable to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
