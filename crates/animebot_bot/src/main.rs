//! Animebot webhook server.
//!
//! Receives chat updates over HTTP, updates subscriptions in PostgreSQL and
//! publishes the resulting notifications to NATS.

use animebot_bot::{
    ApiState, CommandRouter, NatsPublisher, Settings, create_router, init_observability,
};
use animebot_database::{
    PoolSettings, PostgresCatalogStore, PostgresSubscriptionStore, PostgresUserStore,
    create_pool, run_migrations,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Command-line arguments for the webhook server.
#[derive(Parser, Debug)]
#[command(name = "animebot")]
#[command(about = "Anime release subscription bot - webhook server")]
#[command(version)]
struct Args {
    /// Path to an extra configuration file
    #[arg(short, long, env = "ANIMEBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Validate configuration and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())?;
    let telemetry = init_observability(&settings.telemetry)?;

    info!(
        port = settings.server.port,
        subject = %settings.nats.subject,
        "Starting animebot"
    );

    if args.dry_run {
        info!("DRY RUN MODE - configuration is valid");
        telemetry.shutdown();
        return Ok(());
    }

    let pool = create_pool(&PoolSettings::from(&settings.database))?;
    if settings.database.run_migrations {
        let migration_pool = pool.clone();
        let applied = tokio::task::spawn_blocking(move || run_migrations(&migration_pool)).await??;
        info!(applied, "Migrations complete");
    }

    let publisher = NatsPublisher::connect(&settings.nats.url, settings.nats.subject.clone()).await?;

    let router = CommandRouter::new(
        Arc::new(PostgresUserStore::new(pool.clone())),
        Arc::new(PostgresCatalogStore::new(pool.clone())),
        Arc::new(PostgresSubscriptionStore::new(pool)),
        Arc::new(publisher),
    );
    let app = create_router(ApiState::new(Arc::new(router)));

    let addr = settings.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening for webhooks");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!(error = %e, "Server stopped with an error");
    }

    info!("Shutting down");
    telemetry.shutdown();
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
