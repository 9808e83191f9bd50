//! Atelier notification server.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use atelier_api::{AppState, build_app, serve};
use atelier_core::config::{AppConfig, StoreBackend};
use atelier_core::error::AppError;
use atelier_database::repositories::{DirectoryRepository, NotificationRepository};
use atelier_database::{DatabasePool, DirectoryStore, MemoryStore, NotificationStore};
use atelier_delivery::{FanOutDispatcher, InAppChannel, MessagingChannel, Notifier, PushChannel};
use atelier_service::{InboxService, StakeholderResolver, TemplateComposer};
use atelier_worker::{CronScheduler, DailyLogReminderJob, RetentionJob};

#[tokio::main]
async fn main() {
    let env = std::env::var("ATELIER_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

type Stores = (
    Arc<dyn NotificationStore>,
    Arc<dyn DirectoryStore>,
    Option<DatabasePool>,
);

/// Open the configured backing store.
async fn open_stores(config: &AppConfig) -> Result<Stores, AppError> {
    match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            let notifications: Arc<dyn NotificationStore> = store.clone();
            let directory: Arc<dyn DirectoryStore> = store;
            Ok((notifications, directory, None))
        }
        StoreBackend::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                pool.migrate().await?;
            }
            let notifications: Arc<dyn NotificationStore> =
                Arc::new(NotificationRepository::new(pool.pool().clone()));
            let directory: Arc<dyn DirectoryStore> =
                Arc::new(DirectoryRepository::new(pool.pool().clone()));
            Ok((notifications, directory, Some(pool)))
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Atelier notifications v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    let (notifications, directory, pool) = open_stores(&config).await?;

    // ── Step 2: Delivery channels ────────────────────────────────
    let in_app = Arc::new(InAppChannel::new(Arc::clone(&notifications)));
    let push = Arc::new(PushChannel::new(config.notifications.push.clone())?);
    let messaging = Arc::new(MessagingChannel::new(config.notifications.messaging.clone())?);
    tracing::info!(
        push = config.notifications.push.is_enabled(),
        messaging = config.notifications.messaging.is_enabled(),
        "Delivery channels initialized"
    );

    let dispatcher = Arc::new(FanOutDispatcher::new(
        Arc::clone(&directory),
        in_app,
        push,
        messaging,
    ));

    // ── Step 3: Services ─────────────────────────────────────────
    let notifier = Notifier::new(
        Arc::new(StakeholderResolver::new(Arc::clone(&directory))),
        Arc::new(TemplateComposer::new(Arc::clone(&directory))),
        Arc::clone(&dispatcher),
    );
    let inbox = Arc::new(InboxService::new(
        Arc::clone(&notifications),
        config.notifications.inbox.clone(),
    ));
    let reminders = Arc::new(DailyLogReminderJob::new(
        Arc::clone(&directory),
        Arc::clone(&dispatcher),
        config.reminders.clone(),
    ));

    // ── Step 4: Scheduled jobs ───────────────────────────────────
    let mut scheduler = CronScheduler::new().await?;
    if config.reminders.enabled {
        scheduler
            .register(&config.reminders.schedules, reminders.clone())
            .await?;
    } else {
        tracing::info!("Daily-log reminders disabled");
    }
    let retention = Arc::new(RetentionJob::new(
        Arc::clone(&notifications),
        config.notifications.inbox.clone(),
    ));
    scheduler
        .register(
            std::slice::from_ref(&config.reminders.retention_schedule),
            retention,
        )
        .await?;
    scheduler.start().await?;

    // ── Step 5: HTTP server ──────────────────────────────────────
    let server_config = config.server.clone();
    let grace = Duration::from_secs(server_config.shutdown_grace_seconds);
    let state = AppState::new(Arc::new(config), inbox, notifier, reminders);

    let served = serve(build_app(state), &server_config).await;

    // ── Step 6: Graceful shutdown ────────────────────────────────
    tracing::info!("Shutdown signal received, stopping background tasks...");
    match tokio::time::timeout(grace, scheduler.shutdown()).await {
        Ok(Err(e)) => tracing::warn!("Scheduler shutdown failed: {}", e),
        Err(_) => tracing::warn!("Scheduler did not stop within {:?}", grace),
        Ok(Ok(())) => {}
    }
    if let Some(pool) = pool {
        pool.close().await;
    }

    served?;
    tracing::info!("Atelier server shut down gracefully");
    Ok(())
}
