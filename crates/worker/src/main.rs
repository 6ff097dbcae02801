use std::sync::Arc;
use std::time::Duration;

use cfgaudit_db::repositories::ConfigFileRepo;
use cfgaudit_pipeline::parser::DeviceConfigParser;
use cfgaudit_pipeline::processor::AnalysisProcessor;
use cfgaudit_pipeline::queue::{AnalysisQueue, WorkerPool};
use cfgaudit_pipeline::store::PgStore;
use cfgaudit_pipeline::PipelineConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often the backfill loop checks for files still `pending`.
const BACKFILL_INTERVAL: Duration = Duration::from_secs(30);

/// How many pending file ids to pull per backfill pass. More than the
/// queue capacity is pointless; the excess would just be shed again.
const BACKFILL_BATCH: i64 = 100;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cfgaudit_worker=debug,cfgaudit_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PipelineConfig::from_env();
    tracing::info!(
        workers = config.worker_count,
        queue_capacity = config.queue_capacity,
        job_timeout_secs = config.job_timeout_secs,
        "Loaded pipeline configuration"
    );

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = cfgaudit_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    cfgaudit_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    cfgaudit_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgStore::new(pool.clone()));
    let processor = Arc::new(AnalysisProcessor::new(store, Arc::new(DeviceConfigParser)));

    let (queue, receiver) = AnalysisQueue::new(config.queue_capacity);
    let worker_pool = WorkerPool::spawn(
        receiver,
        processor,
        config.worker_count,
        config.job_timeout(),
    );
    tracing::info!("Worker pool started");

    // Backfill loop: re-enqueue files still pending, either freshly
    // uploaded while the queue was full or left over from a restart.
    let backfill_cancel = tokio_util::sync::CancellationToken::new();
    let backfill_handle = {
        let pool = pool.clone();
        let queue = queue.clone();
        let cancel = backfill_cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(BACKFILL_INTERVAL) => {}
                }
                match ConfigFileRepo::list_pending_analysis(&pool, BACKFILL_BATCH).await {
                    Ok(ids) => {
                        // A row can be `pending` while its id already waits
                        // in the queue; the queue skips those, so duplicate
                        // submissions never reach a second worker.
                        let enqueued = ids.into_iter().filter(|id| queue.enqueue(*id)).count();
                        if enqueued > 0 {
                            tracing::debug!(enqueued, "backfill re-enqueued pending files");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "backfill query failed");
                    }
                }
            }
        })
    };

    shutdown_signal().await;

    backfill_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), backfill_handle).await;
    tracing::info!("Backfill loop stopped");

    worker_pool.shutdown().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
