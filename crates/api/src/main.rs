use anyhow::Result;
use tracing::info;

mod app;
mod config;
mod error;
mod jobs;
mod middleware;
mod routes;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics();

    info!("Starting PinIt backend v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let pool = persistence::db::create_pool(&config.database_config()).await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Start background jobs
    let mut scheduler = jobs::JobScheduler::new();
    scheduler.register(jobs::PoolMetricsJob::new(pool.clone()));
    if config.jobs.auto_matching_enabled {
        let matching = services::MatchingService::new(pool.clone(), &config.matching);
        scheduler.register(jobs::AutoMatchingJob::new(
            matching,
            config.jobs.auto_matching_interval_minutes,
        ));
    }
    scheduler.start();

    // Build application
    let addr = config.socket_addr();
    let app = app::create_app(config, pool);

    // Start server
    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    // Shut down background jobs once the server loop exits
    scheduler.shutdown();
    scheduler
        .wait_for_shutdown(std::time::Duration::from_secs(10))
        .await;

    Ok(())
}
