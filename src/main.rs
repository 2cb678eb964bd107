//! Taproom Backend Service
//!
//! Main entry point for the Taproom point-of-sale backend.
//! This service provides:
//! - HTTP JSON API for order settlement, raises, restocking, and accounts
//! - Background popularity sweep keeping catalog ranking fresh

use std::net::SocketAddr;
use std::sync::Arc;
use taproom_backend::api::{self, ApiContext};
use taproom_backend::business_day::venue_offset;
use taproom_backend::config::AppConfig;
use taproom_backend::database::{create_pool, run_migrations};
use taproom_backend::error::{AppError, AppResult};
use taproom_backend::services::{
    AuditTrailService, OrderService, PopularitySweeper, PurchaseService, RaiseService, UserService,
};
use taproom_backend::AppState;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("taproom_backend={},sqlx=warn,axum=info", config.log_level).into()
            }),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Taproom Backend Service Starting                ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);
    info!("Venue UTC offset: {}h", config.venue_utc_offset_hours);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    // Run migrations
    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    info!("Initializing core services...");

    // Initialize application state with repositories
    let app_state = Arc::new(AppState::new(pool.clone()));
    info!("✓ Application state initialized with repositories");

    // Initialize audit trail service
    let audit_log_dir = std::path::PathBuf::from(
        std::env::var("AUDIT_LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
    );

    if let Err(e) = std::fs::create_dir_all(&audit_log_dir) {
        warn!("Could not create audit log directory: {}", e);
    }

    let audit = Arc::new(AuditTrailService::new(audit_log_dir).map_err(|e| {
        error!("Failed to initialize audit trail: {}", e);
        AppError::Message(format!("Audit trail initialization failed: {}", e))
    })?);
    info!("✓ Audit trail service initialized");

    // Business days are resolved in the venue's offset everywhere
    let offset = venue_offset(config.venue_utc_offset_hours);

    let order_service = Arc::new(OrderService::new(
        app_state.order_repo.clone(),
        app_state.user_repo.clone(),
        audit.clone(),
        offset,
    ));
    let raise_service = Arc::new(RaiseService::new(
        app_state.raise_repo.clone(),
        app_state.user_repo.clone(),
        audit.clone(),
    ));
    let purchase_service = Arc::new(PurchaseService::new(
        app_state.purchase_repo.clone(),
        audit.clone(),
        offset,
    ));
    let user_service = Arc::new(UserService::new(app_state.user_repo.clone(), audit.clone()));
    info!("✓ Domain services initialized");

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    info!("Starting background tasks...");

    // Popularity sweep keeps scores decaying for idle products
    let sweeper = PopularitySweeper::new(app_state.product_repo.clone())
        .with_sweep_interval(config.popularity_sweep_interval());

    let sweeper_handle = tokio::spawn(async move {
        sweeper.start().await;
    });
    info!(
        "✓ Popularity sweep background task started ({}s interval)",
        config.popularity_sweep_interval_secs
    );

    // =========================================================================
    // START SERVER
    // =========================================================================

    let ctx = ApiContext {
        order_service,
        raise_service,
        purchase_service,
        user_service,
        product_repo: app_state.product_repo.clone(),
    };
    let app = api::router(ctx);

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HTTP address: {}", e)))?;

    info!("Starting HTTP server on {}...", http_addr);

    let listener = TcpListener::bind(http_addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {}", e)))?;

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("✓ HTTP server started on {}", http_addr);

    // =========================================================================
    // READY
    // =========================================================================
    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Taproom Backend Service Ready!                  ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  HTTP API:     0.0.0.0:{}                              ║", config.http_port);
    info!("║  Environment:  {}                                    ║", config.environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = server_handle => {
            error!("HTTP server exited unexpectedly");
        }
        _ = sweeper_handle => {
            error!("Popularity sweep task exited unexpectedly");
        }
    }

    info!("Taproom backend service shutdown complete");
    Ok(())
}
