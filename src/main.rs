//! Creditflow server binary.
//!
//! Loads configuration, connects the PostgreSQL pool, wires the adapters
//! into the feature routers, and serves the API until a shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use creditflow::adapters::http::{
    api_router, CatalogAppState, CodesAppState, PurchaseAppState, RedemptionAppState,
    WebhookAppState,
};
use creditflow::adapters::notifications::LogNotificationSink;
use creditflow::adapters::postgres::{
    PostgresAuditLog, PostgresCreditCodeStore, PostgresInventoryStore,
    PostgresProcessedEventStore, PostgresProductCatalog, PostgresTransactionStore,
};
use creditflow::adapters::stripe::{StripeConfig, StripeGateway};
use creditflow::application::handlers::webhooks::{PruneJournalCommand, PruneJournalHandler};
use creditflow::config::AppConfig;
use creditflow::ports::{
    AuditLog, CreditCodeStore, InventoryStore, NotificationSink, PaymentGateway,
    ProcessedEventStore, ProductCatalog, TransactionStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        environment = ?config.server.environment,
        stripe_test_mode = config.payment.is_test_mode(),
        "starting creditflow"
    );

    // Database pool
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    // Persistence adapters
    let catalog: Arc<dyn ProductCatalog> = Arc::new(PostgresProductCatalog::new(pool.clone()));
    let transactions: Arc<dyn TransactionStore> =
        Arc::new(PostgresTransactionStore::new(pool.clone()));
    let codes: Arc<dyn CreditCodeStore> = Arc::new(PostgresCreditCodeStore::new(pool.clone()));
    let inventory: Arc<dyn InventoryStore> = Arc::new(PostgresInventoryStore::new(pool.clone()));
    let audit: Arc<dyn AuditLog> = Arc::new(PostgresAuditLog::new(pool.clone()));
    let processed_events: Arc<dyn ProcessedEventStore> =
        Arc::new(PostgresProcessedEventStore::new(pool.clone()));

    // Integration adapters
    let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(
        StripeConfig::new(
            config.payment.stripe_api_key.clone(),
            config.payment.stripe_webhook_secret.clone(),
        )
        .with_require_livemode(config.payment.require_livemode),
    ));
    let notifications: Arc<dyn NotificationSink> = Arc::new(LogNotificationSink::new());

    // Background journal pruning, daily
    spawn_journal_pruner(
        processed_events.clone(),
        config.payment.journal_retain_days,
    );

    let router = api_router(
        CatalogAppState {
            catalog: catalog.clone(),
        },
        PurchaseAppState {
            catalog: catalog.clone(),
            transactions: transactions.clone(),
            codes: codes.clone(),
            inventory: inventory.clone(),
            audit: audit.clone(),
            gateway: gateway.clone(),
            notifications,
        },
        RedemptionAppState {
            codes: codes.clone(),
            catalog: catalog.clone(),
            audit: audit.clone(),
        },
        CodesAppState {
            catalog,
            codes: codes.clone(),
            inventory: inventory.clone(),
            audit: audit.clone(),
        },
        WebhookAppState {
            gateway,
            transactions,
            codes,
            inventory,
            processed_events,
            audit,
        },
    )
    .layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(
                    |request: &axum::http::Request<_>| {
                        let request_id = request
                            .headers()
                            .get("x-request-id")
                            .and_then(|value| value.to_str().ok())
                            .unwrap_or("-");

                        tracing::info_span!(
                            "http_request",
                            request_id = %request_id,
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    },
                ),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(cors_layer(&config))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            ))),
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// CORS policy from configured origins; permissive when none are set.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Spawns the daily processed-event journal prune loop.
///
/// The first tick fires immediately, so a backlog left by downtime is
/// trimmed at startup.
fn spawn_journal_pruner(processed_events: Arc<dyn ProcessedEventStore>, retain_days: i64) {
    let pruner = PruneJournalHandler::new(processed_events);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(24 * 60 * 60));
        loop {
            interval.tick().await;
            if let Err(err) = pruner.handle(PruneJournalCommand { retain_days }).await {
                warn!(error = %err, "processed-event journal prune failed");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
