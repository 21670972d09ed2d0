//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the quote and health handlers
//! - Wire up middleware (request ID, tracing, outer timeout)
//! - Serve until the shutdown broadcast fires

use axum::{http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::coordination::StageBudgets;
use crate::http::quote;
use crate::http::request::UuidRequestId;
use crate::lifecycle::shutdown;
use crate::providers::ProviderCall;
use crate::storage::PersistenceCall;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<dyn ProviderCall>,
    pub store: Arc<dyn PersistenceCall>,
    pub quote_pair: String,
    pub budgets: StageBudgets,
}

/// HTTP server for the quote service.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server fetching from `quotes` and storing into `store`.
    pub fn new(
        config: AppConfig,
        quotes: Arc<dyn ProviderCall>,
        store: Arc<dyn PersistenceCall>,
    ) -> Self {
        let state = AppState {
            quotes,
            store,
            quote_pair: config.providers.quote_pair.clone(),
            budgets: config.timeouts.server_budgets(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/cotacao", get(quote::get_quote))
            .route("/health", get(quote::health))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.timeouts.request(),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            fetch_ms = self.config.timeouts.fetch_ms,
            persist_ms = self.config.timeouts.persist_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
