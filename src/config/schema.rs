//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML and every
//! field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::coordination::StageBudgets;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Quote server listener.
    pub listener: ListenerConfig,

    /// Upstream provider endpoints.
    pub providers: ProvidersConfig,

    /// Deadlines for every bounded operation.
    pub timeouts: TimeoutConfig,

    /// Persistence targets.
    pub storage: StorageConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream provider endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// BrasilAPI CEP base URL; the CEP is appended as a path segment.
    pub brasilapi_url: String,

    /// ViaCEP base URL; `/{cep}/json` is appended.
    pub viacep_url: String,

    /// Exchange quote endpoint.
    pub quote_url: String,

    /// Key the quote body is indexed by.
    pub quote_pair: String,

    /// Quote server endpoint used by the quote client.
    pub server_url: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            brasilapi_url: "https://brasilapi.com.br/api/cep/v1".to_string(),
            viacep_url: "https://viacep.com.br/ws".to_string(),
            quote_url: "https://economia.awesomeapi.com.br/json/last/USD-BRL".to_string(),
            quote_pair: "USDBRL".to_string(),
            server_url: "http://localhost:8080/cotacao".to_string(),
        }
    }
}

/// Deadlines, in milliseconds unless noted.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Shared deadline for the CEP race.
    pub lookup_ms: u64,

    /// Server: upstream quote fetch.
    pub fetch_ms: u64,

    /// Server: database write, independent of `fetch_ms`.
    pub persist_ms: u64,

    /// Client: request to the quote server.
    pub client_ms: u64,

    /// Client: writing the output file.
    pub client_persist_ms: u64,

    /// Outer HTTP request timeout for the server, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            lookup_ms: 1000,
            fetch_ms: 200,
            persist_ms: 10,
            client_ms: 300,
            client_persist_ms: 1000,
            request_secs: 5,
        }
    }
}

impl TimeoutConfig {
    pub fn lookup(&self) -> Duration {
        Duration::from_millis(self.lookup_ms)
    }

    /// Budgets for the server's fetch-then-store pipeline.
    pub fn server_budgets(&self) -> StageBudgets {
        StageBudgets::from_millis(self.fetch_ms, self.persist_ms)
    }

    /// Budgets for the client's fetch-then-write pipeline.
    pub fn client_budgets(&self) -> StageBudgets {
        StageBudgets::from_millis(self.client_ms, self.client_persist_ms)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

/// Persistence targets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database used by the server.
    pub database_path: String,

    /// Text file written by the client.
    pub output_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "cotacoes.db".to_string(),
            output_path: "cotacao.txt".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
