//! Deadline-bounded fetch orchestration.
//!
//! Races unreliable upstream providers under one deadline (first success
//! wins, losers are cancelled) and runs fetch-then-persist pipelines where
//! each stage has its own independent deadline.

pub mod config;
pub mod coordination;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod providers;
pub mod record;
pub mod storage;

pub use config::AppConfig;
pub use coordination::{pipeline, race, Deadline, ErrorKind, Failure, Outcome, Stage};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use record::NormalizedRecord;
