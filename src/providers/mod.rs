//! Upstream providers.
//!
//! # Data Flow
//! ```text
//! query key (CEP, currency pair)
//!     → cep.rs (key validation, CEP lookups only)
//!     → http.rs (bounded GET, status/transport/decode error mapping)
//!     → provider module (schema-specific response → NormalizedRecord)
//! ```
//!
//! # Design Decisions
//! - Every provider is a `ProviderCall` so races and pipelines stay generic
//! - The per-request transport timeout is the time left on the call's deadline
//! - Response schemas stay private to their provider module

pub mod awesomeapi;
pub mod brasilapi;
pub mod cep;
pub mod http;
pub mod quote_server;
pub mod viacep;

use futures_util::future::BoxFuture;

use crate::coordination::{CallContext, Outcome, ProviderId};
use crate::record::NormalizedRecord;

pub use awesomeapi::AwesomeApi;
pub use brasilapi::BrasilApi;
pub use quote_server::QuoteServer;
pub use viacep::ViaCep;

/// One bounded remote fetch that normalizes its result.
///
/// Implementations should stop at their next checkpoint once
/// `ctx.is_done()`; callers additionally drop the future at the deadline.
pub trait ProviderCall: Send + Sync {
    /// Identity attached to records and failures.
    fn id(&self) -> ProviderId;

    fn fetch<'a>(
        &'a self,
        key: &'a str,
        ctx: &'a CallContext,
    ) -> BoxFuture<'a, Outcome<NormalizedRecord>>;
}
