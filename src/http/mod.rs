//! HTTP surface of the quote server.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → quote.rs (runs the fetch → persist pipeline)
//!     → response.rs (Outcome → status + body)
//! ```

pub mod quote;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
