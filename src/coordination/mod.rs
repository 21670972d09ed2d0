//! Deadline-bounded orchestration of provider and persistence calls.
//!
//! # Data Flow
//! ```text
//! Race:
//!     deadline.rs (one absolute Deadline for every participant)
//!     → race.rs spawns one RaceTicket per provider
//!     → tickets report once into a bounded conduit (capacity = participants)
//!     → coordinator selects on {conduit, deadline}
//!     → first Success wins; cancel.rs broadcasts cancellation to the rest
//!
//! Pipeline:
//!     pipeline.rs: Fetch stage under its own Deadline
//!     → on success, Persist stage under a freshly computed Deadline
//!     → failure at either stage is tagged with the stage
//! ```
//!
//! # Design Decisions
//! - Failures are values (`Outcome`), not panics or `Err` propagation
//! - Cancellation is advisory; nothing waits for a cancelled call to finish
//! - No retries at this layer

pub mod cancel;
pub mod context;
pub mod deadline;
pub mod outcome;
pub mod pipeline;
pub mod race;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use context::CallContext;
pub use deadline::Deadline;
pub use outcome::{ErrorKind, Failure, Outcome, ProviderId, Stage};
pub use pipeline::StageBudgets;
pub use race::race;
