//! Outcome and failure taxonomy shared by every call in this crate.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Identity of an upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProviderId(pub &'static str);

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Pipeline stage a failure originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of an expected failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The request could not be constructed (bad key, bad URL).
    #[error("invalid request")]
    InvalidRequest,

    /// Transport-level failure reaching the remote end.
    #[error("remote unreachable")]
    Unreachable,

    /// Remote end answered with a non-success status.
    #[error("remote rejected request with status {0}")]
    RemoteRejected(u16),

    /// Payload did not decode into the expected shape.
    #[error("malformed response")]
    MalformedResponse,

    /// Provider reported that the key does not exist.
    #[error("not found")]
    NotFound,

    /// Deadline elapsed or the call was cancelled.
    #[error("timed out")]
    Timeout,

    /// Every provider in a race failed before the deadline.
    #[error("all {} providers failed", .0.len())]
    AllProvidersFailed(Vec<Failure>),

    /// Durable write failed.
    #[error("storage error")]
    StorageError,
}

impl ErrorKind {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Unreachable => "unreachable",
            ErrorKind::RemoteRejected(_) => "remote_rejected",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Timeout => "timeout",
            ErrorKind::AllProvidersFailed(_) => "all_providers_failed",
            ErrorKind::StorageError => "storage_error",
        }
    }
}

/// A modeled failure: what went wrong, where, and who reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: ErrorKind,
    detail: String,
    provider: Option<ProviderId>,
    stage: Option<Stage>,
}

impl Failure {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            provider: None,
            stage: None,
        }
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, detail)
    }

    pub fn storage(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageError, detail)
    }

    /// Tag with the originating provider.
    pub fn from_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Tag with the pipeline stage.
    pub fn at_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn provider(&self) -> Option<ProviderId> {
        self.provider
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    /// Sub-failures of an `AllProvidersFailed` aggregate, empty otherwise.
    pub fn sub_failures(&self) -> &[Failure] {
        match &self.kind {
            ErrorKind::AllProvidersFailed(failures) => failures,
            _ => &[],
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(stage) = self.stage {
            write!(f, "[{}] ", stage)?;
        }
        if let Some(provider) = self.provider {
            write!(f, "{}: ", provider)?;
        }
        write!(f, "{}", self.kind)?;
        if !self.detail.is_empty() {
            write!(f, " ({})", self.detail)?;
        }
        for sub in self.sub_failures() {
            write!(f, "; {}", sub)?;
        }
        Ok(())
    }
}

impl std::error::Error for Failure {}

/// Result of one bounded call: exactly one of success or failure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    Success(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(failure) => Err(failure),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Metrics label: `success` or the failure kind's label.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Failure(failure) => failure.kind.label(),
        }
    }
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(failure) => Outcome::Failure(failure),
        }
    }
}
