//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use deadline_fetch::coordination::{CallContext, Deadline, ErrorKind, Failure, Outcome, ProviderId};
use deadline_fetch::providers::ProviderCall;
use deadline_fetch::record::{NormalizedRecord, Quote};
use deadline_fetch::storage::PersistenceCall;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Counts fetch futures that ended, whether they completed or were dropped.
struct FinishGuard(Arc<AtomicUsize>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Provider that answers after a fixed delay with a scripted result.
pub struct ScriptedProvider {
    id: ProviderId,
    delay: Duration,
    fail: Option<ErrorKind>,
    cooperative: bool,
    pub calls: AtomicUsize,
    pub finished: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn ok(id: &'static str, delay_ms: u64) -> Arc<Self> {
        Arc::new(Self::build(id, delay_ms, None))
    }

    pub fn fail(id: &'static str, delay_ms: u64, kind: ErrorKind) -> Arc<Self> {
        Arc::new(Self::build(id, delay_ms, Some(kind)))
    }

    /// Like `ok` but never checks its context.
    pub fn stubborn(id: &'static str, delay_ms: u64) -> Arc<Self> {
        let mut provider = Self::build(id, delay_ms, None);
        provider.cooperative = false;
        Arc::new(provider)
    }

    fn build(id: &'static str, delay_ms: u64, fail: Option<ErrorKind>) -> Self {
        Self {
            id: ProviderId(id),
            delay: Duration::from_millis(delay_ms),
            fail,
            cooperative: true,
            calls: AtomicUsize::new(0),
            finished: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

impl ProviderCall for ScriptedProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn fetch<'a>(
        &'a self,
        _key: &'a str,
        ctx: &'a CallContext,
    ) -> BoxFuture<'a, Outcome<NormalizedRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let guard = FinishGuard(Arc::clone(&self.finished));
        async move {
            let _guard = guard;
            if self.cooperative {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => {}
                    _ = ctx.done() => return Outcome::Failure(ctx.expired(self.id)),
                }
            } else {
                tokio::time::sleep(self.delay).await;
            }
            match &self.fail {
                Some(kind) => Outcome::Failure(Failure::new(kind.clone(), "scripted").from_provider(self.id)),
                None => Outcome::Success(NormalizedRecord::quote(
                    self.id,
                    Quote {
                        bid: format!("bid-from-{}", self.id),
                    },
                )),
            }
        }
        .boxed()
    }
}

/// Erase a scripted provider into the trait object races take.
pub fn dyn_provider(provider: &Arc<ScriptedProvider>) -> Arc<dyn ProviderCall> {
    Arc::clone(provider) as Arc<dyn ProviderCall>
}

/// Persistence double with a fixed write latency.
pub struct ScriptedStore {
    delay: Duration,
    fail: Option<String>,
    pub calls: AtomicUsize,
    pub writes: AtomicUsize,
}

impl ScriptedStore {
    pub fn ok(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            fail: None,
            calls: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            fail: Some(detail.to_string()),
            ..Self::ok(0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PersistenceCall for ScriptedStore {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn persist<'a>(
        &'a self,
        _record: &'a NormalizedRecord,
        deadline: Deadline,
    ) -> BoxFuture<'a, Outcome<()>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if deadline.is_elapsed() {
                return Outcome::Failure(Failure::timeout("elapsed before write"));
            }
            tokio::time::sleep(self.delay).await;
            if let Some(detail) = &self.fail {
                return Outcome::Failure(Failure::storage(detail.clone()));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            Outcome::Success(())
        }
        .boxed()
    }
}

/// Poll `check` until it holds or `limit` passes.
pub async fn eventually<F: Fn() -> bool>(limit: Duration, check: F) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// `f` produces `(status, json body)` for every request.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        read_request_head(&mut socket).await;
                        let (status, body) = f().await;
                        let reason = StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");
                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Backend that always answers `status` with `body`.
pub async fn start_fixed_backend(status: u16, body: &'static str) -> SocketAddr {
    start_programmable_backend(move || async move { (status, body.to_string()) }).await
}

/// Address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    return;
                }
            }
        }
    }
}
