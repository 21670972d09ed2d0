//! Bounded JSON GET shared by every HTTP provider.

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::coordination::{CallContext, ErrorKind, Failure, ProviderId};

/// GET `url` and decode the body as `T`, within the context's deadline.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: ProviderId,
    url: &str,
    ctx: &CallContext,
) -> Result<T, Failure> {
    if ctx.is_done() {
        return Err(ctx.expired(provider));
    }

    let request = client
        .get(url)
        .timeout(ctx.deadline().remaining())
        .build()
        .map_err(|e| Failure::new(ErrorKind::InvalidRequest, e.to_string()).from_provider(provider))?;

    tracing::trace!(provider = %provider, url = %url, "Sending upstream request");

    let response = client
        .execute(request)
        .await
        .map_err(|e| transport_failure(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Failure::new(
            ErrorKind::RemoteRejected(status.as_u16()),
            format!("status code {}", status.as_u16()),
        )
        .from_provider(provider));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_failure(provider, e))?;

    serde_json::from_slice(&body)
        .map_err(|e| Failure::new(ErrorKind::MalformedResponse, e.to_string()).from_provider(provider))
}

fn transport_failure(provider: ProviderId, error: reqwest::Error) -> Failure {
    let kind = if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_builder() {
        ErrorKind::InvalidRequest
    } else if error.is_decode() {
        ErrorKind::MalformedResponse
    } else {
        ErrorKind::Unreachable
    };
    Failure::new(kind, error.to_string()).from_provider(provider)
}

/// Join a base URL and a path segment with exactly one slash.
pub fn join_url(base: &str, segment: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), segment.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::Deadline;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://a/ws/", "/01001000"), "http://a/ws/01001000");
        assert_eq!(join_url("http://a/ws", "01001000/json"), "http://a/ws/01001000/json");
    }

    #[tokio::test]
    async fn test_unparseable_url_is_invalid_request() {
        let client = Client::new();
        let ctx = CallContext::with_deadline(Deadline::after_millis(500));
        let result: Result<serde_json::Value, _> =
            get_json(&client, ProviderId("p"), "not a url", &ctx).await;
        let failure = result.unwrap_err();
        assert_eq!(failure.kind(), &ErrorKind::InvalidRequest);
        assert_eq!(failure.provider(), Some(ProviderId("p")));
    }

    #[tokio::test]
    async fn test_elapsed_context_skips_request() {
        let client = Client::new();
        let ctx = CallContext::with_deadline(Deadline::after(std::time::Duration::ZERO));
        let result: Result<serde_json::Value, _> =
            get_json(&client, ProviderId("p"), "http://127.0.0.1:9/", &ctx).await;
        assert!(result.unwrap_err().is_timeout());
    }
}
