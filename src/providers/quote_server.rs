//! Client-side provider reading `{"bid": "..."}` from our own quote server.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Client;

use crate::coordination::{CallContext, ErrorKind, Failure, Outcome, ProviderId};
use crate::providers::http::get_json;
use crate::providers::ProviderCall;
use crate::record::{NormalizedRecord, Quote};

/// Fetches the latest quote from a running quote server. The key is unused.
#[derive(Debug, Clone)]
pub struct QuoteServer {
    client: Client,
    url: String,
}

impl QuoteServer {
    pub const ID: ProviderId = ProviderId("QuoteServer");

    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn latest(&self, ctx: &CallContext) -> Result<NormalizedRecord, Failure> {
        let quote: Quote = get_json(&self.client, Self::ID, &self.url, ctx).await?;
        if quote.bid.trim().is_empty() {
            return Err(Failure::new(ErrorKind::MalformedResponse, "bid was not filled in")
                .from_provider(Self::ID));
        }
        tracing::debug!(bid = %quote.bid, "Quote server responded");
        Ok(NormalizedRecord::quote(Self::ID, quote))
    }
}

impl ProviderCall for QuoteServer {
    fn id(&self) -> ProviderId {
        Self::ID
    }

    fn fetch<'a>(
        &'a self,
        _key: &'a str,
        ctx: &'a CallContext,
    ) -> BoxFuture<'a, Outcome<NormalizedRecord>> {
        async move { Outcome::from(self.latest(ctx).await) }.boxed()
    }
}
