//! AwesomeAPI exchange quote (`GET {url}`, body keyed by currency pair).

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Client;
use serde::Deserialize;

use crate::coordination::{CallContext, ErrorKind, Failure, Outcome, ProviderId};
use crate::providers::http::get_json;
use crate::providers::ProviderCall;
use crate::record::{NormalizedRecord, Quote};

#[derive(Debug, Deserialize)]
struct PairQuote {
    bid: String,
}

/// Quote provider for one configured endpoint; the fetch key is the pair
/// name the body is keyed by (e.g. `USDBRL`).
#[derive(Debug, Clone)]
pub struct AwesomeApi {
    client: Client,
    url: String,
}

impl AwesomeApi {
    pub const ID: ProviderId = ProviderId("AwesomeAPI");

    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn quote(&self, pair: &str, ctx: &CallContext) -> Result<NormalizedRecord, Failure> {
        let mut body: HashMap<String, PairQuote> =
            get_json(&self.client, Self::ID, &self.url, ctx).await?;
        let quote = body.remove(pair).ok_or_else(|| {
            Failure::new(ErrorKind::MalformedResponse, format!("pair {} missing from response", pair))
                .from_provider(Self::ID)
        })?;
        if quote.bid.trim().is_empty() {
            return Err(Failure::new(ErrorKind::MalformedResponse, "empty bid").from_provider(Self::ID));
        }
        Ok(NormalizedRecord::quote(Self::ID, Quote { bid: quote.bid }))
    }
}

impl ProviderCall for AwesomeApi {
    fn id(&self) -> ProviderId {
        Self::ID
    }

    fn fetch<'a>(
        &'a self,
        key: &'a str,
        ctx: &'a CallContext,
    ) -> BoxFuture<'a, Outcome<NormalizedRecord>> {
        async move { Outcome::from(self.quote(key, ctx).await) }.boxed()
    }
}
