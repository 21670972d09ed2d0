//! BrasilAPI CEP lookup (`GET {base}/{cep}`).

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Client;
use serde::Deserialize;

use crate::coordination::{CallContext, Failure, Outcome, ProviderId};
use crate::providers::http::{get_json, join_url};
use crate::providers::{cep, ProviderCall};
use crate::record::{Address, NormalizedRecord};

#[derive(Debug, Deserialize)]
struct BrasilApiResponse {
    cep: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    neighborhood: String,
    #[serde(default)]
    street: String,
}

impl From<BrasilApiResponse> for Address {
    fn from(body: BrasilApiResponse) -> Self {
        Address {
            cep: body.cep,
            street: body.street,
            neighborhood: body.neighborhood,
            city: body.city,
            state: body.state,
        }
    }
}

/// BrasilAPI address provider.
#[derive(Debug, Clone)]
pub struct BrasilApi {
    client: Client,
    base_url: String,
}

impl BrasilApi {
    pub const ID: ProviderId = ProviderId("BrasilAPI");

    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn lookup(&self, key: &str, ctx: &CallContext) -> Result<NormalizedRecord, Failure> {
        let cep = cep::normalize_for(Self::ID, key)?;
        let url = join_url(&self.base_url, &cep);
        let body: BrasilApiResponse = get_json(&self.client, Self::ID, &url, ctx).await?;
        Ok(NormalizedRecord::address(Self::ID, body.into()))
    }
}

impl ProviderCall for BrasilApi {
    fn id(&self) -> ProviderId {
        Self::ID
    }

    fn fetch<'a>(
        &'a self,
        key: &'a str,
        ctx: &'a CallContext,
    ) -> BoxFuture<'a, Outcome<NormalizedRecord>> {
        async move { Outcome::from(self.lookup(key, ctx).await) }.boxed()
    }
}
