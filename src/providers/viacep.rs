//! ViaCEP lookup (`GET {base}/{cep}/json`).
//!
//! ViaCEP answers unknown CEPs with `200 {"erro": true}`, which is mapped
//! to `NotFound`.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Client;
use serde::Deserialize;

use crate::coordination::{CallContext, ErrorKind, Failure, Outcome, ProviderId};
use crate::providers::http::{get_json, join_url};
use crate::providers::{cep, ProviderCall};
use crate::record::{Address, NormalizedRecord};

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    erro: bool,
}

/// ViaCEP has sent the flag both as a bool and as the string "true".
fn lenient_flag<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(text) => text.eq_ignore_ascii_case("true"),
    })
}

impl From<ViaCepResponse> for Address {
    fn from(body: ViaCepResponse) -> Self {
        Address {
            cep: body.cep,
            street: body.logradouro,
            neighborhood: body.bairro,
            city: body.localidade,
            state: body.uf,
        }
    }
}

/// ViaCEP address provider.
#[derive(Debug, Clone)]
pub struct ViaCep {
    client: Client,
    base_url: String,
}

impl ViaCep {
    pub const ID: ProviderId = ProviderId("ViaCEP");

    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn lookup(&self, key: &str, ctx: &CallContext) -> Result<NormalizedRecord, Failure> {
        let cep = cep::normalize_for(Self::ID, key)?;
        let url = join_url(&self.base_url, &format!("{}/json", cep));
        let body: ViaCepResponse = get_json(&self.client, Self::ID, &url, ctx).await?;
        if body.erro {
            return Err(Failure::new(ErrorKind::NotFound, format!("CEP {} not found", cep))
                .from_provider(Self::ID));
        }
        Ok(NormalizedRecord::address(Self::ID, body.into()))
    }
}

impl ProviderCall for ViaCep {
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
