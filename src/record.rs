//! Provider-agnostic records.
//!
//! Every provider normalizes its own response schema into one of these
//! shapes and tags it with its identity.

use serde::{Deserialize, Serialize};

use crate::coordination::ProviderId;

/// A postal address resolved from a CEP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub cep: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// An exchange-rate quote. `bid` is kept as the provider's decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: String,
}

/// Payload of a normalized record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RecordData {
    Address(Address),
    Quote(Quote),
}

/// Immutable result of a successful provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    source: ProviderId,
    #[serde(flatten)]
    data: RecordData,
}

impl NormalizedRecord {
    pub fn new(source: ProviderId, data: RecordData) -> Self {
        Self { source, data }
    }

    pub fn address(source: ProviderId, address: Address) -> Self {
        Self::new(source, RecordData::Address(address))
    }

    pub fn quote(source: ProviderId, quote: Quote) -> Self {
        Self::new(source, RecordData::Quote(quote))
    }

    /// The provider that produced this record.
    pub fn source(&self) -> ProviderId {
        self.source
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn as_address(&self) -> Option<&Address> {
        match &self.data {
            RecordData::Address(address) => Some(address),
            RecordData::Quote(_) => None,
        }
    }

    pub fn as_quote(&self) -> Option<&Quote> {
        match &self.data {
            RecordData::Quote(quote) => Some(quote),
            RecordData::Address(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_source_tag() {
        let record = NormalizedRecord::quote(
            ProviderId("AwesomeAPI"),
            Quote { bid: "5.4321".into() },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["source"], "AwesomeAPI");
        assert_eq!(json["kind"], "quote");
        assert_eq!(json["data"]["bid"], "5.4321");
    }

    #[test]
    fn test_accessors_match_payload() {
        let record = NormalizedRecord::address(
            ProviderId("ViaCEP"),
            Address {
                cep: "01001-000".into(),
                street: "Praça da Sé".into(),
                neighborhood: "Sé".into(),
                city: "São Paulo".into(),
                state: "SP".into(),
            },
        );
        assert_eq!(record.source(), ProviderId("ViaCEP"));
        assert!(record.as_quote().is_none());
        assert_eq!(record.as_address().map(|a| a.state.as_str()), Some("SP"));
    }
}
