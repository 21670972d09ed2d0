//! CEP (Brazilian postal code) key handling.

use crate::coordination::{ErrorKind, Failure, ProviderId};

/// Normalize a CEP to its 8-digit form, accepting `01001-000` or `01001000`.
pub fn normalize(key: &str) -> Result<String, String> {
    let digits = key.trim().replacen('-', "", 1);
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not an 8-digit CEP", key.trim()));
    }
    Ok(digits)
}

/// `normalize`, failing with `InvalidRequest` attributed to `provider`.
pub fn normalize_for(provider: ProviderId, key: &str) -> Result<String, Failure> {
    normalize(key).map_err(|detail| Failure::new(ErrorKind::InvalidRequest, detail).from_provider(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_forms() {
        assert_eq!(normalize("01001000").unwrap(), "01001000");
        assert_eq!(normalize(" 01001-000 ").unwrap(), "01001000");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(normalize("0100-1-000").is_err());
        assert!(normalize("1234567").is_err());
        assert!(normalize("abcdefgh").is_err());
        assert!(normalize("").is_err());
    }

    #[test]
    fn test_failure_carries_provider() {
        let failure = normalize_for(ProviderId("ViaCEP"), "x").unwrap_err();
        assert_eq!(failure.kind(), &ErrorKind::InvalidRequest);
        assert_eq!(failure.provider(), Some(ProviderId("ViaCEP")));
    }
}
