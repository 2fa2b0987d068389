use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::domain::TokenList;
use crate::services::errors::ValidationError;

/// Checks a serialized token list document against a schema.
pub trait SchemaValidator {
    /// Returns every violation found, or `Ok` for a conforming document.
    fn validate(&self, document: &Value) -> Result<(), Vec<String>>;
}

/// Rules of the standard token list JSON schema (tokenlists.org), plus the
/// `(chainId, address)` uniqueness every consumer relies on.
pub struct TokenListSchema;

const LIST_KEYS: [&str; 8] = ["name", "timestamp", "version", "tokens", "keywords", "tags", "logoURI", "tokenMap"];
const TOKEN_KEYS: [&str; 8] = ["chainId", "address", "decimals", "name", "symbol", "logoURI", "tags", "extensions"];
const MAX_TOKENS: usize = 10_000;

impl SchemaValidator for TokenListSchema {
    fn validate(&self, document: &Value) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let Some(list) = document.as_object() else {
            return Err(vec!["document is not an object".to_string()]);
        };

        check_unknown_keys("list", list, &LIST_KEYS, &mut errors);

        match list.get("name").and_then(Value::as_str) {
            Some(name) if is_list_label(name, 30) => {}
            _ => errors.push("name must be 1-30 word characters or spaces".to_string()),
        }

        match list.get("timestamp").and_then(Value::as_str) {
            Some(ts) if chrono::DateTime::parse_from_rfc3339(ts).is_ok() => {}
            _ => errors.push("timestamp must be an RFC 3339 date-time".to_string()),
        }

        check_version(list.get("version"), &mut errors);

        if let Some(uri) = list.get("logoURI") {
            if !is_uri(uri) {
                errors.push("logoURI must be a URI".to_string());
            }
        }

        if let Some(keywords) = list.get("keywords") {
            check_keywords(keywords, &mut errors);
        }

        if let Some(tags) = list.get("tags") {
            if !tags.is_object() {
                errors.push("tags must be an object".to_string());
            }
        }

        match list.get("tokens").and_then(Value::as_array) {
            Some(tokens) if (1..=MAX_TOKENS).contains(&tokens.len()) => {
                let mut seen = HashSet::new();
                for (index, token) in tokens.iter().enumerate() {
                    check_token(index, token, &mut seen, &mut errors);
                }
            }
            Some(tokens) => errors.push(format!("tokens must hold 1-{MAX_TOKENS} entries, got {}", tokens.len())),
            None => errors.push("tokens must be an array".to_string()),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Pre-write gate: a list that fails validation is never published.
pub fn validate_list<V: SchemaValidator>(validator: &V, list: &TokenList) -> Result<(), ValidationError> {
    let document = serde_json::to_value(list)
        .map_err(|err| ValidationError::SchemaValidationFailed(list.name.clone(), vec![err.to_string()]))?;

    validator.validate(&document).map_err(|errors| {
        tracing::error!(list = %list.name, errors = errors.len(), "token list failed schema validation");
        ValidationError::SchemaValidationFailed(list.name.clone(), errors)
    })
}

fn check_unknown_keys(scope: &str, object: &Map<String, Value>, allowed: &[&str], errors: &mut Vec<String>) {
    for key in object.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(format!("{scope}: unexpected property {key}"));
        }
    }
}

fn check_version(version: Option<&Value>, errors: &mut Vec<String>) {
    let Some(version) = version.and_then(Value::as_object) else {
        errors.push("version must be an object".to_string());
        return;
    };

    for part in ["major", "minor", "patch"] {
        if version.get(part).and_then(Value::as_u64).is_none() {
            errors.push(format!("version.{part} must be a non-negative integer"));
        }
    }
}

fn check_keywords(keywords: &Value, errors: &mut Vec<String>) {
    let Some(keywords) = keywords.as_array() else {
        errors.push("keywords must be an array".to_string());
        return;
    };

    if keywords.len() > 20 {
        errors.push("keywords must hold at most 20 entries".to_string());
    }

    let mut seen = HashSet::new();
    for keyword in keywords {
        match keyword.as_str() {
            Some(k) if is_list_label(k, 20) => {
                if !seen.insert(k) {
                    errors.push(format!("duplicate keyword {k}"));
                }
            }
            _ => errors.push(format!("invalid keyword {keyword}")),
        }
    }
}

fn check_token(index: usize, token: &Value, seen: &mut HashSet<(u64, String)>, errors: &mut Vec<String>) {
    let Some(token) = token.as_object() else {
        errors.push(format!("tokens[{index}] is not an object"));
        return;
    };
    let scope = format!("tokens[{index}]");

    check_unknown_keys(&scope, token, &TOKEN_KEYS, errors);

    let chain_id = token.get("chainId").and_then(Value::as_u64).filter(|id| *id >= 1);
    if chain_id.is_none() {
        errors.push(format!("{scope}.chainId must be a positive integer"));
    }

    let address = token.get("address").and_then(Value::as_str).filter(|a| is_hex_address(a));
    if address.is_none() {
        errors.push(format!("{scope}.address must match ^0x[a-fA-F0-9]{{40}}$"));
    }

    if let (Some(chain_id), Some(address)) = (chain_id, address) {
        if !seen.insert((chain_id, address.to_lowercase())) {
            errors.push(format!("{scope}: duplicate token {address} on chain {chain_id}"));
        }
    }

    if token.get("decimals").and_then(Value::as_u64).filter(|d| *d <= 255).is_none() {
        errors.push(format!("{scope}.decimals must be an integer in 0-255"));
    }

    match token.get("symbol").and_then(Value::as_str) {
        Some(symbol) if (1..=20).contains(&symbol.chars().count()) && !symbol.chars().any(char::is_whitespace) => {}
        _ => errors.push(format!("{scope}.symbol must be 1-20 non-whitespace characters")),
    }

    match token.get("name").and_then(Value::as_str) {
        Some(name)
            if (1..=60).contains(&name.chars().count())
                && !name.trim().is_empty()
                && name.chars().all(|c| c == ' ' || !c.is_whitespace()) => {}
        _ => errors.push(format!("{scope}.name must be 1-60 characters without line breaks")),
    }

    if let Some(uri) = token.get("logoURI") {
        if !is_uri(uri) {
            errors.push(format!("{scope}.logoURI must be a URI"));
        }
    }
}

fn is_list_label(value: &str, max_len: usize) -> bool {
    let len = value.chars().count();
    len >= 1 && len <= max_len && value.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ' ')
}

fn is_hex_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_uri(value: &Value) -> bool {
    value.as_str().is_some_and(|uri| reqwest::Url::parse(uri).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_list() -> Value {
        json!({
            "name": "ParaSwap Community Token Lists",
            "timestamp": "2024-01-01T00:00:00.000Z",
            "version": {"major": 1, "minor": 4, "patch": 0},
            "tags": {},
            "logoURI": "https://example.org/logo.svg",
            "keywords": ["ParaSwap", "Token Lists"],
            "tokens": [
                {
                    "chainId": 1,
                    "address": "0x6B175474E89094C44Da98b954EedeAC495271d0F",
                    "symbol": "DAI",
                    "name": "Dai Stablecoin",
                    "decimals": 18,
                    "logoURI": "ipfs://QmNa8mQkrNKp1WEEeGjFezDmDeodkWRevGFN8JCV7b4Xir"
                }
            ]
        })
    }

    #[test]
    fn test_valid_list_passes() {
        assert_eq!(TokenListSchema.validate(&valid_list()), Ok(()));
    }

    #[test]
    fn test_token_violations_reported() {
        let mut list = valid_list();
        list["tokens"][0]["symbol"] = json!("");
        list["tokens"][0]["decimals"] = json!(256);
        list["tokens"][0]["address"] = json!("0x1234");
        list["tokens"][0]["extra"] = json!(true);

        let errors = TokenListSchema.validate(&list).unwrap_err();

        assert_eq!(errors.len(), 4, "{errors:?}");
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let mut list = valid_list();
        let mut duplicate = list["tokens"][0].clone();
        duplicate["address"] = json!("0x6b175474e89094c44da98b954eedeac495271d0f");
        list["tokens"].as_array_mut().unwrap().push(duplicate);

        let errors = TokenListSchema.validate(&list).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("duplicate token"));
    }

    #[test]
    fn test_list_level_violations() {
        let mut list = valid_list();
        list["name"] = json!("Name with a dash - not allowed");
        list["timestamp"] = json!("yesterday");
        list["keywords"] = json!(["dup", "dup"]);
        list["tokens"] = json!([]);

        let errors = TokenListSchema.validate(&list).unwrap_err();

        assert_eq!(errors.len(), 4, "{errors:?}");
    }
}
