use std::fs;
use std::path::Path;

use crate::domain::address::normalize_address;
use crate::domain::token::{parse_chain_id, NumberOrString};
use crate::domain::Token;
use crate::services::errors::PersistenceError;

/// Loads requested tokens from either a JSON array of token records or a TSV
/// file of `address<TAB>chainId` lines. Requests carry no metadata unless the
/// JSON records provide it.
pub fn load_token_requests(path: impl AsRef<Path>) -> Result<Vec<Token>, PersistenceError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|err| PersistenceError::Read(display.clone(), err.to_string()))?;

    if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
        return serde_json::from_str(&content).map_err(|err| PersistenceError::Parse(display, err.to_string()));
    }

    parse_tsv(&content).map_err(|err| PersistenceError::Parse(display, err))
}

fn parse_tsv(content: &str) -> Result<Vec<Token>, String> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let mut columns = line.split('\t');
            let address = columns.next().unwrap_or_default();
            let chain_id = columns.next().map(|c| NumberOrString::Text(c.to_string()));

            let address = normalize_address(address).map_err(|err| format!("line {}: {err}", index + 1))?;
            let chain_id = parse_chain_id(chain_id).map_err(|err| format!("line {}: {err}", index + 1))?;

            Ok(Token::unresolved(chain_id, address))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tsv() {
        let tokens = parse_tsv(
            "0x6b175474e89094c44da98b954eedeac495271d0f\t1\n\n0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d\t56\r\n",
        )
        .unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].chain_id, 1);
        assert_eq!(tokens[1].chain_id, 56);
        assert!(tokens.iter().all(Token::is_missing_metadata));
    }

    #[test]
    fn test_parse_tsv_reports_line() {
        let err = parse_tsv("0x6b175474e89094c44da98b954eedeac495271d0f\t1\nnope\t1").unwrap_err();
        assert!(err.starts_with("line 2"), "{err}");

        let err = parse_tsv("0x6b175474e89094c44da98b954eedeac495271d0f").unwrap_err();
        assert!(err.starts_with("line 1"), "{err}");
    }

    #[test]
    fn test_load_json_requests() {
        let path = std::env::temp_dir().join(format!("token-lists-requests-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"[{"chainId": 1, "address": "0x6b175474e89094c44da98b954eedeac495271d0f", "symbol": "DAI", "name": "Dai", "decimals": 18}]"#,
        )
        .unwrap();

        let tokens = load_token_requests(&path).unwrap();

        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_complete());
        fs::remove_file(&path).unwrap();
    }
}
