//! One-shot commands. Each returns the text to print so `main` owns stdout.

use std::{fs, io::Read, path::Path};

use engine::{
    AppState, Decoded,
    address::{resolve_token, share_url, token_from_url},
    codec, graph,
    items::validate_items,
    seed_state,
};
use serde::de;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};

/// Accepts either a bare token or a full share URL.
pub fn token_of(input: &str) -> String {
    let input = input.trim();
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            token_from_url(&url).unwrap_or_default()
        }
        _ => input.to_string(),
    }
}

/// Flow graph JSON for the state in `input`, seed data when unusable.
pub fn graph(input: &str) -> Result<String> {
    let token = token_of(input);
    let (state, source) = resolve_token(Some(token.as_str()), seed_state);
    tracing::debug!(source = source.as_str(), "building graph");

    let graph = graph::build(&state.incomes, &state.expenses)?;
    Ok(serde_json::to_string_pretty(&graph)?)
}

/// Token for an `AppState` JSON document, which must be an object.
pub fn encode(json: &str) -> Result<String> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(AppError::Json(de::Error::custom(
            "expected an object with `incomes` and `expenses`",
        )));
    }
    let state: AppState = serde_json::from_value(value)?;
    validate_items(&state.incomes)?;
    validate_items(&state.expenses)?;
    Ok(codec::encode(&state)?)
}

/// Reads the document from `file`, or stdin when absent.
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Pretty JSON of the state in `input`; an error when it cannot be read.
pub fn decode(input: &str) -> Result<String> {
    match codec::decode_token(&token_of(input)) {
        Decoded::State(state) => Ok(serde_json::to_string_pretty(&state)?),
        Decoded::Missing => Err(AppError::Token("no token given".to_string())),
        Decoded::Malformed(reason) => Err(AppError::Token(reason)),
    }
}

/// Share URL of a fresh seed state.
pub fn seed(public_url: &Url) -> Result<String> {
    Ok(share_url(public_url, &seed_state())?.to_string())
}

#[cfg(test)]
mod tests {
    use engine::{CashflowItem, MoneyCents};

    use super::*;

    fn sample() -> AppState {
        AppState::new(
            vec![CashflowItem::new("Salary", MoneyCents::from_major(54132))],
            vec![CashflowItem::new("Rent", MoneyCents::from_major(18792))],
        )
    }

    #[test]
    fn token_of_accepts_urls_and_bare_tokens() {
        assert_eq!(token_of(" abc "), "abc");
        assert_eq!(token_of("https://cashkey.app/?x=1&data=abc"), "abc");
        assert_eq!(token_of("https://cashkey.app/"), "");
    }

    #[test]
    fn encode_then_decode() {
        let state = sample();
        let json = serde_json::to_string(&state).unwrap();
        let token = encode(&json).unwrap();
        let decoded: AppState = serde_json::from_str(&decode(&token).unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn encode_rejects_invalid_items() {
        let json = r#"{"incomes":[{"id":"a","name":"Zero","amount":0}],"expenses":[]}"#;
        assert!(matches!(encode(json), Err(AppError::Engine(_))));
    }

    #[test]
    fn encode_rejects_documents_that_are_not_objects() {
        assert!(matches!(encode("[]"), Err(AppError::Json(_))));
        assert!(matches!(encode("null"), Err(AppError::Json(_))));
        assert!(matches!(encode("{"), Err(AppError::Json(_))));
        assert!(encode("{}").is_ok());
    }

    #[test]
    fn decode_reports_bad_tokens() {
        assert!(matches!(decode(""), Err(AppError::Token(_))));
        assert!(matches!(
            decode("not-valid-base64-or-json"),
            Err(AppError::Token(_))
        ));
    }

    #[test]
    fn graph_falls_back_to_seed() {
        let json: serde_json::Value = serde_json::from_str(&graph("garbage!").unwrap()).unwrap();
        assert_eq!(json["nodes"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn seed_url_carries_a_token() {
        let url = Url::parse(&seed(&Url::parse("https://cashkey.app/").unwrap()).unwrap()).unwrap();
        let state = codec::decode(&token_from_url(&url).unwrap()).unwrap();
        assert_eq!(state.incomes.len(), 2);
    }
}
