//! State codec: [`AppState`] ⇄ a token that fits in a URL query value.
//!
//! A token is the compact JSON form of the state, base64-encoded with the
//! URL-safe alphabet and no padding, so it only ever contains
//! `[A-Za-z0-9_-]`.
//!
//! Decoding treats the token as untrusted input. It is parsed into a
//! generic JSON value first and the state is rebuilt field by field:
//! missing lists become empty, unusable items are dropped, and anything
//! that is not a JSON object at all is reported as [`Decoded::Malformed`].
use std::collections::HashSet;

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Map, Value};

use crate::{AppState, CashflowItem, MoneyCents, ResultEngine, util};

const CONFIG: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const TOKEN: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, CONFIG);

/// Tokens produced before the URL-safe alphabet was adopted.
const LEGACY_TOKEN: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, CONFIG);

/// Outcome of reading a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    State(AppState),
    /// No token at all.
    Missing,
    /// A token that is not a state, with the reason.
    Malformed(String),
}

impl Decoded {
    pub fn into_state(self) -> Option<AppState> {
        match self {
            Decoded::State(state) => Some(state),
            Decoded::Missing | Decoded::Malformed(_) => None,
        }
    }
}

/// Encodes `state` into a URL-safe token.
///
/// ```rust
/// use engine::{AppState, codec};
///
/// let token = codec::encode(&AppState::default()).unwrap();
/// assert_eq!(codec::decode(&token), Some(AppState::default()));
/// ```
pub fn encode(state: &AppState) -> ResultEngine<String> {
    let json = serde_json::to_vec(state)?;
    Ok(TOKEN.encode(json))
}

/// Decodes a token, `None` when it is missing or malformed.
pub fn decode(token: &str) -> Option<AppState> {
    decode_token(token).into_state()
}

/// Decodes a token, telling a missing token apart from a malformed one.
pub fn decode_token(token: &str) -> Decoded {
    let token = token.trim();
    if token.is_empty() {
        return Decoded::Missing;
    }

    let bytes = match TOKEN
        .decode(token)
        .or_else(|_| LEGACY_TOKEN.decode(token))
    {
        Ok(bytes) => bytes,
        Err(err) => return malformed(format!("invalid base64: {err}")),
    };

    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(err) => return malformed(format!("invalid json: {err}")),
    };

    let Value::Object(mut fields) = value else {
        return malformed("state is not an object".to_string());
    };

    Decoded::State(AppState {
        incomes: recover_list(fields.remove("incomes"), "incomes"),
        expenses: recover_list(fields.remove("expenses"), "expenses"),
    })
}

fn malformed(reason: String) -> Decoded {
    tracing::debug!("discarding state token: {reason}");
    Decoded::Malformed(reason)
}

fn recover_list(value: Option<Value>, list: &str) -> Vec<CashflowItem> {
    let entries = match value {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            tracing::warn!("'{list}' is not a list, using an empty one");
            return Vec::new();
        }
        None => return Vec::new(),
    };

    let mut seen = HashSet::with_capacity(entries.len());
    let mut items = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        match recover_item(entry) {
            Ok(item) if seen.insert(item.id.clone()) => items.push(item),
            Ok(item) => {
                tracing::warn!("skipping {list}[{position}]: duplicate id {}", item.id);
            }
            Err(reason) => tracing::warn!("skipping {list}[{position}]: {reason}"),
        }
    }
    items
}

fn recover_item(entry: Value) -> Result<CashflowItem, String> {
    let Value::Object(mut fields) = entry else {
        return Err("not an object".to_string());
    };

    let id = take_string(&mut fields, "id")?;
    let name = take_string(&mut fields, "name")?;
    let amount: MoneyCents = fields
        .remove("amount")
        .ok_or_else(|| "missing amount".to_string())
        .and_then(|value| serde_json::from_value(value).map_err(|err| err.to_string()))?;
    util::check_item_amount(amount)?;
    let color = match fields.remove("color") {
        Some(Value::String(color)) => Some(color),
        _ => None,
    };

    Ok(CashflowItem {
        id,
        name,
        amount,
        color,
    })
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Result<String, String> {
    match fields.remove(key) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(format!("'{key}' is not a string")),
        None => Err(format!("missing '{key}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> String {
        TOKEN.encode(json)
    }

    #[test]
    fn empty_and_garbage_tokens_decode_to_none() {
        assert_eq!(decode_token(""), Decoded::Missing);
        assert_eq!(decode_token("   "), Decoded::Missing);
        assert_eq!(decode(""), None);
        assert_eq!(decode("not-valid-base64-or-json"), None);
        assert_eq!(decode("%%%"), None);
        assert!(matches!(
            decode_token("not-valid-base64-or-json"),
            Decoded::Malformed(_)
        ));
    }

    #[test]
    fn non_object_json_is_malformed() {
        assert!(matches!(decode_token(&raw("[1,2]")), Decoded::Malformed(_)));
        assert!(matches!(decode_token(&raw("null")), Decoded::Malformed(_)));
        assert!(matches!(decode_token(&raw("\"x\"")), Decoded::Malformed(_)));
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let state = decode(&raw(
            r#"{"incomes":[{"id":"a","name":"Salary","amount":100}]}"#,
        ))
        .unwrap();
        assert_eq!(state.incomes.len(), 1);
        assert!(state.expenses.is_empty());

        let state = decode(&raw(r#"{"incomes":"nope","expenses":{}}"#)).unwrap();
        assert!(state.is_empty());

        assert_eq!(decode(&raw("{}")), Some(AppState::default()));
    }

    #[test]
    fn unusable_items_are_dropped() {
        let state = decode(&raw(
            r#"{"incomes":[
                {"id":"a","name":"Salary","amount":100},
                {"id":"b","name":"Zero","amount":0},
                {"id":"c","name":"Negative","amount":-3},
                {"id":"d","name":"Text","amount":"abc"},
                {"id":"f","name":"Huge","amount":10000000000001},
                {"name":"No id","amount":5},
                {"id":"e","amount":5},
                {"id":7,"name":"Numeric id","amount":5},
                42,
                {"id":"a","name":"Duplicate","amount":9}
            ],"expenses":[]}"#,
        ))
        .unwrap();

        assert_eq!(state.incomes.len(), 1);
        assert_eq!(state.incomes[0].name, "Salary");
        assert_eq!(state.incomes[0].amount, MoneyCents::from_major(100));
    }

    #[test]
    fn unknown_fields_are_ignored_and_color_kept() {
        let state = decode(&raw(
            r##"{"incomes":[{"id":"a","name":"Salary","amount":1.5,"color":"#fff","extra":true}],"expenses":[],"version":2}"##,
        ))
        .unwrap();
        assert_eq!(state.incomes[0].color.as_deref(), Some("#fff"));
        assert_eq!(state.incomes[0].amount, MoneyCents::new(150));
    }

    #[test]
    fn padded_and_legacy_alphabet_tokens_are_accepted() {
        let json = r#"{"incomes":[{"id":"?>","name":"ÿ~","amount":1}],"expenses":[]}"#;
        let padded = base64::engine::general_purpose::URL_SAFE.encode(json);
        let legacy = base64::engine::general_purpose::STANDARD.encode(json);

        let expected = decode(&raw(json)).unwrap();
        assert_eq!(decode(&padded), Some(expected.clone()));
        assert_eq!(decode(&legacy), Some(expected));
    }

    #[test]
    fn token_alphabet_is_query_safe() {
        let state = AppState {
            incomes: vec![CashflowItem::new("🏡 Housing & Rent = #1 ?", MoneyCents::new(1))],
            expenses: vec![],
        };
        let token = encode(&state).unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
