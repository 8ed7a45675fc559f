//! Internal helpers for item validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so the graph builder, the session and the editor boundary
//! enforce the same invariants.

use std::collections::HashSet;

use crate::{CashflowItem, EngineError, MoneyCents, ResultEngine};

/// Trim an item name and reject it when nothing is left.
pub(crate) fn normalize_name(name: &str) -> ResultEngine<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidItem("name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Item amounts lie in `(0, MoneyCents::MAX_ITEM]`: a zero-valued node would
/// break the flow layout, a larger one would not survive a state token.
pub(crate) fn check_item_amount(amount: MoneyCents) -> Result<(), String> {
    if !amount.is_positive() {
        return Err(format!("amount must be > 0, got {amount}"));
    }
    if amount > MoneyCents::MAX_ITEM {
        return Err(format!(
            "amount must be at most {}, got {amount}",
            MoneyCents::MAX_ITEM
        ));
    }
    Ok(())
}

pub(crate) fn ensure_item_amount(item: &CashflowItem) -> ResultEngine<()> {
    check_item_amount(item.amount)
        .map_err(|reason| EngineError::InvalidAmount(format!("'{}': {reason}", item.name)))
}

/// Reject the second occurrence of an id inside one list.
pub(crate) fn ensure_unique_id<'a>(
    seen: &mut HashSet<&'a str>,
    item: &'a CashflowItem,
) -> ResultEngine<()> {
    if !seen.insert(item.id.as_str()) {
        return Err(EngineError::ExistingKey(item.id.clone()));
    }
    Ok(())
}
