//! Cashflow line items and the editor-boundary rules that produce them.
//!
//! The core only ever sees annualized, strictly positive amounts. Editors
//! turn raw input into items with [`ItemDraft::into_item`] and hand full
//! lists back to the core; the list helpers below never mutate in place.
use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util};

/// A named annual amount on either side of the budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowItem {
    /// Opaque id, stable across edits.
    pub id: String,
    pub name: String,
    /// Annualized amount, always > 0.
    pub amount: MoneyCents,
    /// Overrides the palette color of the item's node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CashflowItem {
    /// Creates an item with a fresh random id.
    pub fn new(name: impl Into<String>, amount: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            amount,
            color: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Period an amount was entered for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Annual,
    Monthly,
}

impl Period {
    const MONTHS_PER_YEAR: i64 = 12;

    /// Converts an amount entered for this period to its annual equivalent.
    pub fn annualize(self, amount: MoneyCents) -> ResultEngine<MoneyCents> {
        match self {
            Period::Annual => Ok(amount),
            Period::Monthly => amount
                .checked_mul(Self::MONTHS_PER_YEAR)
                .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Period::Annual => "annual",
            Period::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "yearly" => Ok(Period::Annual),
            "monthly" => Ok(Period::Monthly),
            other => Err(EngineError::InvalidItem(format!("unknown period: {other}"))),
        }
    }
}

/// Raw add-item form input, before validation.
#[derive(Clone, Debug, Default)]
pub struct ItemDraft {
    pub name: String,
    pub amount: String,
    pub period: Period,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, amount: impl Into<String>, period: Period) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            period,
        }
    }

    /// Validates the draft and builds an annualized item with a fresh id.
    ///
    /// Rejects an empty name and a non-numeric, non-positive or oversized
    /// amount.
    pub fn into_item(self) -> ResultEngine<CashflowItem> {
        let name = util::normalize_name(&self.name)?;
        let amount: MoneyCents = self.amount.parse()?;
        util::check_item_amount(amount).map_err(EngineError::InvalidAmount)?;
        let amount = self.period.annualize(amount)?;
        util::check_item_amount(amount).map_err(EngineError::InvalidAmount)?;

        Ok(CashflowItem::new(name, amount))
    }
}

/// Checks the list invariants: amounts in `(0, MoneyCents::MAX_ITEM]` and ids
/// unique.
pub fn validate_items(items: &[CashflowItem]) -> ResultEngine<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        util::ensure_item_amount(item)?;
        util::ensure_unique_id(&mut seen, item)?;
    }
    Ok(())
}

/// Returns a new list with `item` appended.
pub fn with_item(items: &[CashflowItem], item: CashflowItem) -> ResultEngine<Vec<CashflowItem>> {
    if items.iter().any(|existing| existing.id == item.id) {
        return Err(EngineError::ExistingKey(item.id));
    }
    let mut next = items.to_vec();
    next.push(item);
    Ok(next)
}

/// Returns a new list without the item identified by `id`.
pub fn without_item(items: &[CashflowItem], id: &str) -> ResultEngine<Vec<CashflowItem>> {
    if !items.iter().any(|item| item.id == id) {
        return Err(EngineError::KeyNotFound(id.to_string()));
    }
    Ok(items.iter().filter(|item| item.id != id).cloned().collect())
}

/// Returns a new list where the item sharing `item.id` is replaced in place.
pub fn replace_item(items: &[CashflowItem], item: CashflowItem) -> ResultEngine<Vec<CashflowItem>> {
    let position = items
        .iter()
        .position(|existing| existing.id == item.id)
        .ok_or_else(|| EngineError::KeyNotFound(item.id.clone()))?;
    let mut next = items.to_vec();
    next[position] = item;
    Ok(next)
}
