//! Application state: the two item lists, and the seed used on a first visit.

use serde::{Deserialize, Serialize};

use crate::{CashflowItem, MoneyCents};

/// Everything a session needs to redraw: incomes and expenses, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub incomes: Vec<CashflowItem>,
    #[serde(default)]
    pub expenses: Vec<CashflowItem>,
}

impl AppState {
    pub fn new(incomes: Vec<CashflowItem>, expenses: Vec<CashflowItem>) -> Self {
        Self { incomes, expenses }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incomes.is_empty() && self.expenses.is_empty()
    }
}

/// Illustrative defaults shown when the address carries no usable state.
///
/// Ids are random, so two seeds differ only by id.
pub fn seed_state() -> AppState {
    let item = |name: &str, units: i64| CashflowItem::new(name, MoneyCents::from_major(units));

    AppState {
        incomes: vec![item("Salary", 5000), item("Side Hustle", 1000)],
        expenses: vec![
            item("Housing", 1800),
            item("Food", 600),
            item("Transportation", 400),
            item("Utilities", 300),
        ],
    }
}
