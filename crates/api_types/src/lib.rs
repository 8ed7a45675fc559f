use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
}

pub mod state {
    use super::*;

    /// Period an amount was entered for; monthly amounts are stored ×12.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Period {
        #[default]
        Annual,
        Monthly,
    }

    /// Query string shared by every state-bearing route.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TokenQuery {
        /// State token, as found in the page address.
        pub data: Option<String>,
    }

    /// A line item as exchanged with editors.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: String,
        pub name: String,
        /// Annual amount in minor units.
        pub amount_minor: i64,
        /// Annual amount formatted for display.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount_display: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<String>,
    }

    /// Request body for adding one item from raw form input.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub name: String,
        /// Decimal text as typed (`"500"`, `"12,50"`).
        pub amount: String,
        #[serde(default)]
        pub period: Period,
    }

    /// Request body replacing a whole list.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemsReplace {
        pub items: Vec<ItemView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StateResponse {
        /// `"token"` when the address carried a usable state, else `"seed"`.
        pub source: String,
        pub incomes: Vec<ItemView>,
        pub expenses: Vec<ItemView>,
        pub token: String,
    }

    /// Returned after every change: the address to replace the current one with.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenResponse {
        pub token: String,
        pub url: String,
    }
}

pub mod graph {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NodeView {
        pub name: String,
        pub display_name: String,
        pub value_minor: i64,
        pub value_display: String,
        /// Share of total income, unrounded.
        pub percentage: f64,
        /// One of `income`, `budget`, `expense`, `surplus`, `deficit`.
        pub category: String,
        pub color: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub item_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkView {
        pub source: usize,
        pub target: usize,
        pub value_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GraphResponse {
        pub currency: Currency,
        pub nodes: Vec<NodeView>,
        pub links: Vec<LinkView>,
    }
}

pub mod summary {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub currency: Currency,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub balance_minor: i64,
        /// `Annual Surplus` or `Annual Deficit`.
        pub balance_label: String,
        pub total_income_display: String,
        pub total_expense_display: String,
        /// Absolute balance, formatted.
        pub balance_display: String,
    }
}
