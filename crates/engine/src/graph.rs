//! Flow-graph builder.
//!
//! Turns the two item lists into the node/link graph consumed by a layered
//! flow-diagram renderer:
//!
//! ```text
//! income_0 ─┐            ┌─> expense_0
//! income_1 ─┼─> Budget ──┼─> expense_1
//!   ...    ─┘            └─> Surplus | Deficit   (only when unbalanced)
//! ```
//!
//! Node order is part of the contract (incomes, Budget, expenses, balance)
//! because the renderer derives the left/right layout from it. Links refer to
//! nodes by index, so indices are taken from the same pass that places the
//! nodes.
use std::collections::HashMap;

use serde::Serialize;

use crate::{CashflowItem, EngineError, MoneyCents, ResultEngine, items::validate_items};

pub const BUDGET_NODE_NAME: &str = "Budget";
pub const SURPLUS_NODE_NAME: &str = "Surplus";
pub const DEFICIT_NODE_NAME: &str = "Deficit";

/// Role of a node in the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Income,
    Budget,
    Expense,
    Surplus,
    Deficit,
}

impl NodeCategory {
    /// Palette color of the category.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            NodeCategory::Income => "#3498db",
            NodeCategory::Expense => "#2ecc71",
            NodeCategory::Budget => "#f1c40f",
            NodeCategory::Surplus => "#9b59b6",
            NodeCategory::Deficit => "#e74c3c",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            NodeCategory::Income => "income",
            NodeCategory::Budget => "budget",
            NodeCategory::Expense => "expense",
            NodeCategory::Surplus => "surplus",
            NodeCategory::Deficit => "deficit",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlowNode {
    pub name: String,
    /// Label hint for the renderer: name and percentage on two lines.
    pub display_name: String,
    pub value: MoneyCents,
    /// Share of total income, unrounded. `0.0` when there is no income.
    pub percentage: f64,
    pub category: NodeCategory,
    pub color: String,
    /// Id of the item the node stands for, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FlowLink {
    /// Index into [`FlowGraph::nodes`].
    pub source: usize,
    /// Index into [`FlowGraph::nodes`].
    pub target: usize,
    pub value: MoneyCents,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

impl FlowGraph {
    /// `true` when there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the Budget node.
    #[must_use]
    pub fn budget_index(&self) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.category == NodeCategory::Budget)
    }

    #[must_use]
    pub fn budget(&self) -> Option<&FlowNode> {
        self.budget_index().map(|index| &self.nodes[index])
    }

    /// The Surplus or Deficit node, present only when totals differ.
    #[must_use]
    pub fn balance_node(&self) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| {
            matches!(
                node.category,
                NodeCategory::Surplus | NodeCategory::Deficit
            )
        })
    }

    /// Sum of the links entering node `index`.
    #[must_use]
    pub fn inflow(&self, index: usize) -> MoneyCents {
        self.links
            .iter()
            .filter(|link| link.target == index)
            .fold(MoneyCents::ZERO, |acc, link| acc + link.value)
    }

    /// Sum of the links leaving node `index`.
    #[must_use]
    pub fn outflow(&self, index: usize) -> MoneyCents {
        self.links
            .iter()
            .filter(|link| link.source == index)
            .fold(MoneyCents::ZERO, |acc, link| acc + link.value)
    }
}

/// Nodes placed so far, with the id lookup the link pass reads from.
struct Layout<'a> {
    nodes: Vec<FlowNode>,
    by_item: HashMap<(NodeCategory, &'a str), usize>,
    total_income: MoneyCents,
}

impl<'a> Layout<'a> {
    fn new(capacity: usize, total_income: MoneyCents) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            by_item: HashMap::with_capacity(capacity),
            total_income,
        }
    }

    fn push(
        &mut self,
        name: &str,
        value: MoneyCents,
        category: NodeCategory,
        color: Option<&str>,
        item_id: Option<&str>,
    ) -> usize {
        let percentage = MoneyCents::ratio_percent(value, self.total_income);
        let display_name = match category {
            NodeCategory::Budget => name.to_string(),
            _ => format!("{name}\n{percentage:.1}%"),
        };
        self.nodes.push(FlowNode {
            name: name.to_string(),
            display_name,
            value,
            percentage,
            category,
            color: color.unwrap_or(category.color()).to_string(),
            item_id: item_id.map(str::to_string),
        });
        self.nodes.len() - 1
    }

    fn push_item(&mut self, category: NodeCategory, item: &'a CashflowItem) -> usize {
        let index = self.push(
            &item.name,
            item.amount,
            category,
            item.color.as_deref(),
            Some(item.id.as_str()),
        );
        self.by_item.insert((category, item.id.as_str()), index);
        index
    }

    fn index_of(&self, category: NodeCategory, item: &CashflowItem) -> ResultEngine<usize> {
        self.by_item
            .get(&(category, item.id.as_str()))
            .copied()
            .ok_or_else(|| EngineError::KeyNotFound(item.id.clone()))
    }
}

fn total(items: &[CashflowItem]) -> ResultEngine<MoneyCents> {
    MoneyCents::checked_sum(items.iter().map(|item| item.amount))
        .ok_or_else(|| EngineError::InvalidAmount("total amount too large".to_string()))
}

/// Builds the flow graph for the given annualized items.
///
/// Both lists empty yields an empty graph. Items must have a positive
/// amount and ids unique within their list; otherwise the build is rejected
/// rather than producing zero-valued nodes.
///
/// ```rust
/// use engine::{CashflowItem, MoneyCents, graph};
///
/// let incomes = [CashflowItem::new("Salary", MoneyCents::from_major(6000))];
/// let expenses = [CashflowItem::new("Rent", MoneyCents::from_major(2000))];
/// let graph = graph::build(&incomes, &expenses).unwrap();
///
/// // Salary, Budget, Rent, Surplus
/// assert_eq!(graph.nodes.len(), 4);
/// assert_eq!(graph.balance_node().unwrap().value, MoneyCents::from_major(4000));
/// ```
pub fn build(incomes: &[CashflowItem], expenses: &[CashflowItem]) -> ResultEngine<FlowGraph> {
    if incomes.is_empty() && expenses.is_empty() {
        return Ok(FlowGraph::default());
    }
    validate_items(incomes)?;
    validate_items(expenses)?;

    let total_income = total(incomes)?;
    let total_expense = total(expenses)?;
    let balance = total_income
        .checked_sub(total_expense)
        .ok_or_else(|| EngineError::InvalidAmount("balance out of range".to_string()))?;

    let mut layout = Layout::new(incomes.len() + expenses.len() + 2, total_income);
    for item in incomes {
        layout.push_item(NodeCategory::Income, item);
    }
    let budget = layout.push(
        BUDGET_NODE_NAME,
        total_income,
        NodeCategory::Budget,
        None,
        None,
    );
    for item in expenses {
        layout.push_item(NodeCategory::Expense, item);
    }
    let balance_node = (!balance.is_zero()).then(|| {
        let (name, category) = if balance.is_positive() {
            (SURPLUS_NODE_NAME, NodeCategory::Surplus)
        } else {
            (DEFICIT_NODE_NAME, NodeCategory::Deficit)
        };
        layout.push(name, balance.abs(), category, None, None)
    });

    let mut links = Vec::with_capacity(layout.nodes.len());
    for item in incomes {
        links.push(FlowLink {
            source: layout.index_of(NodeCategory::Income, item)?,
            target: budget,
            value: item.amount,
        });
    }
    for item in expenses {
        links.push(FlowLink {
            source: budget,
            target: layout.index_of(NodeCategory::Expense, item)?,
            value: item.amount,
        });
    }
    if let Some(target) = balance_node {
        links.push(FlowLink {
            source: budget,
            target,
            value: balance.abs(),
        });
    }

    tracing::debug!(
        nodes = layout.nodes.len(),
        links = links.len(),
        balance = %balance,
        "flow graph built"
    );

    Ok(FlowGraph {
        nodes: layout.nodes,
        links,
    })
}
