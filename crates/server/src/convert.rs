//! Mapping between engine values and wire types.

use api_types::{
    graph::{LinkView, NodeView},
    state::{ItemView, Period},
};
use engine::{CashflowItem, Currency, FlowLink, FlowNode, MoneyCents};

pub(crate) fn currency(currency: Currency) -> api_types::Currency {
    match currency {
        Currency::Usd => api_types::Currency::Usd,
        Currency::Eur => api_types::Currency::Eur,
    }
}

pub(crate) fn period(period: Period) -> engine::Period {
    match period {
        Period::Annual => engine::Period::Annual,
        Period::Monthly => engine::Period::Monthly,
    }
}

pub(crate) fn item_view(item: &CashflowItem, currency: Currency) -> ItemView {
    ItemView {
        id: item.id.clone(),
        name: item.name.clone(),
        amount_minor: item.amount.cents(),
        amount_display: Some(item.amount.format(currency)),
        color: item.color.clone(),
    }
}

/// Display fields sent back by clients are ignored.
pub(crate) fn item_from_view(view: ItemView) -> CashflowItem {
    CashflowItem {
        id: view.id,
        name: view.name,
        amount: MoneyCents::new(view.amount_minor),
        color: view.color,
    }
}

pub(crate) fn node_view(node: &FlowNode, currency: Currency) -> NodeView {
    NodeView {
        name: node.name.clone(),
        display_name: node.display_name.clone(),
        value_minor: node.value.cents(),
        value_display: node.value.format(currency),
        percentage: node.percentage,
        category: node.category.as_str().to_string(),
        color: node.color.clone(),
        item_id: node.item_id.clone(),
    }
}

pub(crate) fn link_view(link: &FlowLink) -> LinkView {
    LinkView {
        source: link.source,
        target: link.target,
        value_minor: link.value.cents(),
    }
}
