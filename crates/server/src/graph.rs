//! Graph and totals endpoints.

use api_types::{graph::GraphResponse, state::TokenQuery, summary::SummaryView};
use axum::{
    Json,
    extract::{Query, State},
};

use crate::{ServerError, convert, items::load_session, server::ServerState};

/// Flow graph for the renderer.
pub async fn get_graph(
    State(state): State<ServerState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<GraphResponse>, ServerError> {
    let session = load_session(&state, &query)?;
    let currency = state.config.currency;
    let graph = session.graph()?;

    Ok(Json(GraphResponse {
        currency: convert::currency(currency),
        nodes: graph
            .nodes
            .iter()
            .map(|node| convert::node_view(node, currency))
            .collect(),
        links: graph.links.iter().map(convert::link_view).collect(),
    }))
}

pub async fn get_summary(
    State(state): State<ServerState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<SummaryView>, ServerError> {
    let session = load_session(&state, &query)?;
    let currency = state.config.currency;
    let summary = session.summary()?;

    Ok(Json(SummaryView {
        currency: convert::currency(currency),
        total_income_minor: summary.total_income.cents(),
        total_expense_minor: summary.total_expense.cents(),
        balance_minor: summary.balance.cents(),
        balance_label: summary.balance_label().to_string(),
        total_income_display: summary.total_income.format(currency),
        total_expense_display: summary.total_expense.format(currency),
        balance_display: summary.balance.abs().format(currency),
    }))
}
