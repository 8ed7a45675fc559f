//! State and item endpoints.
//!
//! Each request rebuilds a [`Session`] from the token in its query string,
//! applies the change and answers with the address that replaces the
//! current one.

use api_types::state::{ItemNew, ItemsReplace, StateResponse, TokenQuery, TokenResponse};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderName, StatusCode, header},
};
use engine::{
    AddressBar, CashflowItem, ItemDraft, MemoryAddressBar, ResultEngine, Session,
    address::{token_from_url, with_token},
    items::{replace_item, with_item, without_item},
    seed_state,
};
use serde::Deserialize;

use crate::{ServerError, convert, server::ServerState};

type Replaced = (StatusCode, [(HeaderName, String); 1], Json<TokenResponse>);

/// The list a route operates on.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Incomes,
    Expenses,
}

pub(crate) fn load_session(
    state: &ServerState,
    query: &TokenQuery,
) -> Result<Session<MemoryAddressBar>, ServerError> {
    let url = match query.data.as_deref() {
        Some(token) => with_token(&state.config.public_url, token),
        None => state.config.public_url.clone(),
    };
    Ok(Session::load(MemoryAddressBar::new(url), seed_state)?)
}

fn list(session: &Session<MemoryAddressBar>, side: Side) -> &[CashflowItem] {
    match side {
        Side::Incomes => session.incomes(),
        Side::Expenses => session.expenses(),
    }
}

fn update(
    session: &mut Session<MemoryAddressBar>,
    side: Side,
    items: Vec<CashflowItem>,
) -> ResultEngine<()> {
    match side {
        Side::Incomes => session.update_incomes(items),
        Side::Expenses => session.update_expenses(items),
    }
}

fn token_response(session: &Session<MemoryAddressBar>) -> TokenResponse {
    let url = session.address_bar().current();
    TokenResponse {
        token: token_from_url(&url).unwrap_or_default(),
        url: url.to_string(),
    }
}

fn replaced(status: StatusCode, session: &Session<MemoryAddressBar>) -> Replaced {
    let response = token_response(session);
    (status, [(header::LOCATION, response.url.clone())], Json(response))
}

pub async fn get_state(
    State(state): State<ServerState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<StateResponse>, ServerError> {
    let session = load_session(&state, &query)?;
    let currency = state.config.currency;

    Ok(Json(StateResponse {
        source: session.source().as_str().to_string(),
        incomes: session
            .incomes()
            .iter()
            .map(|item| convert::item_view(item, currency))
            .collect(),
        expenses: session
            .expenses()
            .iter()
            .map(|item| convert::item_view(item, currency))
            .collect(),
        token: token_response(&session).token,
    }))
}

/// The address a share button copies to the clipboard.
pub async fn share(
    State(state): State<ServerState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponse>, ServerError> {
    let session = load_session(&state, &query)?;
    Ok(Json(token_response(&session)))
}

/// Replaces a whole list (the editor's `onUpdate*` callback).
pub async fn replace(
    State(state): State<ServerState>,
    Path(side): Path<Side>,
    Query(query): Query<TokenQuery>,
    Json(payload): Json<ItemsReplace>,
) -> Result<Replaced, ServerError> {
    let mut session = load_session(&state, &query)?;
    let items = payload
        .items
        .into_iter()
        .map(convert::item_from_view)
        .collect();

    update(&mut session, side, items)?;
    tracing::debug!(?side, "list replaced");
    Ok(replaced(StatusCode::OK, &session))
}

/// Adds one item from raw form input.
pub async fn add(
    State(state): State<ServerState>,
    Path(side): Path<Side>,
    Query(query): Query<TokenQuery>,
    Json(payload): Json<ItemNew>,
) -> Result<Replaced, ServerError> {
    let mut session = load_session(&state, &query)?;
    let item = ItemDraft::new(payload.name, payload.amount, convert::period(payload.period))
        .into_item()?;
    let items = with_item(list(&session, side), item)?;

    update(&mut session, side, items)?;
    tracing::debug!(?side, "item added");
    Ok(replaced(StatusCode::CREATED, &session))
}

/// Edits one item in place from raw form input; id and color are kept.
pub async fn edit(
    State(state): State<ServerState>,
    Path((side, id)): Path<(Side, String)>,
    Query(query): Query<TokenQuery>,
    Json(payload): Json<ItemNew>,
) -> Result<Replaced, ServerError> {
    let mut session = load_session(&state, &query)?;
    let current = list(&session, side);
    let color = current
        .iter()
        .find(|item| item.id == id)
        .and_then(|item| item.color.clone());
    let edited = ItemDraft::new(payload.name, payload.amount, convert::period(payload.period))
        .into_item()?;
    let item = CashflowItem {
        id: id.clone(),
        color,
        ..edited
    };
    let items = replace_item(current, item)?;

    update(&mut session, side, items)?;
    tracing::debug!(?side, id = %id, "item edited");
    Ok(replaced(StatusCode::OK, &session))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path((side, id)): Path<(Side, String)>,
    Query(query): Query<TokenQuery>,
) -> Result<Replaced, ServerError> {
    let mut session = load_session(&state, &query)?;
    let items = without_item(list(&session, side), &id)?;

    update(&mut session, side, items)?;
    tracing::debug!(?side, id = %id, "item removed");
    Ok(replaced(StatusCode::OK, &session))
}
