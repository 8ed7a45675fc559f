//! The page address as the only store of application state.
//!
//! All reads and writes of the address go through [`AddressBar`]; the
//! graph builder and the codec never see it. [`Session`] owns the state,
//! rebuilds derived data on demand and writes a fresh token back after
//! every change, replacing the current address instead of pushing a new
//! history entry.
use url::Url;

use crate::{
    AppState, CashflowItem, ResultEngine, Summary,
    codec::{self, Decoded},
    graph::{self, FlowGraph},
    items::validate_items,
};

/// Query parameter carrying the state token.
pub const DATA_PARAM: &str = "data";

/// Access to the current address.
pub trait AddressBar {
    fn current(&self) -> Url;

    /// Replaces the current address; must not add a history entry.
    fn replace(&mut self, url: Url);
}

/// In-memory address used by tools and tests.
#[derive(Clone, Debug)]
pub struct MemoryAddressBar {
    current: Url,
    writes: usize,
}

impl MemoryAddressBar {
    pub fn new(url: Url) -> Self {
        Self {
            current: url,
            writes: 0,
        }
    }

    /// Number of `replace` calls so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl AddressBar for MemoryAddressBar {
    fn current(&self) -> Url {
        self.current.clone()
    }

    fn replace(&mut self, url: Url) {
        self.current = url;
        self.writes += 1;
    }
}

/// Reads the raw token from `url`, if any.
pub fn token_from_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == DATA_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Returns `base` with its `data` parameter set to `token`.
///
/// Other query parameters and the fragment are kept.
pub fn with_token(base: &Url, token: &str) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != DATA_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(DATA_PARAM, token);
    url
}

/// The shareable address of `state` under `base`.
pub fn share_url(base: &Url, state: &AppState) -> ResultEngine<Url> {
    Ok(with_token(base, &codec::encode(state)?))
}

/// Where the state of a session came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateSource {
    Token,
    Seed,
}

impl StateSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StateSource::Token => "token",
            StateSource::Seed => "seed",
        }
    }
}

/// Resolves the state carried by `url`, falling back to `seed`.
pub fn resolve(url: &Url, seed: impl FnOnce() -> AppState) -> (AppState, StateSource) {
    resolve_token(token_from_url(url).as_deref(), seed)
}

/// Resolves the state carried by a raw token, falling back to `seed`.
pub fn resolve_token(
    token: Option<&str>,
    seed: impl FnOnce() -> AppState,
) -> (AppState, StateSource) {
    match token.map_or(Decoded::Missing, codec::decode_token) {
        Decoded::State(state) => (state, StateSource::Token),
        Decoded::Missing => {
            tracing::debug!("no state in address, using seed data");
            (seed(), StateSource::Seed)
        }
        Decoded::Malformed(reason) => {
            tracing::warn!("unreadable state in address ({reason}), using seed data");
            (seed(), StateSource::Seed)
        }
    }
}

/// The single state container of a page session.
#[derive(Debug)]
pub struct Session<A> {
    bar: A,
    state: AppState,
    source: StateSource,
}

impl<A: AddressBar> Session<A> {
    /// Loads the state from the current address (or `seed`) and writes the
    /// canonical token back.
    pub fn load(bar: A, seed: impl FnOnce() -> AppState) -> ResultEngine<Self> {
        let (state, source) = resolve(&bar.current(), seed);
        tracing::debug!(
            source = source.as_str(),
            incomes = state.incomes.len(),
            expenses = state.expenses.len(),
            "session loaded"
        );

        let mut session = Self { bar, state, source };
        session.sync()?;
        Ok(session)
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn incomes(&self) -> &[CashflowItem] {
        &self.state.incomes
    }

    #[must_use]
    pub fn expenses(&self) -> &[CashflowItem] {
        &self.state.expenses
    }

    #[must_use]
    pub fn source(&self) -> StateSource {
        self.source
    }

    #[must_use]
    pub fn address_bar(&self) -> &A {
        &self.bar
    }

    pub fn graph(&self) -> ResultEngine<FlowGraph> {
        graph::build(&self.state.incomes, &self.state.expenses)
    }

    pub fn summary(&self) -> ResultEngine<Summary> {
        Summary::of(&self.state.incomes, &self.state.expenses)
    }

    /// Replaces the whole income list.
    pub fn update_incomes(&mut self, incomes: Vec<CashflowItem>) -> ResultEngine<()> {
        validate_items(&incomes)?;
        self.state.incomes = incomes;
        self.sync()
    }

    /// Replaces the whole expense list.
    pub fn update_expenses(&mut self, expenses: Vec<CashflowItem>) -> ResultEngine<()> {
        validate_items(&expenses)?;
        self.state.expenses = expenses;
        self.sync()
    }

    /// The address a share button copies.
    pub fn share_link(&self) -> ResultEngine<Url> {
        share_url(&self.bar.current(), &self.state)
    }

    fn sync(&mut self) -> ResultEngine<()> {
        let url = self.share_link()?;
        self.bar.replace(url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineError, MoneyCents, seed_state};

    fn base() -> Url {
        Url::parse("https://cashkey.app/?theme=dark#chart").unwrap()
    }

    fn item(id: &str, units: i64) -> CashflowItem {
        CashflowItem {
            id: id.to_string(),
            name: id.to_uppercase(),
            amount: MoneyCents::from_major(units),
            color: None,
        }
    }

    #[test]
    fn with_token_replaces_data_and_keeps_the_rest() {
        let first = with_token(&base(), "abc");
        let second = with_token(&first, "xyz");

        assert_eq!(token_from_url(&second).as_deref(), Some("xyz"));
        assert_eq!(second.query_pairs().filter(|(k, _)| k == DATA_PARAM).count(), 1);
        assert!(second.query_pairs().any(|(k, v)| k == "theme" && v == "dark"));
        assert_eq!(second.fragment(), Some("chart"));
    }

    #[test]
    fn resolve_token_distinguishes_sources() {
        let token = codec::encode(&AppState::default()).unwrap();
        assert_eq!(
            resolve_token(Some(token.as_str()), seed_state),
            (AppState::default(), StateSource::Token)
        );
        assert_eq!(resolve_token(None, AppState::default).1, StateSource::Seed);
        assert_eq!(resolve_token(Some("@@"), AppState::default).1, StateSource::Seed);
    }

    #[test]
    fn fresh_session_uses_seed_and_writes_it_back() {
        let session = Session::load(MemoryAddressBar::new(base()), seed_state).unwrap();

        assert_eq!(session.source(), StateSource::Seed);
        assert_eq!(session.address_bar().writes(), 1);

        let token = token_from_url(&session.address_bar().current()).unwrap();
        assert_eq!(codec::decode(&token).as_ref(), Some(session.state()));
    }

    #[test]
    fn malformed_token_falls_back_to_seed() {
        let url = with_token(&base(), "not-valid-base64-or-json");
        let session = Session::load(MemoryAddressBar::new(url), seed_state).unwrap();
        assert_eq!(session.source(), StateSource::Seed);
        assert_eq!(session.incomes().len(), 2);
    }

    #[test]
    fn session_reloads_from_its_own_address() {
        let mut session = Session::load(MemoryAddressBar::new(base()), AppState::default).unwrap();
        session.update_incomes(vec![item("salary", 5000)]).unwrap();
        session.update_expenses(vec![item("rent", 1200)]).unwrap();

        let reloaded = Session::load(
            MemoryAddressBar::new(session.address_bar().current()),
            seed_state,
        )
        .unwrap();
        assert_eq!(reloaded.source(), StateSource::Token);
        assert_eq!(reloaded.state(), session.state());
    }

    #[test]
    fn every_update_replaces_the_address() {
        let mut session = Session::load(MemoryAddressBar::new(base()), AppState::default).unwrap();
        session.update_incomes(vec![item("a", 1)]).unwrap();
        let first = session.address_bar().current();
        session.update_incomes(vec![item("a", 1)]).unwrap();

        assert_eq!(session.address_bar().writes(), 3);
        assert_eq!(session.address_bar().current(), first);
    }

    #[test]
    fn invalid_lists_are_rejected_without_writing() {
        let mut session = Session::load(MemoryAddressBar::new(base()), AppState::default).unwrap();
        let err = session
            .update_expenses(vec![item("a", 1), item("a", 2)])
            .unwrap_err();

        assert_eq!(err, EngineError::ExistingKey("a".to_string()));
        assert!(session.expenses().is_empty());
        assert_eq!(session.address_bar().writes(), 1);
    }

    #[test]
    fn graph_and_summary_follow_the_state() {
        let mut session = Session::load(MemoryAddressBar::new(base()), AppState::default).unwrap();
        assert!(session.graph().unwrap().is_empty());

        session.update_incomes(vec![item("salary", 100)]).unwrap();
        assert_eq!(session.graph().unwrap().nodes.len(), 3);
        assert_eq!(
            session.summary().unwrap().balance,
            MoneyCents::from_major(100)
        );
    }
}
