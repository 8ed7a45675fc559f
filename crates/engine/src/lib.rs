//! Cashkey core.
//!
//! Two pure pieces sit at the center: [`graph::build`] turns income and
//! expense items into a flow graph, and [`codec`] turns the same items into
//! a token that lives in the page address. [`address::Session`] ties them
//! to an address bar.

pub use address::{AddressBar, MemoryAddressBar, Session, StateSource};
pub use codec::Decoded;
pub use currency::Currency;
pub use error::EngineError;
pub use graph::{FlowGraph, FlowLink, FlowNode, NodeCategory};
pub use items::{CashflowItem, ItemDraft, Period};
pub use money::MoneyCents;
pub use state::{AppState, seed_state};
pub use summary::Summary;

pub mod address;
pub mod codec;
mod currency;
mod error;
pub mod graph;
pub mod items;
mod money;
mod state;
mod summary;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
