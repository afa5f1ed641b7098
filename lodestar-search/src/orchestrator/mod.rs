//! Search orchestrator: concurrent fan-out, priority merge, optional dedup.
//!
//! Web queries go to every configured engine at once; the results are
//! concatenated in engine priority order. Image queries go only to the
//! headless image adapter.

pub mod aggregate;
pub mod dedup;
pub mod url_normalize;

pub use aggregate::{Aggregated, Aggregator, SearchContext};
