//! Lodestar: a metasearch service over Bing, Yahoo, DuckDuckGo and Brave.
//!
//! Scraping, merging and the headless image adapter live in
//! [`lodestar_search`]. This crate adds the application layer on top:
//!
//! - **Ranking**: an LLM summarises the leading results, reorders them by
//!   relevance and may suggest a utility tool ([`ranking`])
//! - **Pipeline**: caching and pagination of the ranked outcome ([`pipeline`])
//! - **HTTP**: `/api/metasearch`, `/api/generate`, `/api/videos` ([`server`])
//! - **Crawl**: one-shot aggregation written to a JSON file ([`crawl`])

pub mod config;
pub mod crawl;
pub mod error;
pub mod llm;
pub mod pagination;
pub mod pipeline;
pub mod ranking;
pub mod server;
pub mod video;

pub use config::{Secrets, ServiceConfig};
pub use error::{Result, ServiceError};
pub use pagination::PageInfo;
pub use pipeline::{MetasearchRequest, MetasearchResponse, PageItems, Pipeline};
pub use server::{AppState, Server};
