//! LLM-driven ranking and tool detection for web results.

pub mod directive;
pub mod post_process;
pub mod reorder;
pub mod tools;

pub use directive::{ParsedReply, RankingDirective, ToolName, parse_reply};
pub use post_process::{PostProcessor, Processed};
pub use reorder::{reorder, reorder_head};
pub use tools::{ToolLink, resolve};
