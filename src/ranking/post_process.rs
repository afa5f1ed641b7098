//! LLM summary, relevance ranking and tool detection for web results.
//!
//! The leading results are sent to the model as prior "model" turns,
//! followed by the user's query. The reply is a short summary carrying
//! control tags (see [`super::directive`]). Any failure along the way
//! leaves the results in engine-priority order with no summary or tool.

use std::sync::Arc;
use std::time::Duration;

use lodestar_search::SearchResult;

use crate::llm::{Content, GenerateRequest, LlmClient, ROLE_MODEL, ROLE_USER};

use super::directive::{ToolName, parse_reply};
use super::reorder::reorder_head;
use super::tools::{ToolLink, resolve};

/// Web results after post-processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// Results, ranked batch first.
    pub items: Vec<SearchResult>,
    /// Model summary with control tags removed.
    pub summary: Option<String>,
    /// Tool the model suggested, resolved to a link.
    pub tool: Option<ToolLink>,
}

impl Processed {
    /// Results passed through unchanged.
    pub fn unranked(items: Vec<SearchResult>) -> Self {
        Self {
            items,
            summary: None,
            tool: None,
        }
    }
}

/// Runs the ranking pass against an [`LlmClient`].
pub struct PostProcessor {
    llm: Option<Arc<dyn LlmClient>>,
    top_n: usize,
    timeout: Duration,
}

impl PostProcessor {
    /// Create a post-processor. With `llm` set to `None` every call is a
    /// pass-through.
    pub fn new(llm: Option<Arc<dyn LlmClient>>, top_n: usize, timeout: Duration) -> Self {
        Self {
            llm,
            top_n,
            timeout,
        }
    }

    /// Whether a model is available.
    pub fn is_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Summarise, rank and annotate `results` for `query`.
    ///
    /// Never fails: network errors, timeouts and unparseable replies all
    /// produce [`Processed::unranked`] (a reply without tags still yields a
    /// summary).
    pub async fn process(&self, query: &str, results: Vec<SearchResult>) -> Processed {
        let Some(llm) = &self.llm else {
            return Processed::unranked(results);
        };
        if results.is_empty() {
            return Processed::unranked(results);
        }

        let batch = self.top_n.min(results.len());
        let request = build_request(query, &results[..batch]);

        let reply = match tokio::time::timeout(self.timeout, llm.generate(&request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "ranking request failed");
                return Processed::unranked(results);
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "ranking request timed out");
                return Processed::unranked(results);
            }
        };

        let parsed = parse_reply(&reply);
        let items = match &parsed.directive.ranked_indices {
            Some(indices) => reorder_head(results, batch, indices),
            None => {
                tracing::debug!("reply carried no ranking tag");
                results
            }
        };

        let summary = Some(parsed.display_text).filter(|text| !text.trim().is_empty());
        let tool = parsed.directive.tool.map(|name| resolve(name, query));

        Processed {
            items,
            summary,
            tool,
        }
    }
}

/// Build the ranking request: one model turn per result, then the query.
pub fn build_request(query: &str, batch: &[SearchResult]) -> GenerateRequest {
    let mut contents: Vec<Content> = batch
        .iter()
        .enumerate()
        .map(|(i, result)| Content::turn(ROLE_MODEL, format_snippet(i, result)))
        .collect();
    contents.push(Content::turn(ROLE_USER, query));

    GenerateRequest {
        contents,
        system_instruction: Some(Content::instruction(system_instruction(batch.len()))),
    }
}

fn format_snippet(index: usize, result: &SearchResult) -> String {
    if result.snippet.is_empty() {
        format!("[{index}] {}\n{}", result.title, result.url)
    } else {
        format!("[{index}] {}\n{}\n{}", result.title, result.url, result.snippet)
    }
}

fn system_instruction(batch: usize) -> String {
    let tools: Vec<&str> = ToolName::all().iter().map(ToolName::as_str).collect();
    format!(
        "You are a search assistant. The previous model turns are numbered web search \
         results; the final user turn is the search query.\n\
         1. Answer the query in at most three sentences using only those results.\n\
         2. If the query is best served by one of these tools: {tools}, write \
         @@TOOL:[name]@@ with the tool's exact name. Otherwise write no tool tag.\n\
         3. End your reply with @@RANKING:[...]@@ listing the result numbers 0 to {last} \
         from most to least relevant, comma separated.",
        tools = tools.join(", "),
        last = batch.saturating_sub(1),
    )
}
