//! Mapping from tool names to the external pages that provide them.

use serde::{Deserialize, Serialize};

use super::directive::ToolName;

/// A tool the UI should surface for this query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolLink {
    /// Which tool.
    pub name: ToolName,
    /// Where it lives, with the query attached when the tool accepts one.
    pub url: String,
}

/// Base URL of each tool, and the parameter the query goes into (if any).
fn endpoint(tool: ToolName) -> (&'static str, Option<&'static str>) {
    match tool {
        ToolName::Calculator => ("https://www.desmos.com/scientific", Some("q")),
        ToolName::UnitConverter => ("https://www.unitconverters.net/", Some("q")),
        ToolName::ColourPicker => ("https://htmlcolorcodes.com/color-picker/", None),
        ToolName::Metronome => ("https://www.imusic-school.com/en/tools/online-metronome/", None),
        ToolName::Translate => ("https://translate.google.com/", Some("text")),
    }
}

/// Resolve `tool` to its link, appending the URL-encoded `query` for the
/// tools that take input.
///
/// The query is encoded as given; requests arrive already trimmed.
pub fn resolve(tool: ToolName, query: &str) -> ToolLink {
    let (base, param) = endpoint(tool);
    let url = match param {
        Some(param) => format!("{base}?{param}={}", urlencoding::encode(query)),
        None => base.to_owned(),
    };
    ToolLink { name: tool, url }
}
