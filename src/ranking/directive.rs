//! Parsing of the control tags embedded in the LLM's free-text reply.
//!
//! The reply is expected to end with `@@RANKING:[i, j, ...]@@` and may carry
//! `@@TOOL:[name]@@` just before it. Both tags are optional on input: a
//! missing or malformed tag yields no directive for that part, never an
//! error.

use serde::{Deserialize, Serialize};

const TOOL_OPEN: &str = "@@TOOL:[";
const RANKING_OPEN: &str = "@@RANKING:[";
const TAG_CLOSE: &str = "]@@";

/// Tools the model may ask the UI to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    Calculator,
    UnitConverter,
    ColourPicker,
    Metronome,
    Translate,
}

impl ToolName {
    /// Parse a tag value. Case and surrounding whitespace are ignored.
    pub fn from_tag(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "calculator" => Some(Self::Calculator),
            "unit_converter" => Some(Self::UnitConverter),
            "colour_picker" | "color_picker" => Some(Self::ColourPicker),
            "metronome" => Some(Self::Metronome),
            "translate" => Some(Self::Translate),
            _ => None,
        }
    }

    /// The canonical tag value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calculator => "calculator",
            Self::UnitConverter => "unit_converter",
            Self::ColourPicker => "colour_picker",
            Self::Metronome => "metronome",
            Self::Translate => "translate",
        }
    }

    /// Every tool, in the order they are described to the model.
    pub fn all() -> &'static [ToolName] {
        &[
            Self::Calculator,
            Self::UnitConverter,
            Self::ColourPicker,
            Self::Metronome,
            Self::Translate,
        ]
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the model asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingDirective {
    /// Tool to surface, if a known one was named.
    pub tool: Option<ToolName>,
    /// Indices into the ranked batch, most relevant first. `None` when the
    /// reply carried no ranking tag.
    pub ranked_indices: Option<Vec<usize>>,
}

/// A reply split into display text and directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Reply text with the control tags removed.
    pub display_text: String,
    /// Parsed control tags.
    pub directive: RankingDirective,
}

/// Split `reply` into display text and a [`RankingDirective`].
///
/// Exactly the tag substrings are removed and the rest is trimmed. A reply
/// with neither tag is returned untouched. Unknown tool names are removed
/// from the text but produce no tool; ranking entries that are not
/// non-negative integers are dropped.
pub fn parse_reply(reply: &str) -> ParsedReply {
    let (tool_value, text) = take_tag(reply, TOOL_OPEN);
    let (ranking_value, text) = take_tag(&text, RANKING_OPEN);

    if tool_value.is_none() && ranking_value.is_none() {
        return ParsedReply {
            display_text: reply.to_owned(),
            directive: RankingDirective::default(),
        };
    }

    let tool = tool_value.as_deref().and_then(|value| {
        let parsed = ToolName::from_tag(value);
        if parsed.is_none() {
            tracing::debug!(value, "ignoring unknown tool tag");
        }
        parsed
    });

    ParsedReply {
        display_text: text.trim().to_owned(),
        directive: RankingDirective {
            tool,
            ranked_indices: ranking_value.as_deref().map(parse_indices),
        },
    }
}

/// Remove the last `open ... ]@@` tag from `text`, returning its inner value.
///
/// An opening marker without a closing one is left in place.
fn take_tag(text: &str, open: &str) -> (Option<String>, String) {
    let Some(start) = text.rfind(open) else {
        return (None, text.to_owned());
    };
    let value_start = start + open.len();
    let Some(len) = text[value_start..].find(TAG_CLOSE) else {
        return (None, text.to_owned());
    };
    let value_end = value_start + len;

    let value = text[value_start..value_end].to_owned();
    let mut rest = String::with_capacity(text.len());
    rest.push_str(&text[..start]);
    rest.push_str(&text[value_end + TAG_CLOSE.len()..]);
    (Some(value), rest)
}

fn parse_indices(value: &str) -> Vec<usize> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| entry.parse::<usize>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn parses_tool_and_ranking() {
        let parsed = parse_reply("Some summary. @@TOOL:[calculator]@@@@RANKING:[2, 0, 1]@@");
        assert_eq!(parsed.display_text, "Some summary.");
        assert_eq!(parsed.directive.tool, Some(ToolName::Calculator));
        assert_eq!(parsed.directive.ranked_indices, Some(vec![2, 0, 1]));
    }

    #[test]
    fn no_tags_leaves_text_untouched() {
        let reply = "  Plain answer with trailing space.\n";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.display_text, reply);
        assert_eq!(parsed.directive, RankingDirective::default());
    }

    #[test]
    fn ranking_without_tool() {
        let parsed = parse_reply("Answer.\n\n@@RANKING:[1,0]@@");
        assert_eq!(parsed.display_text, "Answer.");
        assert_eq!(parsed.directive.tool, None);
        assert_eq!(parsed.directive.ranked_indices, Some(vec![1, 0]));
    }

    #[test]
    fn tool_without_ranking() {
        let parsed = parse_reply("Use the converter. @@TOOL:[unit_converter]@@");
        assert_eq!(parsed.display_text, "Use the converter.");
        assert_eq!(parsed.directive.tool, Some(ToolName::UnitConverter));
        assert_eq!(parsed.directive.ranked_indices, None);
    }

    #[test]
    fn unknown_tool_is_stripped_but_ignored() {
        let parsed = parse_reply("Hi. @@TOOL:[stopwatch]@@@@RANKING:[0]@@");
        assert_eq!(parsed.display_text, "Hi.");
        assert_eq!(parsed.directive.tool, None);
        assert_eq!(parsed.directive.ranked_indices, Some(vec![0]));
    }

    #[test]
    fn non_integer_indices_dropped() {
        let parsed = parse_reply("x @@RANKING:[3, two, -1, 1.5, , 0]@@");
        assert_eq!(parsed.directive.ranked_indices, Some(vec![3, 0]));
    }

    #[test]
    fn empty_ranking_is_present_but_empty() {
        let parsed = parse_reply("x @@RANKING:[]@@");
        assert_eq!(parsed.directive.ranked_indices, Some(vec![]));
        assert_eq!(parsed.display_text, "x");
    }

    #[test]
    fn unclosed_tag_is_not_a_tag() {
        let reply = "Broken @@RANKING:[1, 2";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.display_text, reply);
        assert_eq!(parsed.directive.ranked_indices, None);
    }

    #[test]
    fn text_around_tags_is_kept() {
        let parsed = parse_reply("Before @@TOOL:[metronome]@@ after.");
        assert_eq!(parsed.display_text, "Before  after.");
    }

    #[test]
    fn tool_names_round_trip() {
        for tool in ToolName::all() {
            assert_eq!(ToolName::from_tag(tool.as_str()), Some(*tool));
        }
        assert_eq!(ToolName::from_tag(" Colour_Picker "), Some(ToolName::ColourPicker));
        assert_eq!(ToolName::from_tag("color_picker"), Some(ToolName::ColourPicker));
    }

    #[test]
    fn tool_name_serializes_snake_case() {
        let json = serde_json::to_string(&ToolName::UnitConverter).unwrap();
        assert_eq!(json, "\"unit_converter\"");
    }
}
