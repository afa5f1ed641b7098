//! Language model collaborator.
//!
//! The wire shapes here follow the Gemini `generateContent` request body,
//! which is also what `POST /api/generate` accepts and forwards verbatim.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

pub use gemini::{GeminiClient, GeminiConfig};

/// Role of the user in a conversation turn.
pub const ROLE_USER: &str = "user";
/// Role of the model in a conversation turn.
pub const ROLE_MODEL: &str = "model";

/// A piece of text within a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// The text content. Non-text parts deserialize as empty.
    #[serde(default)]
    pub text: String,
}

/// One conversation turn, or a system instruction when `role` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// `"user"` or `"model"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Ordered parts of the turn.
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-text turn with the given role.
    pub fn turn(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_owned()),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// A role-less single-text content, as used for system instructions.
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Concatenated text of every part.
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// A generation request: prior turns plus an optional system instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Conversation so far, oldest first.
    pub contents: Vec<Content>,
    /// Behaviour instructions for the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

/// Text-generation backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a reply and return its text.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Llm`] on transport failure, a non-success
    /// status, or a response without text.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ServiceError>;
}
