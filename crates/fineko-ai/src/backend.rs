//! Language-model backend abstraction.
//!
//! Every capability the orchestrators need (transcription, structured
//! extraction, classification, plan generation) is one `generate` call
//! with a different request shape.

use std::sync::Arc;

use serde_json::Value;

use crate::error::LlmError;

pub mod gemini;

pub use gemini::{GeminiBackend, GeminiConfig};

/// Author of a piece of conversation content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Raw media bytes, e.g. a recorded voice answer.
    InlineData { mime_type: String, data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn user_audio(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::InlineData {
                mime_type: mime_type.into(),
                data,
            }],
        }
    }
}

/// One model call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    /// Ask for JSON output.
    pub json: bool,
    /// Constrain JSON output to this schema. Implies `json`.
    pub response_schema: Option<Value>,
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: Some(system_instruction.into()),
            ..Default::default()
        }
    }

    pub fn content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }

    pub fn contents(mut self, contents: impl IntoIterator<Item = Content>) -> Self {
        self.contents.extend(contents);
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.json = true;
        self.response_schema = Some(schema);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Model output.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
}

/// A hosted or local language model.
pub trait LanguageModel: Send + Sync {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<Generation, LlmError>> + Send;
}

impl<T: LanguageModel> LanguageModel for Arc<T> {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<Generation, LlmError>> + Send {
        (**self).generate(request)
    }
}

/// Strip a Markdown code fence the model sometimes wraps JSON in.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse model output as JSON of type `T`.
pub fn parse_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| LlmError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_fences_are_removed() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn schema_implies_json() {
        let request = GenerationRequest::new("sys").schema(serde_json::json!({"type": "object"}));
        assert!(request.json);
        assert!(request.response_schema.is_some());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_json::<Value>("not json").unwrap_err();
        assert!(matches!(err, LlmError::ParseError(_)));
    }
}
