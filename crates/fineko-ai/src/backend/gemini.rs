//! Gemini `generateContent` REST backend.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{Content, Generation, GenerationRequest, LanguageModel, Part, Role};
use crate::error::LlmError;

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    /// Used when a request does not set its own temperature.
    pub temperature: Option<f32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-2.5-flash".into(),
            api_key: String::new(),
            temperature: None,
        }
    }
}

pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::RequestFailed(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

// Wire format, camelCase per the REST API.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireBlob>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<WireContent>,
}

fn to_wire(content: Content) -> WireContent {
    WireContent {
        role: Some(
            match content.role {
                Role::User => "user",
                Role::Model => "model",
            }
            .to_string(),
        ),
        parts: content
            .parts
            .into_iter()
            .map(|part| match part {
                Part::Text(text) => WirePart {
                    text: Some(text),
                    ..Default::default()
                },
                Part::InlineData { mime_type, data } => WirePart {
                    inline_data: Some(WireBlob {
                        mime_type,
                        data: STANDARD.encode(data),
                    }),
                    ..Default::default()
                },
            })
            .collect(),
    }
}

fn build_body(request: GenerationRequest, default_temperature: Option<f32>) -> GenerateContentRequest {
    let temperature = request.temperature.or(default_temperature);
    let generation_config = (request.json || temperature.is_some()).then(|| WireGenerationConfig {
        response_mime_type: request.json.then_some("application/json"),
        response_schema: request.response_schema,
        temperature,
    });

    GenerateContentRequest {
        system_instruction: request.system_instruction.map(|text| WireContent {
            role: None,
            parts: vec![WirePart {
                text: Some(text),
                ..Default::default()
            }],
        }),
        contents: request.contents.into_iter().map(to_wire).collect(),
        generation_config,
    }
}

fn retry_after_ms(headers: &header::HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

impl LanguageModel for GeminiBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, LlmError> {
        let body = build_body(request, self.config.temperature);

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited {
                retry_after_ms: retry_after_ms(response.headers()),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!("HTTP {status}: {body}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        debug!(model = %self.config.model, chars = text.len(), "Model call succeeded");
        Ok(Generation { text })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn body_uses_rest_field_names() {
        let request = GenerationRequest::new("be brief")
            .content(Content::user_text("hi"))
            .content(Content::user_audio("audio/ogg", vec![1, 2, 3]))
            .schema(json!({"type": "OBJECT"}));

        let body = serde_json::to_value(build_body(request, Some(0.3))).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["parts"][0]["inlineData"]["mimeType"], "audio/ogg");
        assert_eq!(body["contents"][1]["parts"][0]["inlineData"]["data"], "AQID");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn plain_text_request_has_no_generation_config() {
        let request = GenerationRequest::new("sys").content(Content::user_text("hi"));
        let body = serde_json::to_value(build_body(request, None)).unwrap();
        assert!(body.get("generationConfig").is_none());
    }
}
