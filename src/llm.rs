use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::{fmt, sync::Arc, time::Duration};
use thiserror::Error;

use crate::image_io::{self, EncodedImage};
use crate::prompt::build_prompt;

/// Why a recipe could not be generated. The HTTP layer reports every variant
/// the same way; the detail is for the logs.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("could not decode uploaded image: {0}")]
    Decode(String),
    #[error("model request failed: {0}")]
    Upstream(String),
    #[error("model output is not a JSON object: {0}")]
    Parse(String),
    #[error("no model client configured")]
    NotConfigured,
}

/// A hosted multimodal model that answers a text prompt about one image.
#[async_trait]
pub trait RecipeModel: Send + Sync + fmt::Debug {
    /// Send the prompt and image, return the model's raw text answer.
    async fn complete(
        &self,
        prompt: &str,
        image: &EncodedImage,
    ) -> Result<String, GenerationError>;

    /// Model name, for logs.
    fn model_name(&self) -> &str;
}

/* =========================
 * Gemini
 * ========================= */

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base: String,
    token: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 2],
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    #[must_use]
    pub fn new(base: String, token: String, model: String, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            token,
            model,
            timeout,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base.trim_end_matches('/'),
            self.model
        )
    }
}

// Hand-written so the API key never ends up in a log line.
impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base", &self.base)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RecipeModel for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        image: &EncodedImage,
    ) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [
                    Part::Text { text: prompt },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
                        },
                    },
                ],
            }],
        };

        let resp = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.token)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Upstream(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GenerationError::Upstream(format!("reading response body: {e}")))?;

        if !status.is_success() {
            return Err(GenerationError::Upstream(format!("HTTP {status}: {text}")));
        }

        let envelope: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Upstream(format!("bad envelope: {e}")))?;

        let answer: String = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(GenerationError::Upstream(
                "response has no text candidate".into(),
            ));
        }
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/* =========================
 * Output cleanup
 * ========================= */

/// Remove a Markdown code fence around the model's answer.
///
/// Strips a leading ```` ```json ```` (or bare ```` ``` ````) and a trailing
/// ```` ``` ````; unfenced text is only trimmed.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let s = raw.trim();
    let s = s
        .strip_prefix("```json")
        .or_else(|| s.strip_prefix("```"))
        .unwrap_or(s);
    let s = s.strip_suffix("```").unwrap_or(s);
    s.trim()
}

/// Parse the model's answer into a JSON object.
///
/// # Errors
///
/// Returns `GenerationError::Parse` if the cleaned text isn't a JSON object.
pub fn parse_model_output(raw: &str) -> Result<Map<String, JsonValue>, GenerationError> {
    match serde_json::from_str::<JsonValue>(strip_code_fence(raw)) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(other) => Err(GenerationError::Parse(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(GenerationError::Parse(e.to_string())),
    }
}

const fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/* =========================
 * Generator
 * ========================= */

/// Turns an uploaded photo into the model's recipe mapping.
#[derive(Debug, Clone)]
pub struct RecipeGenerator {
    model: Option<Arc<dyn RecipeModel>>,
}

impl RecipeGenerator {
    #[must_use]
    pub fn new(model: Arc<dyn RecipeModel>) -> Self {
        Self { model: Some(model) }
    }

    /// A generator that fails every call; used when no API key is configured.
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self { model: None }
    }

    /// # Errors
    ///
    /// Returns Err if the image can't be decoded, the model call fails, or the
    /// answer isn't a JSON object.
    pub async fn generate(
        &self,
        image_bytes: Vec<u8>,
        cooking_style: Option<&str>,
    ) -> Result<Map<String, JsonValue>, GenerationError> {
        let model = self.model.as_ref().ok_or(GenerationError::NotConfigured)?;

        let image = tokio::task::spawn_blocking(move || image_io::prepare_upload(&image_bytes))
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))?
            .map_err(|e| GenerationError::Decode(e.to_string()))?;

        let prompt = build_prompt(cooking_style);
        tracing::debug!(
            model = model.model_name(),
            image_bytes = image.bytes.len(),
            style = cooking_style.unwrap_or("-"),
            "calling model"
        );

        let raw = model.complete(&prompt, &image).await?;
        tracing::debug!("--- model raw response ---\n{raw}\n--- end of raw response ---");

        parse_model_output(&raw)
    }
}
