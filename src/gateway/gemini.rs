//! Gemini (Google) image transformation gateway.

use crate::config::StudioConfig;
use crate::error::{sanitize_error_message, Result, StudioError};
use crate::gateway::provider::ImageGateway;
use crate::image::{EncodedImage, GeneratedImage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const MISSING_KEY_MESSAGE: &str = "Gemini API Key is not configured. Cannot make API requests.";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image (fast, economical).
    #[default]
    FlashImage,
    /// Gemini 3 Pro Image (highest quality).
    ProImage,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlashImage => "gemini-2.5-flash-image",
            Self::ProImage => "gemini-3-pro-image-preview",
        }
    }

    /// Parses a short name (`flash`, `pro`) or a full model identifier.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "flash" | "gemini-2.5-flash-image" => Some(Self::FlashImage),
            "pro" | "gemini-3-pro-image-preview" => Some(Self::ProImage),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for GeminiGateway.
#[derive(Debug, Clone, Default)]
pub struct GeminiGatewayBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
    client: Option<reqwest::Client>,
}

impl GeminiGatewayBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    ///
    /// There is no environment fallback here; use
    /// [`StudioConfig::from_env`] to resolve one.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Uses a preconfigured HTTP client.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the gateway.
    ///
    /// A missing key is not an error here; every transform call will fail
    /// with [`StudioError::Configuration`] instead.
    pub fn build(self) -> GeminiGateway {
        let api_key = self.api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("Gemini API key not set; image transformations are disabled");
        }

        GeminiGateway {
            client: self.client.unwrap_or_default(),
            api_key,
            model: self.model,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

/// Gemini image transformation gateway.
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: Option<String>,
    model: GeminiModel,
    base_url: String,
}

impl GeminiGateway {
    /// Creates a new `GeminiGatewayBuilder`.
    pub fn builder() -> GeminiGatewayBuilder {
        GeminiGatewayBuilder::new()
    }

    /// Builds a gateway from studio configuration.
    pub fn from_config(config: &StudioConfig) -> Self {
        let mut builder = Self::builder()
            .model(config.model)
            .base_url(config.base_url.clone());
        if let Some(ref key) = config.api_key {
            builder = builder.api_key(key.clone());
        }
        builder.build()
    }

    /// Returns true if a credential is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Returns the model this gateway calls.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    async fn transform_impl(
        &self,
        image: &EncodedImage,
        instruction: &str,
    ) -> Result<GeneratedImage> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| StudioError::Configuration(MISSING_KEY_MESSAGE.into()))?;

        let start = Instant::now();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let body = GeminiRequest::new(image, instruction);

        tracing::debug!(
            model = self.model.as_str(),
            media_type = image.media_type(),
            name = image.name(),
            "sending Gemini transformation request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StudioError::Upstream {
                status: Some(status.as_u16()),
                message: sanitize_error_message(&text),
            });
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let data = gemini_response.into_image_data()?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            payload_len = data.len(),
            "Gemini transformation complete"
        );

        Ok(GeneratedImage::new(data))
    }
}

#[async_trait]
impl ImageGateway for GeminiGateway {
    async fn transform(&self, image: &EncodedImage, instruction: &str) -> Result<GeneratedImage> {
        self.transform_impl(image, instruction).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - either text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    /// Image part first, then the instruction; image-only output.
    fn new(image: &EncodedImage, instruction: &str) -> Self {
        let parts = vec![
            GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.media_type().to_string(),
                    data: image.data().to_string(),
                },
            },
            GeminiRequestPart::Text {
                text: instruction.to_string(),
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

impl GeminiResponse {
    /// Extracts the first inline image payload of the first candidate.
    fn into_image_data(self) -> Result<String> {
        // Blocked prompts still come back as HTTP 200
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let message = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {reason}"));
                return Err(StudioError::Upstream {
                    status: None,
                    message,
                });
            }
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(StudioError::NoImageInResponse)?;
        let finish_reason = candidate.finish_reason;
        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

        let mut text_parts = Vec::new();
        for part in parts {
            if let Some(inline) = part.inline_data {
                tracing::debug!(
                    mime_type = inline.mime_type.as_deref().unwrap_or("unknown"),
                    "found inline image part"
                );
                return Ok(inline.data);
            }
            if let Some(text) = part.text {
                text_parts.push(text);
            }
        }

        tracing::debug!(
            finish_reason = finish_reason.as_deref().unwrap_or("none"),
            text = %text_parts.join(" "),
            "Gemini response carried no image"
        );
        Err(StudioError::NoImageInResponse)
    }
}
