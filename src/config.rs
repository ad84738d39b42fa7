//! Studio configuration.

use crate::error::{Result, StudioError};
use crate::gateway::{GeminiModel, DEFAULT_BASE_URL};
use crate::image::IntakePolicy;
use crate::studio::PRODUCT_SHOT_PROMPT;

/// Environment variables checked for the Gemini credential, in order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Environment variable selecting the model (`flash` or `pro`).
pub const MODEL_ENV_VAR: &str = "IMAGE_STUDIO_MODEL";

/// Environment variable overriding the API endpoint.
pub const BASE_URL_ENV_VAR: &str = "IMAGE_STUDIO_BASE_URL";

/// Everything needed to assemble a studio.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Gemini API key. `None` disables transformations.
    pub api_key: Option<String>,
    /// Model to call.
    pub model: GeminiModel,
    /// API endpoint.
    pub base_url: String,
    /// Instruction sent in product-shot mode.
    pub product_shot_prompt: String,
    /// Accepted uploads.
    pub intake: IntakePolicy,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: GeminiModel::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            product_shot_prompt: PRODUCT_SHOT_PROMPT.to_string(),
            intake: IntakePolicy::default(),
        }
    }
}

impl StudioConfig {
    /// Reads configuration from the process environment.
    ///
    /// A missing key is not an error. An unknown model name is.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = Self {
            api_key: API_KEY_ENV_VARS.iter().find_map(|&name| non_empty(name)),
            ..Self::default()
        };

        if let Some(model) = non_empty(MODEL_ENV_VAR) {
            config.model = GeminiModel::parse(&model).ok_or_else(|| {
                StudioError::Configuration(format!(
                    "Unknown model '{model}' in {MODEL_ENV_VAR}; expected 'flash' or 'pro'."
                ))
            })?;
        }
        if let Some(url) = non_empty(BASE_URL_ENV_VAR) {
            config.base_url = url;
        }

        Ok(config)
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model.
    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Replaces the product-shot instruction.
    pub fn with_product_shot_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.product_shot_prompt = prompt.into();
        self
    }
}
