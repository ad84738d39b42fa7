//! Error types for image transformation.

/// Message shown for any failure on the service side of a submission.
pub const GENERIC_API_ERROR: &str =
    "Failed to generate image due to an API error. Please check the logs for more details.";

/// Maximum length of an upstream error body kept for diagnostics.
const MAX_ERROR_DETAIL: usize = 500;

/// Errors that can occur while preparing or running a transformation.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Missing image or instruction, or an upload outside the intake policy.
    #[error("{0}")]
    Validation(String),

    /// No credential configured; no request was attempted.
    #[error("{0}")]
    Configuration(String),

    /// The service answered but returned no inline image part.
    #[error("no image data was found in the Gemini API response")]
    NoImageInResponse,

    /// The service returned an error response or blocked the prompt.
    #[error("upstream error{}: {message}", status_suffix(.status))]
    Upstream {
        /// HTTP status, if the failure came with one.
        status: Option<u16>,
        /// Sanitised diagnostic detail.
        message: String,
    },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The uploaded file could not be read or its payload parsed.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StudioError {
    /// Returns true if the failure happened on the remote service side.
    ///
    /// These all collapse into [`GENERIC_API_ERROR`] for display; the detail
    /// is only logged.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::NoImageInResponse | Self::Upstream { .. } | Self::Network(_) | Self::Json(_)
        )
    }

    /// Returns the message to show the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Configuration(msg) => msg.clone(),
            Self::Decode(_) | Self::Io(_) => "Failed to read the image file.".to_string(),
            _ if self.is_upstream() => GENERIC_API_ERROR.to_string(),
            _ => "An unknown error occurred.".to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

/// Trims an upstream error body to something safe to log.
///
/// Long bodies are truncated and anything that looks like an API key query
/// parameter is redacted.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len().min(MAX_ERROR_DETAIL));
    for (i, segment) in text.split("key=").enumerate() {
        if i == 0 {
            cleaned.push_str(segment);
            continue;
        }
        cleaned.push_str("key=[REDACTED]");
        let rest = segment
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .map(|end| &segment[end..])
            .unwrap_or("");
        cleaned.push_str(rest);
    }

    let cleaned = cleaned.trim();
    if cleaned.chars().count() > MAX_ERROR_DETAIL {
        let truncated: String = cleaned.chars().take(MAX_ERROR_DETAIL).collect();
        format!("{truncated}...")
    } else {
        cleaned.to_string()
    }
}

/// Result type alias for image studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;
