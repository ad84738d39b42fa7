//! Remote transformation gateways.

mod gemini;
mod provider;

pub use gemini::{GeminiGateway, GeminiGatewayBuilder, GeminiModel, DEFAULT_BASE_URL};
pub use provider::ImageGateway;
