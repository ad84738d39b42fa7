#![warn(missing_docs)]
//! Image Studio - AI image editing and product photography.
//!
//! Upload an image, pick a mode, and let a Gemini image model transform it:
//!
//! - **Edit**: apply a freeform text instruction ("add a retro filter").
//! - **Product shot**: turn a clothing photo into a clean, front-facing
//!   e-commerce shot on a white background.
//!
//! # Quick Start
//!
//! ```no_run
//! use image_studio::{image, Mode, Studio, StudioConfig, SubmitOutcome};
//!
//! #[tokio::main]
//! async fn main() -> image_studio::Result<()> {
//!     let studio = Studio::from_config(StudioConfig::from_env()?);
//!     studio.upload(image::read_file("jacket.jpg")?)?;
//!     studio.set_mode(Mode::ProductShot);
//!
//!     if studio.submit().await == SubmitOutcome::Succeeded {
//!         let state = studio.snapshot();
//!         if let Some(result) = state.result_image() {
//!             result.save("jacket-product.png")?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `image-studio` command-line front end.

pub mod config;
mod error;
pub mod gateway;
pub mod image;
pub mod studio;

// Re-export error types at crate root
pub use error::{Result, StudioError, GENERIC_API_ERROR};

pub use config::StudioConfig;
pub use gateway::{GeminiGateway, GeminiGatewayBuilder, GeminiModel, ImageGateway};
pub use image::{EncodedImage, GeneratedImage, ImageFormat, IntakePolicy};
pub use studio::{Mode, Phase, RequestState, Studio, SubmitOutcome, PRODUCT_SHOT_PROMPT};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, StudioError};
    pub use crate::gateway::{GeminiGateway, ImageGateway};
    pub use crate::image::{EncodedImage, GeneratedImage};
    pub use crate::studio::{Mode, Studio, SubmitOutcome};
    pub use crate::StudioConfig;
}
