//! Gateway trait.

use crate::error::Result;
use crate::image::{EncodedImage, GeneratedImage};
use async_trait::async_trait;

/// A remote service that transforms an image according to a text instruction.
///
/// Each call to [`transform`](ImageGateway::transform) issues exactly one
/// request to the service.
#[async_trait]
pub trait ImageGateway: Send + Sync {
    /// Sends the image and instruction, returning the first image in the reply.
    async fn transform(&self, image: &EncodedImage, instruction: &str) -> Result<GeneratedImage>;

    /// Returns the name of this gateway for display.
    fn name(&self) -> &str;
}

#[async_trait]
impl<G: ImageGateway + ?Sized> ImageGateway for std::sync::Arc<G> {
    async fn transform(&self, image: &EncodedImage, instruction: &str) -> Result<GeneratedImage> {
        (**self).transform(image, instruction).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
