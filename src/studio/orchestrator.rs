//! The request orchestrator.

use crate::config::StudioConfig;
use crate::error::{Result, StudioError};
use crate::gateway::{GeminiGateway, ImageGateway};
use crate::image::{EncodedImage, IntakePolicy};
use crate::studio::mode::Mode;
use crate::studio::state::{Rejection, RequestState};
use std::sync::{Mutex, MutexGuard};

/// How a call to [`Studio::submit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission was in flight; nothing happened.
    Ignored,
    /// Inputs were incomplete; no request was sent.
    Rejected,
    /// The gateway returned an image.
    Succeeded,
    /// The gateway call failed.
    Failed,
}

/// Mediates between user intent and an [`ImageGateway`].
///
/// State lives behind a mutex that is never held across the gateway call,
/// so methods take `&self` and a second submit while one is in flight is
/// simply ignored.
pub struct Studio<G> {
    gateway: G,
    state: Mutex<RequestState>,
    product_shot_prompt: String,
    intake: IntakePolicy,
}

impl Studio<GeminiGateway> {
    /// Builds a studio backed by Gemini from configuration.
    pub fn from_config(config: StudioConfig) -> Self {
        let gateway = GeminiGateway::from_config(&config);
        Self::with_gateway(gateway, config)
    }
}

impl<G: ImageGateway> Studio<G> {
    /// Creates a studio with the default configuration.
    pub fn new(gateway: G) -> Self {
        Self::with_gateway(gateway, StudioConfig::default())
    }

    /// Creates a studio using the prompt and intake policy from `config`.
    ///
    /// Credential and model settings in `config` are ignored; they belong to
    /// the gateway.
    pub fn with_gateway(gateway: G, config: StudioConfig) -> Self {
        Self {
            gateway,
            state: Mutex::new(RequestState::new()),
            product_shot_prompt: config.product_shot_prompt,
            intake: config.intake,
        }
    }

    /// Returns the gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Returns a copy of the current state for rendering.
    pub fn snapshot(&self) -> RequestState {
        self.lock().clone()
    }

    /// Accepts an upload if it passes the intake policy.
    ///
    /// A refused upload leaves the previous image in place and stores the
    /// reason as the error message.
    pub fn upload(&self, image: EncodedImage) -> Result<()> {
        let mut state = self.lock();
        match self.intake.check(&image) {
            Ok(()) => {
                tracing::debug!(name = image.name(), media_type = image.media_type(), "image uploaded");
                state.set_source(image);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(name = image.name(), "upload refused: {e}");
                state.reject_upload(&e);
                Err(e)
            }
        }
    }

    /// Records an upload that could not be read at all.
    pub fn upload_failed(&self, error: &StudioError) {
        tracing::error!(error = %error, "failed to read uploaded image");
        self.lock().reject_upload(error);
    }

    /// Switches mode.
    pub fn set_mode(&self, mode: Mode) {
        self.lock().set_mode(mode);
    }

    /// Replaces the edit instruction.
    pub fn set_instruction(&self, instruction: impl Into<String>) {
        self.lock().set_instruction(instruction);
    }

    /// Runs one submission to completion.
    ///
    /// Failures are stored in the state as a display message rather than
    /// returned.
    pub async fn submit(&self) -> SubmitOutcome {
        let submission = match self.lock().begin(&self.product_shot_prompt) {
            Ok(submission) => submission,
            Err(Rejection::Busy) => {
                tracing::debug!("submission ignored: request already in flight");
                return SubmitOutcome::Ignored;
            }
            Err(Rejection::Invalid(e)) => {
                tracing::warn!("submission rejected: {e}");
                return SubmitOutcome::Rejected;
            }
        };

        tracing::info!(
            mode = %submission.mode,
            gateway = self.gateway.name(),
            image = submission.image.name(),
            "submitting transformation"
        );

        let result = self
            .gateway
            .transform(&submission.image, &submission.instruction)
            .await;

        let outcome = match &result {
            Ok(image) => {
                tracing::info!(payload_len = image.data.len(), "transformation succeeded");
                SubmitOutcome::Succeeded
            }
            Err(e) => {
                tracing::error!(error = %e, upstream = e.is_upstream(), "transformation failed");
                SubmitOutcome::Failed
            }
        };

        self.lock().complete(result);
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, RequestState> {
        // State transitions never panic midway, so a poisoned lock still holds
        // a consistent state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_API_ERROR;
    use crate::image::GeneratedImage;
    use crate::studio::prompt::PRODUCT_SHOT_PROMPT;
    use crate::studio::state::Phase;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Scripted gateway that records every call.
    struct FakeGateway {
        calls: Mutex<Vec<(EncodedImage, String)>>,
        reply: fn() -> Result<GeneratedImage>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeGateway {
        fn replying(reply: fn() -> Result<GeneratedImage>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
                gate: None,
            }
        }

        fn calls(&self) -> Vec<(EncodedImage, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageGateway for FakeGateway {
        async fn transform(
            &self,
            image: &EncodedImage,
            instruction: &str,
        ) -> Result<GeneratedImage> {
            self.calls
                .lock()
                .unwrap()
                .push((image.clone(), instruction.to_string()));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            (self.reply)()
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn ok_image() -> Result<GeneratedImage> {
        Ok(GeneratedImage::new("AAAA"))
    }

    fn no_image() -> Result<GeneratedImage> {
        Err(StudioError::NoImageInResponse)
    }

    fn shirt() -> EncodedImage {
        EncodedImage::new("iVBORw0KGgo=", "image/png", "shirt.png")
    }

    #[tokio::test]
    async fn test_edit_submission_makes_one_call() {
        let studio = Studio::new(FakeGateway::replying(ok_image));
        studio.upload(shirt()).unwrap();
        studio.set_instruction("add a retro filter");

        assert_eq!(studio.submit().await, SubmitOutcome::Succeeded);

        let calls = studio.gateway().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, shirt());
        assert_eq!(calls[0].1, "add a retro filter");

        let state = studio.snapshot();
        assert_eq!(state.result_image().map(|i| i.data.as_str()), Some("AAAA"));
        assert!(state.error_message().is_none());
        assert!(!state.is_busy());
    }

    #[tokio::test]
    async fn test_no_image_makes_no_call() {
        for mode in [Mode::Edit, Mode::ProductShot] {
            let studio = Studio::new(FakeGateway::replying(ok_image));
            studio.set_mode(mode);
            studio.set_instruction("anything");

            assert_eq!(studio.submit().await, SubmitOutcome::Rejected);
            assert!(studio.gateway().calls().is_empty());
            assert_eq!(
                studio.snapshot().error_message(),
                Some("Please upload an image first.")
            );
        }
    }

    #[tokio::test]
    async fn test_whitespace_instruction_reaches_gateway() {
        let studio = Studio::new(FakeGateway::replying(ok_image));
        studio.upload(shirt()).unwrap();
        studio.set_instruction(" ");

        assert_eq!(studio.submit().await, SubmitOutcome::Succeeded);
        let calls = studio.gateway().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, " ");
    }

    #[tokio::test]
    async fn test_empty_instruction_keeps_previous_result() {
        let studio = Studio::new(FakeGateway::replying(ok_image));
        studio.upload(shirt()).unwrap();
        studio.set_instruction("edit");
        assert_eq!(studio.submit().await, SubmitOutcome::Succeeded);

        studio.set_instruction("");
        assert_eq!(studio.submit().await, SubmitOutcome::Rejected);
        assert_eq!(studio.gateway().calls().len(), 1);

        let state = studio.snapshot();
        assert_eq!(state.result_image().map(|i| i.data.as_str()), Some("AAAA"));
        assert_eq!(state.error_message(), Some("Please enter an editing prompt."));
    }

    #[tokio::test]
    async fn test_empty_instruction_makes_no_call() {
        let studio = Studio::new(FakeGateway::replying(ok_image));
        studio.upload(shirt()).unwrap();

        assert_eq!(studio.submit().await, SubmitOutcome::Rejected);
        assert!(studio.gateway().calls().is_empty());
        assert_eq!(
            studio.snapshot().error_message(),
            Some("Please enter an editing prompt.")
        );
    }

    #[tokio::test]
    async fn test_product_shot_uses_fixed_prompt() {
        let studio = Studio::new(FakeGateway::replying(ok_image));
        studio.upload(shirt()).unwrap();
        studio.set_instruction("turn it into a pirate ship");
        studio.set_mode(Mode::ProductShot);

        assert_eq!(studio.submit().await, SubmitOutcome::Succeeded);
        let calls = studio.gateway().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, PRODUCT_SHOT_PROMPT);
    }

    #[tokio::test]
    async fn test_configured_product_shot_prompt() {
        let config = StudioConfig::default().with_product_shot_prompt("white background please");
        let studio = Studio::with_gateway(FakeGateway::replying(ok_image), config);
        studio.upload(shirt()).unwrap();
        studio.set_mode(Mode::ProductShot);

        studio.submit().await;
        assert_eq!(studio.gateway().calls()[0].1, "white background please");
    }

    #[tokio::test]
    async fn test_missing_image_in_response() {
        let studio = Studio::new(FakeGateway::replying(no_image));
        studio.upload(shirt()).unwrap();
        studio.set_instruction("edit");

        assert_eq!(studio.submit().await, SubmitOutcome::Failed);
        let state = studio.snapshot();
        assert!(state.result_image().is_none());
        assert_eq!(state.error_message(), Some(GENERIC_API_ERROR));
        assert_eq!(state.phase(), Phase::Failed);
    }

    #[tokio::test]
    async fn test_unconfigured_gemini_reports_configuration() {
        let studio = Studio::from_config(StudioConfig::default());
        studio.upload(shirt()).unwrap();
        studio.set_mode(Mode::ProductShot);

        assert_eq!(studio.submit().await, SubmitOutcome::Failed);
        let message = studio.snapshot().error_message().unwrap().to_string();
        assert_eq!(message, "Gemini API Key is not configured. Cannot make API requests.");
    }

    #[tokio::test]
    async fn test_resubmit_while_busy_is_ignored() {
        let gate = Arc::new(Notify::new());
        let gateway = FakeGateway {
            calls: Mutex::new(Vec::new()),
            reply: ok_image,
            gate: Some(gate.clone()),
        };
        let studio = Arc::new(Studio::new(gateway));
        studio.upload(shirt()).unwrap();
        studio.set_instruction("edit");

        let first = tokio::spawn({
            let studio = studio.clone();
            async move { studio.submit().await }
        });

        // Wait until the first submission is parked inside the gateway.
        while studio.gateway().calls().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(studio.snapshot().is_busy());

        assert_eq!(studio.submit().await, SubmitOutcome::Ignored);
        assert_eq!(studio.gateway().calls().len(), 1);

        gate.notify_one();
        assert_eq!(first.await.unwrap(), SubmitOutcome::Succeeded);
        assert!(!studio.snapshot().is_busy());
        assert_eq!(studio.gateway().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_refused_by_policy() {
        let studio = Studio::new(FakeGateway::replying(ok_image));
        let err = studio
            .upload(EncodedImage::new("R0lGODlh", "image/gif", "anim.gif"))
            .unwrap_err();

        assert!(matches!(err, StudioError::Validation(_)));
        let state = studio.snapshot();
        assert!(state.source_image().is_none());
        assert!(state.error_message().unwrap().contains("image/gif"));
    }

    #[tokio::test]
    async fn test_upload_failed_is_reported() {
        let studio = Studio::new(FakeGateway::replying(ok_image));
        studio.upload_failed(&StudioError::Decode("permission denied".into()));
        assert_eq!(
            studio.snapshot().error_message(),
            Some("Failed to read the image file.")
        );
    }
}
