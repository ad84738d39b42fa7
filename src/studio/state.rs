//! Request state and its transitions.
//!
//! Every transition is a plain method on [`RequestState`]; nothing here
//! performs I/O.

use crate::error::{Result, StudioError};
use crate::image::{EncodedImage, GeneratedImage};
use crate::studio::mode::Mode;
use serde::Serialize;

const MISSING_IMAGE: &str = "Please upload an image first.";
const MISSING_INSTRUCTION: &str = "Please enter an editing prompt.";
const UNREADABLE_UPLOAD: &str = "Failed to read the image file.";

/// Where the studio is in the submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Nothing submitted, or inputs changed since.
    Idle,
    /// A request is in flight.
    Submitting,
    /// Last submission produced an image.
    Succeeded,
    /// Last submission or upload ended with an error message.
    Failed,
}

/// Everything the presentation layer reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    mode: Mode,
    instruction: String,
    source_image: Option<EncodedImage>,
    result_image: Option<GeneratedImage>,
    busy: bool,
    error_message: Option<String>,
}

/// A validated request ready to hand to a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Mode the submission was made in.
    pub mode: Mode,
    /// Image to transform.
    pub image: EncodedImage,
    /// Instruction actually sent.
    pub instruction: String,
}

/// Why [`RequestState::begin`] did not start a request.
#[derive(Debug)]
pub enum Rejection {
    /// A request is already in flight; nothing changed.
    Busy,
    /// Inputs are incomplete; the message is stored in the state.
    Invalid(StudioError),
}

impl RequestState {
    /// Creates an idle state in edit mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current instruction text, kept even while in product-shot mode.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Uploaded image, if any.
    pub fn source_image(&self) -> Option<&EncodedImage> {
        self.source_image.as_ref()
    }

    /// Result of the last successful submission.
    pub fn result_image(&self) -> Option<&GeneratedImage> {
        self.result_image.as_ref()
    }

    /// Whether a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Message to display, if the last action failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Derived phase for display.
    pub fn phase(&self) -> Phase {
        if self.busy {
            Phase::Submitting
        } else if self.error_message.is_some() {
            Phase::Failed
        } else if self.result_image.is_some() {
            Phase::Succeeded
        } else {
            Phase::Idle
        }
    }

    /// Replaces the uploaded image and clears the previous outcome.
    pub fn set_source(&mut self, image: EncodedImage) {
        self.source_image = Some(image);
        self.result_image = None;
        self.error_message = None;
    }

    /// Records an upload that could not be read or was refused.
    ///
    /// The previously uploaded image, if any, is kept.
    pub fn reject_upload(&mut self, error: &StudioError) {
        let message = match error {
            StudioError::Validation(msg) => msg.clone(),
            _ => UNREADABLE_UPLOAD.to_string(),
        };
        self.result_image = None;
        self.error_message = Some(message);
    }

    /// Switches mode. The image and instruction are kept.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Replaces the instruction text.
    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.instruction = instruction.into();
    }

    /// Validates inputs and moves to the submitting phase.
    ///
    /// In product-shot mode `product_shot_prompt` is sent instead of the
    /// stored instruction.
    pub fn begin(&mut self, product_shot_prompt: &str) -> std::result::Result<Submission, Rejection> {
        if self.busy {
            return Err(Rejection::Busy);
        }

        let Some(image) = self.source_image.clone() else {
            return Err(self.invalid(MISSING_IMAGE));
        };

        let instruction = match self.mode {
            Mode::Edit if self.instruction.is_empty() => {
                return Err(self.invalid(MISSING_INSTRUCTION));
            }
            Mode::Edit => self.instruction.clone(),
            Mode::ProductShot => product_shot_prompt.to_string(),
        };

        self.busy = true;
        self.result_image = None;
        self.error_message = None;

        Ok(Submission {
            mode: self.mode,
            image,
            instruction,
        })
    }

    /// Stores the outcome of the in-flight request and leaves the submitting phase.
    pub fn complete(&mut self, outcome: Result<GeneratedImage>) {
        self.busy = false;
        match outcome {
            Ok(image) => {
                self.result_image = Some(image);
                self.error_message = None;
            }
            Err(e) => {
                self.result_image = None;
                self.error_message = Some(e.user_message());
            }
        }
    }

    /// The previous result, if any, stays on display.
    fn invalid(&mut self, message: &str) -> Rejection {
        self.error_message = Some(message.to_string());
        Rejection::Invalid(StudioError::Validation(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_API_ERROR;

    const PROMPT: &str = "fixed product prompt";

    fn image() -> EncodedImage {
        EncodedImage::new("AAAA", "image/png", "shirt.png")
    }

    fn ready_state() -> RequestState {
        let mut state = RequestState::new();
        state.set_source(image());
        state.set_instruction("make it pop");
        state
    }

    #[test]
    fn test_initial_state() {
        let state = RequestState::new();
        assert_eq!(state.mode(), Mode::Edit);
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_phase_serializes_kebab_case() {
        let json = serde_json::to_string(&Phase::Submitting).unwrap();
        assert_eq!(json, "\"submitting\"");
    }

    #[test]
    fn test_begin_without_image() {
        for mode in [Mode::Edit, Mode::ProductShot] {
            let mut state = RequestState::new();
            state.set_mode(mode);
            state.set_instruction("anything");

            let rejection = state.begin(PROMPT).unwrap_err();
            assert!(matches!(rejection, Rejection::Invalid(StudioError::Validation(_))));
            assert_eq!(state.error_message(), Some(MISSING_IMAGE));
            assert!(!state.is_busy());
        }
    }

    #[test]
    fn test_begin_edit_requires_instruction() {
        let mut state = RequestState::new();
        state.set_source(image());
        state.set_instruction("");

        assert!(matches!(state.begin(PROMPT), Err(Rejection::Invalid(_))));
        assert_eq!(state.error_message(), Some(MISSING_INSTRUCTION));
        assert!(!state.is_busy());
    }

    #[test]
    fn test_begin_edit_accepts_whitespace_instruction() {
        let mut state = RequestState::new();
        state.set_source(image());
        state.set_instruction(" ");

        let submission = state.begin(PROMPT).unwrap();
        assert_eq!(submission.instruction, " ");
        assert!(state.is_busy());
    }

    #[test]
    fn test_validation_failure_keeps_previous_result() {
        let mut state = ready_state();
        state.begin(PROMPT).unwrap();
        state.complete(Ok(GeneratedImage::new("BBBB")));

        state.set_instruction("");
        assert!(matches!(state.begin(PROMPT), Err(Rejection::Invalid(_))));

        assert_eq!(state.result_image().map(|i| i.data.as_str()), Some("BBBB"));
        assert_eq!(state.error_message(), Some(MISSING_INSTRUCTION));
        assert!(!state.is_busy());
    }

    #[test]
    fn test_begin_edit_sends_instruction() {
        let mut state = ready_state();
        let submission = state.begin(PROMPT).unwrap();

        assert_eq!(submission.instruction, "make it pop");
        assert_eq!(submission.image, image());
        assert!(state.is_busy());
        assert_eq!(state.phase(), Phase::Submitting);
    }

    #[test]
    fn test_begin_product_shot_ignores_instruction() {
        let mut state = ready_state();
        state.set_mode(Mode::ProductShot);
        let submission = state.begin(PROMPT).unwrap();
        assert_eq!(submission.instruction, PROMPT);
        assert_eq!(submission.mode, Mode::ProductShot);

        // Empty instruction is fine in product-shot mode.
        let mut state = RequestState::new();
        state.set_source(image());
        state.set_mode(Mode::ProductShot);
        assert!(state.begin(PROMPT).is_ok());
    }

    #[test]
    fn test_begin_while_busy_changes_nothing() {
        let mut state = ready_state();
        state.begin(PROMPT).unwrap();
        let before = state.clone();

        assert!(matches!(state.begin(PROMPT), Err(Rejection::Busy)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_begin_clears_previous_outcome() {
        let mut state = ready_state();
        state.begin(PROMPT).unwrap();
        state.complete(Err(StudioError::NoImageInResponse));
        assert!(state.error_message().is_some());

        state.begin(PROMPT).unwrap();
        assert!(state.error_message().is_none());
        assert!(state.result_image().is_none());
    }

    #[test]
    fn test_complete_success() {
        let mut state = ready_state();
        state.begin(PROMPT).unwrap();
        state.complete(Ok(GeneratedImage::new("BBBB")));

        assert!(!state.is_busy());
        assert_eq!(state.result_image().map(|i| i.data.as_str()), Some("BBBB"));
        assert!(state.error_message().is_none());
        assert_eq!(state.phase(), Phase::Succeeded);
    }

    #[test]
    fn test_complete_failure() {
        let mut state = ready_state();
        state.begin(PROMPT).unwrap();
        state.complete(Err(StudioError::Upstream {
            status: Some(500),
            message: "internal".into(),
        }));

        assert!(!state.is_busy());
        assert!(state.result_image().is_none());
        assert_eq!(state.error_message(), Some(GENERIC_API_ERROR));
        assert_eq!(state.phase(), Phase::Failed);
    }

    #[test]
    fn test_mode_switch_keeps_inputs() {
        let mut state = ready_state();
        state.set_mode(Mode::ProductShot);
        state.set_mode(Mode::Edit);

        assert_eq!(state.source_image(), Some(&image()));
        assert_eq!(state.instruction(), "make it pop");
    }

    #[test]
    fn test_new_upload_clears_outcome() {
        let mut state = ready_state();
        state.begin(PROMPT).unwrap();
        state.complete(Ok(GeneratedImage::new("BBBB")));

        state.set_source(EncodedImage::new("CCCC", "image/jpeg", "other.jpg"));
        assert!(state.result_image().is_none());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_reject_upload_keeps_previous_image() {
        let mut state = ready_state();
        state.reject_upload(&StudioError::Decode("eof".into()));

        assert_eq!(state.source_image(), Some(&image()));
        assert_eq!(state.error_message(), Some(UNREADABLE_UPLOAD));

        state.reject_upload(&StudioError::Validation("too big".into()));
        assert_eq!(state.error_message(), Some("too big"));
    }
}
