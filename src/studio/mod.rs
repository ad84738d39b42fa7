//! Request orchestration: mode, instruction and the submit cycle.

mod mode;
mod orchestrator;
mod prompt;
mod state;

pub use mode::Mode;
pub use orchestrator::{Studio, SubmitOutcome};
pub use prompt::PRODUCT_SHOT_PROMPT;
pub use state::{Phase, Rejection, RequestState, Submission};
