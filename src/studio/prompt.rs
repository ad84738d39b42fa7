//! Fixed instructions.

/// Instruction sent in product-shot mode.
///
/// Not user-editable; [`StudioConfig`](crate::StudioConfig) carries a copy
/// that can be replaced.
pub const PRODUCT_SHOT_PROMPT: &str = "Create a detailed, high-quality product image of the \
clothing in the photo. The image must have a clean, solid white background and be a direct, \
front-facing view. Remove any distractions, people, or clutter from the background. The \
lighting should be professional and even, mimicking a studio photoshoot. The final image \
should be a realistic representation of the original clothing item.";
