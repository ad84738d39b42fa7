//! Transformation modes.

use serde::Serialize;

/// Which transformation a submission performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Freeform edit driven by the user's instruction.
    #[default]
    Edit,
    /// Clothing photo to e-commerce product shot, using a fixed prompt.
    ProductShot,
}

impl Mode {
    /// Returns the label shown for this mode.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Edit => "Magic Editor",
            Self::ProductShot => "Product Shots",
        }
    }

    /// Returns true if this mode sends the user's instruction.
    pub fn uses_instruction(&self) -> bool {
        matches!(self, Self::Edit)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edit => write!(f, "edit"),
            Self::ProductShot => write!(f, "product-shot"),
        }
    }
}
