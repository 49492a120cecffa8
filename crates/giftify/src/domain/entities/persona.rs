//! Persona hints - recipient preferences consumed by item selection

use serde::{Deserialize, Serialize};

/// Read-only view of a recipient's persona
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaHints {
    /// Preferred gift style; overrides the vibe detected from the prompt
    pub gift_style: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// low, medium, high, yolo
    pub budget_preference: Option<String>,
}

impl PersonaHints {
    pub fn with_style(style: impl Into<String>) -> Self {
        Self {
            gift_style: Some(style.into()),
            ..Self::default()
        }
    }

    /// Gift style, ignoring blank values
    pub fn style(&self) -> Option<&str> {
        self.gift_style
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
