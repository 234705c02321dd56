// =============================================================================
// Shared types used across the indicator engine and the service layer
// =============================================================================

use serde::{Deserialize, Serialize};

/// One derived or coerced numeric column. `None` is the "undefined" marker:
/// insufficient history or an unparseable input cell.
pub type Column = Vec<Option<f64>>;

/// Canonical price-table fields recognised by the column normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
    ChangePercent,
}

impl Field {
    /// Fields that must be present (under either label set) for the engine to
    /// run.
    pub const REQUIRED: [Field; 5] = [
        Field::Date,
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
    ];

    /// The four price columns converted by the type coercer.
    pub const PRICES: [Field; 4] = [Field::Open, Field::High, Field::Low, Field::Close];

    /// Canonical column label after normalization.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
            Self::ChangePercent => "change_percent",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

/// Language used for indicator summaries and LLM prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLanguage {
    Japanese,
    English,
}

impl Default for PromptLanguage {
    fn default() -> Self {
        Self::Japanese
    }
}

impl std::fmt::Display for PromptLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Japanese => write!(f, "Japanese"),
            Self::English => write!(f, "English"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_canonical_name() {
        assert_eq!(Field::ChangePercent.to_string(), "change_percent");
        assert_eq!(Field::Close.to_string(), "close");
    }

    #[test]
    fn language_serialises_lowercase() {
        let json = serde_json::to_string(&PromptLanguage::English).unwrap();
        assert_eq!(json, "\"english\"");
        assert_eq!(PromptLanguage::default(), PromptLanguage::Japanese);
    }
}
