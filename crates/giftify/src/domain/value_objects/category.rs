//! GiftCategory - Vibe classification used to pick a catalog shelf

use serde::{Deserialize, Serialize};

/// Gift category derived from a vibe prompt or a persona's gift style
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GiftCategory {
    Chaotic,
    Roast,
    Thoughtful,
    Foodie,
    Techie,
    #[default]
    Default,
}

impl GiftCategory {
    /// Categories in classification order. The first keyword hit wins.
    pub const CLASSIFICATION_ORDER: [GiftCategory; 5] = [
        GiftCategory::Chaotic,
        GiftCategory::Roast,
        GiftCategory::Thoughtful,
        GiftCategory::Foodie,
        GiftCategory::Techie,
    ];

    pub const ALL: [GiftCategory; 6] = [
        GiftCategory::Chaotic,
        GiftCategory::Roast,
        GiftCategory::Thoughtful,
        GiftCategory::Foodie,
        GiftCategory::Techie,
        GiftCategory::Default,
    ];

    /// Lowercase keywords that select this category
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            GiftCategory::Chaotic => &[
                "chaotic", "crazy", "wild", "random", "weird", "absurd", "unhinged",
            ],
            GiftCategory::Roast => &["roast", "burn", "tease", "joke", "funny", "savage", "brutal"],
            GiftCategory::Thoughtful => &[
                "thoughtful",
                "sweet",
                "meaningful",
                "sentimental",
                "heartfelt",
            ],
            GiftCategory::Foodie => &[
                "food",
                "eat",
                "snack",
                "hungry",
                "delicious",
                "taste",
                "cook",
            ],
            GiftCategory::Techie => &[
                "tech",
                "nerd",
                "geek",
                "computer",
                "gaming",
                "code",
                "gadget",
            ],
            GiftCategory::Default => &[],
        }
    }

    /// Classify free text by case-insensitive substring match
    pub fn classify(prompt: &str) -> GiftCategory {
        let prompt = prompt.to_lowercase();
        Self::CLASSIFICATION_ORDER
            .into_iter()
            .find(|category| category.keywords().iter().any(|kw| prompt.contains(kw)))
            .unwrap_or(GiftCategory::Default)
    }

    /// Map a persona gift style onto a category. Unknown styles fall back to `Default`.
    pub fn from_style(style: &str) -> GiftCategory {
        style.parse().unwrap_or(GiftCategory::Default)
    }
}

impl std::fmt::Display for GiftCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GiftCategory::Chaotic => write!(f, "chaotic"),
            GiftCategory::Roast => write!(f, "roast"),
            GiftCategory::Thoughtful => write!(f, "thoughtful"),
            GiftCategory::Foodie => write!(f, "foodie"),
            GiftCategory::Techie => write!(f, "techie"),
            GiftCategory::Default => write!(f, "default"),
        }
    }
}

impl std::str::FromStr for GiftCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chaotic" => Ok(GiftCategory::Chaotic),
            "roast" => Ok(GiftCategory::Roast),
            "thoughtful" => Ok(GiftCategory::Thoughtful),
            "foodie" => Ok(GiftCategory::Foodie),
            "techie" => Ok(GiftCategory::Techie),
            "default" => Ok(GiftCategory::Default),
            _ => Err(format!("Unknown gift category: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_chaotic() {
        assert_eq!(
            GiftCategory::classify("send something chaotic"),
            GiftCategory::Chaotic
        );
        assert_eq!(GiftCategory::classify("UNHINGED energy"), GiftCategory::Chaotic);
    }

    #[test]
    fn test_first_category_wins() {
        // "funny" is a roast keyword, "random" is chaotic; chaotic is tested first
        assert_eq!(
            GiftCategory::classify("something funny and random"),
            GiftCategory::Chaotic
        );
    }

    #[test]
    fn test_substring_match() {
        // "eat" inside "great"
        assert_eq!(GiftCategory::classify("a great gift"), GiftCategory::Foodie);
    }

    #[test]
    fn test_unmatched_is_default() {
        assert_eq!(GiftCategory::classify("surprise me"), GiftCategory::Default);
        assert_eq!(GiftCategory::classify(""), GiftCategory::Default);
    }

    #[test]
    fn test_unknown_style_is_default() {
        assert_eq!(GiftCategory::from_style("practical"), GiftCategory::Default);
        assert_eq!(GiftCategory::from_style("Techie"), GiftCategory::Techie);
    }
}
