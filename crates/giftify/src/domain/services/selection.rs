//! Selection Engine
//!
//! Maps (vibe prompt, persona hints, budget) to a concrete catalog item:
//! 1. Classify the prompt into a category (first keyword hit wins)
//! 2. A persona gift style overrides the detected category
//! 3. Filter that category's shelf by budget
//! 4. Broaden to the whole catalog if the shelf has nothing in budget
//! 5. Pick uniformly at random among the survivors

use std::sync::Arc;

use thiserror::Error;

use super::catalog::{CatalogItem, GiftCatalog};
use crate::domain::entities::{GiftSelection, PersonaHints};
use crate::domain::value_objects::GiftCategory;
use crate::ports::RandomSource;

/// Reasoning recorded on a gift cancelled for lack of a match
pub const NO_SUITABLE_ITEM_REASON: &str = "no suitable item in budget";

/// Nothing in the catalog fits the budget
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("no suitable item in budget")]
pub struct NoSuitableItem;

/// Chosen item plus the explanation shown to the sender
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub selection: GiftSelection,
    pub reasoning: String,
}

pub struct SelectionEngine {
    catalog: GiftCatalog,
    random: Arc<dyn RandomSource>,
}

impl SelectionEngine {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self {
            catalog: GiftCatalog,
            random,
        }
    }

    /// Category the request resolves to, persona style first
    pub fn resolve_category(vibe_prompt: &str, persona: Option<&PersonaHints>) -> GiftCategory {
        match persona.and_then(PersonaHints::style) {
            Some(style) => GiftCategory::from_style(style),
            None => GiftCategory::classify(vibe_prompt),
        }
    }

    pub fn select(
        &self,
        vibe_prompt: &str,
        persona: Option<&PersonaHints>,
        budget_min: f64,
        budget_max: f64,
    ) -> Result<Pick, NoSuitableItem> {
        let category = Self::resolve_category(vibe_prompt, persona);
        let in_budget = |item: &&CatalogItem| budget_min <= item.price && item.price <= budget_max;

        let mut candidates: Vec<&CatalogItem> =
            self.catalog.shelf(category).iter().filter(in_budget).collect();

        if candidates.is_empty() {
            tracing::debug!(
                %category,
                "no {} item in budget, broadening to full catalog",
                category
            );
            candidates = self.catalog.all().filter(in_budget).collect();
        }

        if candidates.is_empty() {
            return Err(NoSuitableItem);
        }

        let index = self.random.index(candidates.len()).min(candidates.len() - 1);
        let item = candidates[index];

        Ok(Pick {
            selection: GiftSelection {
                name: item.name.to_string(),
                description: item.description.to_string(),
                price: item.price,
                image_url: item.image_url.to_string(),
                category,
            },
            reasoning: reasoning(category, item.name),
        })
    }
}

/// Explanation keyed by the requested category, even when the item came
/// from the broadened search
fn reasoning(category: GiftCategory, name: &str) -> String {
    match category {
        GiftCategory::Chaotic => format!(
            "Based on the chaotic vibe requested, I picked '{name}' because it's absolutely unhinged and will definitely get a reaction!"
        ),
        GiftCategory::Roast => format!(
            "For maximum roasting potential, '{name}' is perfect. It's funny but not too mean - the sweet spot of friendship roasts."
        ),
        GiftCategory::Thoughtful => format!(
            "'{name}' shows you really care and put thought into this gift. It's meaningful without being over the top."
        ),
        GiftCategory::Foodie => format!(
            "For the food lover in your life, '{name}' is a delicious choice that'll definitely be appreciated (and devoured)."
        ),
        GiftCategory::Techie => format!(
            "'{name}' is peak tech humor - your friend will either love it or question your sanity. Either way, mission accomplished."
        ),
        GiftCategory::Default => format!(
            "'{name}' is a solid choice that works for pretty much anyone. Safe but still fun!"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedRandom, SeededRandom};
    use proptest::prelude::*;

    fn engine() -> SelectionEngine {
        SelectionEngine::new(Arc::new(SeededRandom::new(7)))
    }

    #[test]
    fn test_chaotic_prompt_picks_chaotic_item() {
        let pick = engine()
            .select("send something chaotic", None, 200.0, 500.0)
            .unwrap();
        assert_eq!(pick.selection.category, GiftCategory::Chaotic);
        // Only the goat is chaotic and within 200..=500
        assert_eq!(pick.selection.name, "Screaming Goat Toy");
        assert!(pick.reasoning.contains("chaotic vibe"));
    }

    #[test]
    fn test_persona_style_overrides_prompt() {
        let persona = PersonaHints::with_style("thoughtful");
        let pick = engine()
            .select("send something chaotic", Some(&persona), 0.0, 5000.0)
            .unwrap();
        assert_eq!(pick.selection.category, GiftCategory::Thoughtful);
        let thoughtful: Vec<_> = GiftCatalog
            .shelf(GiftCategory::Thoughtful)
            .iter()
            .map(|i| i.name)
            .collect();
        assert!(thoughtful.contains(&pick.selection.name.as_str()));
    }

    #[test]
    fn test_blank_persona_style_is_ignored() {
        let persona = PersonaHints::with_style("  ");
        assert_eq!(
            SelectionEngine::resolve_category("so chaotic", Some(&persona)),
            GiftCategory::Chaotic
        );
    }

    #[test]
    fn test_broadens_but_keeps_requested_reasoning() {
        // Roast shelf tops out at 349; only the broadened search can satisfy 1900..=2000
        let pick = engine()
            .select("roast them", None, 1900.0, 2000.0)
            .unwrap();
        assert_eq!(pick.selection.name, "Keyboard Waffle Maker");
        assert_eq!(pick.selection.category, GiftCategory::Roast);
        assert!(pick.reasoning.starts_with("For maximum roasting potential"));
    }

    #[test]
    fn test_nothing_in_budget() {
        assert_eq!(
            engine().select("anything", None, 10.0, 20.0),
            Err(NoSuitableItem)
        );
    }

    #[test]
    fn test_random_source_decides_among_candidates() {
        // Default shelf within 0..=1000: Mystery Box, Plant, Socks
        let first = SelectionEngine::new(Arc::new(FixedRandom::new(0)))
            .select("surprise", None, 0.0, 1000.0)
            .unwrap();
        let last = SelectionEngine::new(Arc::new(FixedRandom::new(2)))
            .select("surprise", None, 0.0, 1000.0)
            .unwrap();
        assert_eq!(first.selection.name, "Mystery Box");
        assert_eq!(last.selection.name, "Cozy Socks");
    }

    #[test]
    fn test_out_of_range_index_is_clamped() {
        let pick = SelectionEngine::new(Arc::new(FixedRandom::new(99)))
            .select("surprise", None, 0.0, 1000.0)
            .unwrap();
        assert_eq!(pick.selection.name, "Cozy Socks");
    }

    proptest! {
        #[test]
        fn prop_selected_price_within_budget(
            budget_min in 0.0f64..2500.0,
            spread in 0.0f64..2500.0,
            seed in any::<u64>(),
            prompt in "[a-z ]{0,24}",
        ) {
            let budget_max = budget_min + spread;
            let engine = SelectionEngine::new(Arc::new(SeededRandom::new(seed)));
            if let Ok(pick) = engine.select(&prompt, None, budget_min, budget_max) {
                prop_assert!(budget_min <= pick.selection.price);
                prop_assert!(pick.selection.price <= budget_max);
            }
        }
    }
}
