//! Recipe domain model
//!
//! A recipe is a title, optional description, tags, yields, grouped
//! ingredients and free-form instructions.

use serde::Serialize;

use super::amount::Amount;
use super::ingredient::{Ingredient, IngredientGroup};

/// Stated output quantities of a recipe ("4 servings", "12 cookies")
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Yield {
    pub amounts: Vec<Amount>,
}

impl Yield {
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

/// A parsed recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub tags: Vec<String>,

    #[serde(rename = "yield")]
    pub yields: Yield,

    pub ingredient_groups: Vec<IngredientGroup>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Recipe {
    /// Creates an empty recipe with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            tags: Vec::new(),
            yields: Yield::default(),
            ingredient_groups: Vec::new(),
            instructions: None,
        }
    }

    /// All ingredients across groups, in document order
    pub fn all_ingredients(&self) -> Vec<&Ingredient> {
        self.ingredient_groups
            .iter()
            .flat_map(IngredientGroup::all_ingredients)
            .collect()
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredient_groups
            .iter()
            .map(IngredientGroup::ingredient_count)
            .sum()
    }

    /// Returns true if the recipe carries the tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Returns a copy with every ingredient and yield amount multiplied
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self {
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            yields: Yield {
                amounts: self
                    .yields
                    .amounts
                    .iter()
                    .map(|a| a.scale(multiplier))
                    .collect(),
            },
            ingredient_groups: self
                .ingredient_groups
                .iter()
                .map(|g| g.scaled(multiplier))
                .collect(),
            instructions: self.instructions.clone(),
        }
    }

    /// Scales the recipe so that the yield with the target's unit matches it.
    ///
    /// Returns `None` when no yield has that unit or its value is zero.
    pub fn scale_to_yield(&self, target: &Amount) -> Option<Self> {
        let base = self.yields.amounts.iter().find(|a| {
            !a.is_text_only()
                && a.value() > 0.0
                && units_match(a.unit(), target.unit())
        })?;

        Some(self.scaled(target.value() / base.value()))
    }
}

fn units_match(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}
