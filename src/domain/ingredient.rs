//! Ingredients and (nested) ingredient groups

use serde::Serialize;

use super::amount::{Amount, DisplayFormat};

/// A single ingredient line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    /// Target of a Markdown link on the name: a file name or a recipe title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_recipe: Option<String>,
}

impl Ingredient {
    /// Creates an ingredient with no amount
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
            linked_recipe: None,
        }
    }

    /// Sets the amount
    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Links the ingredient to another recipe
    pub fn with_link(mut self, target: impl Into<String>) -> Self {
        self.linked_recipe = Some(target.into());
        self
    }

    /// Returns a copy with the amount multiplied
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self {
            name: self.name.clone(),
            amount: self.amount.as_ref().map(|a| a.scale(multiplier)),
            linked_recipe: self.linked_recipe.clone(),
        }
    }

    /// Human-readable line: amount and unit (if any) followed by the name
    pub fn display_text(&self, format: DisplayFormat) -> String {
        match &self.amount {
            Some(amount) => format!("{} {}", amount.format(format), self.name),
            None => self.name.clone(),
        }
    }
}

/// A titled or untitled set of ingredients, possibly with subgroups
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IngredientGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub ingredients: Vec<Ingredient>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subgroups: Vec<IngredientGroup>,
}

impl IngredientGroup {
    /// Creates an empty group with a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Creates an empty untitled group
    pub fn untitled() -> Self {
        Self::default()
    }

    /// Depth-first flattening: own ingredients, then each subgroup's
    pub fn all_ingredients(&self) -> Vec<&Ingredient> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Ingredient>) {
        out.extend(self.ingredients.iter());
        for group in &self.subgroups {
            group.collect_into(out);
        }
    }

    /// Number of ingredients in this group and all subgroups
    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
            + self
                .subgroups
                .iter()
                .map(IngredientGroup::ingredient_count)
                .sum::<usize>()
    }

    /// Returns a copy with every amount multiplied
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self {
            title: self.title.clone(),
            ingredients: self
                .ingredients
                .iter()
                .map(|i| i.scaled(multiplier))
                .collect(),
            subgroups: self
                .subgroups
                .iter()
                .map(|g| g.scaled(multiplier))
                .collect(),
        }
    }
}
