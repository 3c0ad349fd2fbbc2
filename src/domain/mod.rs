//! Domain models for recipe-shelf
//!
//! Contains the recipe data model and amount arithmetic without any I/O concerns.

pub mod fraction;
mod amount;
mod ingredient;
mod recipe;

pub use amount::{format_decimal, format_fraction, Amount, DisplayFormat};
pub use ingredient::{Ingredient, IngredientGroup};
pub use recipe::{Recipe, Yield};
