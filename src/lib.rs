//! Recipe Shelf - a folder of RecipeMD recipes as a typed collection
//!
//! Recipes are plain Markdown files in the [RecipeMD](https://recipemd.org)
//! format. This crate parses and writes them, scales amounts, and keeps a
//! cached, sorted view of a folder that stays in step with changes made by
//! other programs.

pub mod cli;
pub mod domain;
pub mod recipemd;
pub mod storage;

pub use domain::{Amount, DisplayFormat, Ingredient, IngredientGroup, Recipe, Yield};
pub use recipemd::{parse, serialize, ParseError, SerializeError};
pub use storage::{RecipeFile, RecipeStore};
