//! # RecipeMD codec
//!
//! Reads and writes the [RecipeMD](https://recipemd.org) Markdown dialect.
//!
//! | Section | Markdown |
//! |---------|----------|
//! | Title | first `# heading` |
//! | Description | paragraphs before the first rule |
//! | Tags | paragraph wrapped in `*...*` |
//! | Yields | paragraph wrapped in `**...**` |
//! | Ingredients | list items between the first and second rule, grouped by headings |
//! | Instructions | everything after the second rule |
//!
//! Only the structure needed for these sections is recognised; inline
//! Markdown in descriptions and instructions is carried through untouched.

mod blocks;
mod error;
mod parser;
mod serializer;

pub use error::{ParseError, SerializeError};
pub use parser::parse;
pub use serializer::{serialize, serialize_with, SerializeOptions};
