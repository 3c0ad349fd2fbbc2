//! A recipe together with the file it was read from

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::domain::Recipe;
use crate::recipemd::ParseError;

/// A recipe backed by a file in the store's folder
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeFile {
    pub path: PathBuf,

    /// Modification time when the file was last read or written by the store
    pub modified: Option<DateTime<Utc>>,

    pub recipe: Recipe,

    /// Set on placeholder recipes for files that could not be parsed
    pub parse_error: Option<ParseError>,
}

impl RecipeFile {
    pub fn new(path: PathBuf, modified: Option<DateTime<Utc>>, recipe: Recipe) -> Self {
        Self {
            path,
            modified,
            recipe,
            parse_error: None,
        }
    }

    /// A placeholder titled after the file name, carrying the parse error
    pub fn fallback(path: PathBuf, modified: Option<DateTime<Utc>>, error: ParseError) -> Self {
        let recipe = Recipe::new(fallback_title(&path));
        Self {
            path,
            modified,
            recipe,
            parse_error: Some(error),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.parse_error.is_some()
    }

    /// File name without the folder
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Title for a recipe that could not be parsed: the file name without extension
pub fn fallback_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_uses_file_stem() {
        let file = RecipeFile::fallback(
            PathBuf::from("/recipes/banana-bread.md"),
            None,
            ParseError::MissingTitle,
        );
        assert_eq!(file.recipe.title, "banana-bread");
        assert!(file.is_fallback());
        assert_eq!(file.recipe.ingredient_count(), 0);
        assert_eq!(file.file_name(), "banana-bread.md");
    }

    #[test]
    fn fallback_title_for_odd_names() {
        assert_eq!(fallback_title(Path::new("/r/.md")), ".md");
        assert_eq!(fallback_title(Path::new("/")), "Untitled");
    }
}
