//! Errors raised while reading and writing RecipeMD documents

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Why a recipe file could not be turned into a [`Recipe`](crate::domain::Recipe)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to read {}: {message}", path.display())]
    FileNotReadable {
        path: PathBuf,
        kind: io::ErrorKind,
        message: String,
    },

    #[error("File is not valid UTF-8: {}", path.display())]
    Encoding { path: PathBuf },

    #[error("Missing title (expected a '# Title' heading before the first rule)")]
    MissingTitle,

    #[error("Invalid RecipeMD: {reason}")]
    InvalidFormat { reason: String },
}

impl ParseError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ParseError::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Classifies an I/O failure while reading `path`
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ParseError::FileNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::InvalidData => ParseError::Encoding {
                path: path.to_path_buf(),
            },
            kind => ParseError::FileNotReadable {
                path: path.to_path_buf(),
                kind,
                message: err.to_string(),
            },
        }
    }

    /// True when the content was read but is not valid RecipeMD, so a
    /// placeholder recipe can still be shown for the file
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            ParseError::MissingTitle | ParseError::InvalidFormat { .. }
        )
    }
}

/// Why a recipe cannot be written as RecipeMD
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("Recipe title is empty")]
    EmptyTitle,

    #[error("Recipe has no ingredients")]
    NoIngredients,

    #[error("Tag '{tag}' cannot be written: tags must be non-empty and contain no commas or asterisks")]
    InvalidTag { tag: String },

    #[error("Ingredient names must not be empty")]
    EmptyIngredientName,

    #[error("{field} must fit on a single line: '{value}'")]
    Multiline { field: &'static str, value: String },

    #[error("'{text}' would not read back as the same heading")]
    InvalidHeading { text: String },

    #[error("Description would be read as recipe structure: '{block}'")]
    AmbiguousDescription { block: String },

    #[error("Yield '{text}' cannot be written: yields must be non-empty and contain no commas or asterisks")]
    InvalidYield { text: String },

    #[error("Ingredient group cannot be written: {reason}")]
    InvalidGroup { reason: &'static str },

    #[error("Ingredient '{name}' would not read back the same")]
    AmbiguousIngredient { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_classified() {
        let path = Path::new("soup.md");

        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(
            ParseError::from_io(path, &missing),
            ParseError::FileNotFound {
                path: path.to_path_buf()
            }
        );

        let bad_utf8 = io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        assert!(matches!(
            ParseError::from_io(path, &bad_utf8),
            ParseError::Encoding { .. }
        ));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        match ParseError::from_io(path, &denied) {
            ParseError::FileNotReadable { kind, .. } => {
                assert_eq!(kind, io::ErrorKind::PermissionDenied)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn content_errors_allow_placeholders() {
        assert!(ParseError::MissingTitle.is_content_error());
        assert!(ParseError::invalid("no rule").is_content_error());
        assert!(!ParseError::Encoding {
            path: PathBuf::from("x.md")
        }
        .is_content_error());
    }
}
