//! File names for new recipes
//!
//! Titles are turned into lowercase hyphenated slugs (`Mom's "Special"
//! Cookies!` becomes `moms-special-cookies.md`). When the name is taken a
//! numeric suffix is appended: `-1`, `-2`, ...

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

/// Extension of recipe files
pub const EXTENSION: &str = "md";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    #[error("Title is empty")]
    EmptyTitle,

    #[error("Title '{title}' has no characters usable in a file name")]
    EmptySlug { title: String },
}

/// True for visible `.md` files; hidden files and temp files are skipped
pub fn is_recipe_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !name.starts_with('.')
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION))
}

/// Characters removed outright rather than turned into hyphens
const QUOTES: &[char] = &['\'', '"', '‘', '’', '“', '”', '`'];

/// Lowercase, hyphen-separated form of a title
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = false;

    for c in title.to_lowercase().chars() {
        if QUOTES.contains(&c) {
            continue;
        }
        let c = if c.is_whitespace() || c == '_' { '-' } else { c };
        if c == '-' {
            if !last_was_hyphen {
                slug.push('-');
                last_was_hyphen = true;
            }
        } else if c.is_alphanumeric() {
            slug.push(c);
            last_was_hyphen = false;
        }
    }

    slug.trim_matches('-').to_string()
}

/// Picks a file name for `title` that is not among `existing`.
///
/// `existing` must be the folder's current entries; names are compared
/// case-insensitively so case-insensitive file systems are safe too.
pub fn generate<I, S>(title: &str, existing: I) -> Result<String, FilenameError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if title.trim().is_empty() {
        return Err(FilenameError::EmptyTitle);
    }

    let slug = slugify(title);
    if slug.is_empty() {
        return Err(FilenameError::EmptySlug {
            title: title.to_string(),
        });
    }

    let taken: HashSet<String> = existing
        .into_iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect();

    let candidate = format!("{}.{}", slug, EXTENSION);
    if !taken.contains(&candidate) {
        return Ok(candidate);
    }

    let mut n = 1;
    loop {
        let candidate = format!("{}-{}.{}", slug, n, EXTENSION);
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn slug_strips_quotes_and_punctuation() {
        assert_eq!(slugify("Mom's \"Special\" Cookies!"), "moms-special-cookies");
        assert_eq!(slugify("Grandma’s “Best” Pie"), "grandmas-best-pie");
    }

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slugify("  Pasta __ al -- Forno  "), "pasta-al-forno");
        assert_eq!(slugify("Tea\tfor\ttwo"), "tea-for-two");
    }

    #[test]
    fn slug_keeps_non_ascii_letters() {
        assert_eq!(slugify("Crème Brûlée"), "crème-brûlée");
    }

    #[test]
    fn generate_plain_name() {
        assert_eq!(
            generate("Mom's \"Special\" Cookies!", NONE).unwrap(),
            "moms-special-cookies.md"
        );
    }

    #[test]
    fn generate_appends_suffix_on_collision() {
        let existing = ["moms-special-cookies.md"];
        assert_eq!(
            generate("Mom's \"Special\" Cookies!", existing).unwrap(),
            "moms-special-cookies-1.md"
        );

        let existing = ["soup.md", "soup-1.md", "soup-2.md"];
        assert_eq!(generate("Soup", existing).unwrap(), "soup-3.md");
    }

    #[test]
    fn first_free_suffix_fills_gaps() {
        let existing = ["soup.md", "soup-2.md"];
        assert_eq!(generate("Soup", existing).unwrap(), "soup-1.md");
    }

    #[test]
    fn collisions_ignore_case() {
        assert_eq!(generate("Soup", ["Soup.md"]).unwrap(), "soup-1.md");
    }

    #[test]
    fn recognises_recipe_files() {
        assert!(is_recipe_file(Path::new("/r/soup.md")));
        assert!(is_recipe_file(Path::new("/r/Soup.MD")));
        assert!(!is_recipe_file(Path::new("/r/soup.md.tmp")));
        assert!(!is_recipe_file(Path::new("/r/.soup.md")));
        assert!(!is_recipe_file(Path::new("/r/notes.txt")));
    }

    #[test]
    fn rejects_empty_titles() {
        assert_eq!(generate("   ", NONE), Err(FilenameError::EmptyTitle));
        assert!(matches!(
            generate("!!! ???", NONE),
            Err(FilenameError::EmptySlug { .. })
        ));
    }
}
