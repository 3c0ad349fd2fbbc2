//! RecipeMD parser
//!
//! Layout of a document:
//!
//! ```text
//! # Title
//!
//! Description paragraphs...
//!
//! *tag, tag*
//!
//! **4 servings, 12 cookies**
//!
//! ---
//!
//! - *1 cup* flour
//!
//! ## Group
//!
//! - *2* eggs
//!
//! ---
//!
//! Instructions...
//! ```

use crate::domain::{Amount, Ingredient, IngredientGroup, Recipe, Yield};

use super::blocks::{segment, Block, BlockKind};
use super::error::ParseError;

/// Parses a RecipeMD document
pub fn parse(text: &str) -> Result<Recipe, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();
    let blocks = segment(text);

    let first_rule = blocks.iter().position(|b| b.kind == BlockKind::Rule);
    let header_end = first_rule.unwrap_or(blocks.len());

    let (title_index, title) = blocks[..header_end]
        .iter()
        .enumerate()
        .find_map(|(i, b)| match &b.kind {
            BlockKind::Heading { level: 1, text } => Some((i, text.trim().to_string())),
            _ => None,
        })
        .ok_or(ParseError::MissingTitle)?;

    if title.is_empty() {
        return Err(ParseError::MissingTitle);
    }

    let first_rule = first_rule
        .ok_or_else(|| ParseError::invalid("missing horizontal rule after the recipe header"))?;

    let mut recipe = Recipe::new(title);
    parse_header(&blocks[title_index + 1..first_rule], &lines, &mut recipe);

    let body = &blocks[first_rule + 1..];
    let second_rule = body.iter().position(|b| b.kind == BlockKind::Rule);
    let region_end = match second_rule {
        Some(pos) => pos,
        None => ingredient_run_end(body),
    };

    recipe.ingredient_groups = parse_ingredients(&body[..region_end]);
    if recipe.ingredient_count() == 0 {
        return Err(ParseError::invalid("recipe has no ingredients"));
    }

    let instructions_start = match second_rule {
        Some(pos) => Some(body[pos].end_line),
        None => body.get(region_end).map(|b| b.start_line),
    };
    recipe.instructions = instructions_start.and_then(|start| verbatim(&lines, start, lines.len()));

    Ok(recipe)
}

/// End of the ingredient region when there is no second rule: just past the
/// last list item of the leading run of list items and headings
fn ingredient_run_end(body: &[Block]) -> usize {
    let run = body
        .iter()
        .position(|b| !matches!(b.kind, BlockKind::ListItem { .. } | BlockKind::Heading { .. }))
        .unwrap_or(body.len());
    body[..run]
        .iter()
        .rposition(|b| matches!(b.kind, BlockKind::ListItem { .. }))
        .map_or(0, |last| last + 1)
}

/// Sorts header blocks into tags, yields and description
fn parse_header(blocks: &[Block], lines: &[&str], recipe: &mut Recipe) {
    let mut tags: Option<Vec<String>> = None;
    let mut yields: Option<Yield> = None;
    let mut description = String::new();
    let mut previous_was_item = false;

    for block in blocks {
        if let BlockKind::Paragraph { text } = &block.kind {
            let flat = text.replace('\n', " ");

            if tags.is_none() {
                if let Some(inner) = wrapped_in(&flat, "*").or_else(|| wrapped_in(&flat, "_")) {
                    tags = Some(split_list(inner).map(str::to_string).collect());
                    continue;
                }
            }

            if yields.is_none() {
                if let Some(inner) = wrapped_in(&flat, "**").or_else(|| wrapped_in(&flat, "__")) {
                    yields = Some(Yield {
                        amounts: split_list(inner).map(Amount::parse_yield).collect(),
                    });
                    continue;
                }
            }
        }

        let Some(raw) = verbatim(lines, block.start_line, block.end_line) else {
            continue;
        };
        let is_item = matches!(block.kind, BlockKind::ListItem { .. });
        if !description.is_empty() {
            description.push_str(if is_item && previous_was_item { "\n" } else { "\n\n" });
        }
        description.push_str(&raw);
        previous_was_item = is_item;
    }

    recipe.tags = tags.unwrap_or_default();
    recipe.yields = yields.unwrap_or_default();
    recipe.description = (!description.is_empty()).then_some(description);
}

/// Builds the group tree from the ingredient region.
///
/// Headings open groups; a heading nests under the closest preceding heading
/// with a lower level and closes every open group at its level or deeper.
fn parse_ingredients(blocks: &[Block]) -> Vec<IngredientGroup> {
    let mut builder = GroupBuilder::default();

    for block in blocks {
        match &block.kind {
            BlockKind::Heading { level, text } => builder.open(*level, text),
            BlockKind::ListItem { text } => {
                if let Some(ingredient) = parse_ingredient(text) {
                    builder.push(ingredient);
                }
            }
            other => log::debug!("ignoring {:?} in ingredient list", other),
        }
    }

    builder.finish()
}

#[derive(Default)]
struct GroupBuilder {
    implicit: IngredientGroup,
    open: Vec<(u8, IngredientGroup)>,
    closed: Vec<IngredientGroup>,
}

impl GroupBuilder {
    fn open(&mut self, level: u8, title: &str) {
        self.close_to(level);
        let title = title.trim();
        let group = if title.is_empty() {
            IngredientGroup::untitled()
        } else {
            IngredientGroup::titled(title)
        };
        self.open.push((level, group));
    }

    fn push(&mut self, ingredient: Ingredient) {
        match self.open.last_mut() {
            Some((_, group)) => group.ingredients.push(ingredient),
            None => self.implicit.ingredients.push(ingredient),
        }
    }

    fn close_to(&mut self, level: u8) {
        while self.open.last().is_some_and(|(l, _)| *l >= level) {
            if let Some((_, group)) = self.open.pop() {
                match self.open.last_mut() {
                    Some((_, parent)) => parent.subgroups.push(group),
                    None => self.closed.push(group),
                }
            }
        }
    }

    fn finish(mut self) -> Vec<IngredientGroup> {
        self.close_to(0);
        let mut groups = Vec::with_capacity(self.closed.len() + 1);
        if !self.implicit.ingredients.is_empty() || self.closed.is_empty() {
            groups.push(self.implicit);
        }
        groups.extend(self.closed);
        groups
    }
}

/// Parses one list item: `*amount unit* name`, where the name may be a link
pub(super) fn parse_ingredient(text: &str) -> Option<Ingredient> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (amount, rest) = match leading_emphasis(text) {
        Some((inner, rest)) => match Amount::parse(inner) {
            Some(amount) if !rest.trim().is_empty() => (Some(amount), rest),
            Some(_) => (None, inner),
            None => (None, text),
        },
        None => (None, text),
    };

    let (name, link) = split_trailing_link(rest.trim());
    if name.is_empty() {
        return None;
    }

    Some(Ingredient {
        name,
        amount,
        linked_recipe: link,
    })
}

/// Splits `*inner* rest` (or `_inner_ rest`) into its parts
fn leading_emphasis(text: &str) -> Option<(&str, &str)> {
    let delim = text.chars().next().filter(|c| matches!(c, '*' | '_'))?;
    let after = &text[1..];
    if after.starts_with(delim) {
        return None;
    }
    let close = after.find(delim)?;
    let inner = &after[..close];
    if inner.trim().is_empty() {
        return None;
    }
    Some((inner, &after[close + 1..]))
}

/// True when a header paragraph reads as a tags (`*...*`) or yields
/// (`**...**`) line
pub(super) fn is_tags_or_yields(paragraph: &str) -> bool {
    let flat = paragraph.replace('\n', " ");
    ["*", "_", "**", "__"]
        .iter()
        .any(|delim| wrapped_in(&flat, delim).is_some())
}

/// Returns the inside of `text` when all of it is wrapped in `delim`
fn wrapped_in<'a>(text: &'a str, delim: &str) -> Option<&'a str> {
    let inner = text.trim().strip_prefix(delim)?.strip_suffix(delim)?;
    let marker = delim.chars().next()?;
    if inner.trim().is_empty() || inner.starts_with(marker) || inner.ends_with(marker) {
        return None;
    }
    if inner.contains(delim) {
        return None;
    }
    Some(inner)
}

/// Separates a trailing `[label](target)` from the text before it
fn split_trailing_link(text: &str) -> (String, Option<String>) {
    let plain = || (text.to_string(), None);

    let Some(body) = text.strip_suffix(')') else {
        return plain();
    };
    let Some(split) = body.rfind("](") else {
        return plain();
    };
    let Some(open) = body[..split].rfind('[') else {
        return plain();
    };

    let label = body[open + 1..split].trim();
    let target = body[split + 2..]
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim();
    if label.is_empty() || target.is_empty() {
        return plain();
    }

    let prefix = body[..open].trim();
    let name = if prefix.is_empty() {
        label.to_string()
    } else {
        format!("{} {}", prefix, label)
    };
    (name, Some(target.to_string()))
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Source lines `start..end`, without surrounding blank lines
fn verbatim(lines: &[&str], start: usize, end: usize) -> Option<String> {
    let slice = lines.get(start..end.min(lines.len()))?;
    let first = slice.iter().position(|l| !l.trim().is_empty())?;
    let last = slice.iter().rposition(|l| !l.trim().is_empty())?;
    Some(slice[first..=last].join("\n").trim_end().to_string())
}
