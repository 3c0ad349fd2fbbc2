//! RecipeMD serializer
//!
//! Produces canonical RecipeMD text. Parsing the output yields an equivalent
//! recipe; whitespace and amount spelling may differ from the source file.

use crate::domain::{DisplayFormat, Ingredient, IngredientGroup, Recipe};

use super::blocks::{segment, Block, BlockKind};
use super::error::SerializeError;
use super::parser::{is_tags_or_yields, parse_ingredient};

/// Heading level of top-level ingredient groups
const GROUP_LEVEL: usize = 2;

/// Deepest heading level Markdown supports
const MAX_HEADING_LEVEL: usize = 6;

/// Formatting choices for written documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializeOptions {
    /// Format for ingredient amounts
    pub amount_format: DisplayFormat,

    /// Format for yield amounts
    pub yield_format: DisplayFormat,
}

/// Serializes a recipe with default options
pub fn serialize(recipe: &Recipe) -> Result<String, SerializeError> {
    serialize_with(recipe, &SerializeOptions::default())
}

/// Serializes a recipe
pub fn serialize_with(recipe: &Recipe, options: &SerializeOptions) -> Result<String, SerializeError> {
    validate(recipe, options)?;

    let mut sections: Vec<String> = Vec::new();
    sections.push(format!("# {}", recipe.title.trim()));

    if let Some(description) = recipe.description.as_deref().map(str::trim) {
        if !description.is_empty() {
            sections.push(description.to_string());
        }
    }

    if !recipe.tags.is_empty() {
        let tags: Vec<&str> = recipe.tags.iter().map(|t| t.trim()).collect();
        sections.push(format!("*{}*", tags.join(", ")));
    }

    if !recipe.yields.is_empty() {
        let yields: Vec<String> = recipe
            .yields
            .amounts
            .iter()
            .map(|a| a.format(options.yield_format))
            .collect();
        sections.push(format!("**{}**", yields.join(", ")));
    }

    sections.push("---".to_string());

    for group in &recipe.ingredient_groups {
        write_group(group, GROUP_LEVEL, options, &mut sections);
    }

    sections.push("---".to_string());

    if let Some(instructions) = recipe.instructions.as_deref().map(str::trim_end) {
        let instructions = instructions.trim_start_matches(['\n', '\r']);
        if !instructions.is_empty() {
            sections.push(instructions.to_string());
        }
    }

    let mut out = sections.join("\n\n");
    out.push('\n');
    Ok(out)
}

fn write_group(
    group: &IngredientGroup,
    level: usize,
    options: &SerializeOptions,
    sections: &mut Vec<String>,
) {
    if let Some(title) = group.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        sections.push(format!("{} {}", "#".repeat(level), title));
    }

    if !group.ingredients.is_empty() {
        let items: Vec<String> = group
            .ingredients
            .iter()
            .map(|i| ingredient_line(i, options))
            .collect();
        sections.push(items.join("\n"));
    }

    for subgroup in &group.subgroups {
        write_group(subgroup, level + 1, options, sections);
    }
}

fn ingredient_line(ingredient: &Ingredient, options: &SerializeOptions) -> String {
    let name = ingredient.name.trim();
    let name = match ingredient.linked_recipe.as_deref() {
        Some(target) => format!("[{}]({})", name, link_target(target)),
        None => name.to_string(),
    };

    match &ingredient.amount {
        Some(amount) => format!("- *{}* {}", amount.format(options.amount_format), name),
        None => format!("- {}", name),
    }
}

/// Wraps targets containing spaces or parentheses in angle brackets
fn link_target(target: &str) -> String {
    let target = target.trim();
    if target.contains([' ', '(', ')']) {
        format!("<{}>", target)
    } else {
        target.to_string()
    }
}

fn validate(recipe: &Recipe, options: &SerializeOptions) -> Result<(), SerializeError> {
    let title = recipe.title.trim();
    if title.is_empty() {
        return Err(SerializeError::EmptyTitle);
    }
    single_line("title", title)?;
    check_heading(1, title)?;

    if let Some(description) = recipe.description.as_deref() {
        check_description(description.trim())?;
    }

    for tag in &recipe.tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || trimmed.contains([',', '*']) {
            return Err(SerializeError::InvalidTag { tag: tag.clone() });
        }
        single_line("tag", trimmed)?;
    }

    for amount in &recipe.yields.amounts {
        let text = amount.format(options.yield_format);
        if text.trim().is_empty() || text.contains([',', '*', '\n', '\r']) {
            return Err(SerializeError::InvalidYield { text });
        }
    }

    if recipe.ingredient_count() == 0 {
        return Err(SerializeError::NoIngredients);
    }
    check_groups(&recipe.ingredient_groups, GROUP_LEVEL)?;

    for ingredient in recipe.all_ingredients() {
        let name = ingredient.name.trim();
        if name.is_empty() {
            return Err(SerializeError::EmptyIngredientName);
        }
        single_line("ingredient name", name)?;
        if let Some(target) = ingredient.linked_recipe.as_deref() {
            single_line("link target", target.trim())?;
        }
        check_ingredient(ingredient, options)?;
    }

    Ok(())
}

fn group_title(group: &IngredientGroup) -> Option<&str> {
    group.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

/// Only the first top-level group may go without a heading, and headings
/// must stay within Markdown's six levels
fn check_groups(groups: &[IngredientGroup], level: usize) -> Result<(), SerializeError> {
    for (index, group) in groups.iter().enumerate() {
        match group_title(group) {
            Some(title) => {
                if level > MAX_HEADING_LEVEL {
                    return Err(SerializeError::InvalidGroup {
                        reason: "groups nest deeper than six heading levels",
                    });
                }
                single_line("group title", title)?;
                check_heading(level, title)?;
            }
            None => {
                let reason = if level > GROUP_LEVEL {
                    Some("subgroups need a title")
                } else if index > 0 {
                    Some("only the first group may be untitled")
                } else if !group.subgroups.is_empty() {
                    Some("an untitled group cannot have subgroups")
                } else if group.ingredients.is_empty() && groups.len() > 1 {
                    Some("an untitled first group needs ingredients")
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(SerializeError::InvalidGroup { reason });
                }
            }
        }
        check_groups(&group.subgroups, level + 1)?;
    }
    Ok(())
}

fn check_heading(level: usize, text: &str) -> Result<(), SerializeError> {
    let line = format!("{} {}", "#".repeat(level), text);
    match segment(&line).as_slice() {
        [Block {
            kind: BlockKind::Heading { level: read, text: read_text },
            ..
        }] if usize::from(*read) == level && read_text == text => Ok(()),
        _ => Err(SerializeError::InvalidHeading {
            text: text.to_string(),
        }),
    }
}

/// Rejects description blocks the parser would take for the rule, the tags
/// line or the yields line, and code fences left open
fn check_description(description: &str) -> Result<(), SerializeError> {
    if description.is_empty() {
        return Ok(());
    }

    let text = format!("{}\n\n---", description);
    let lines: Vec<&str> = text.lines().collect();
    let blocks = segment(&text);
    let Some((last, body)) = blocks.split_last() else {
        return Ok(());
    };

    let conflict = body
        .iter()
        .find(|block| match &block.kind {
            BlockKind::Rule => true,
            BlockKind::Paragraph { text } => is_tags_or_yields(text),
            _ => false,
        })
        .or((last.kind != BlockKind::Rule).then_some(last));

    match conflict {
        Some(block) => Err(SerializeError::AmbiguousDescription {
            block: lines[block.start_line..block.end_line.min(lines.len())].join("\n"),
        }),
        None => Ok(()),
    }
}

/// The written list item must read back with the same name, link and amount
fn check_ingredient(ingredient: &Ingredient, options: &SerializeOptions) -> Result<(), SerializeError> {
    let line = ingredient_line(ingredient, options);
    let read_back = match segment(&line).as_slice() {
        [Block {
            kind: BlockKind::ListItem { text },
            ..
        }] => parse_ingredient(text),
        _ => None,
    };

    let same = read_back.is_some_and(|parsed| {
        parsed.name == ingredient.name.trim()
            && parsed.amount.is_some() == ingredient.amount.is_some()
            && parsed.linked_recipe.as_deref() == ingredient.linked_recipe.as_deref().map(str::trim)
    });
    if same {
        Ok(())
    } else {
        Err(SerializeError::AmbiguousIngredient {
            name: ingredient.name.clone(),
        })
    }
}

fn single_line(field: &'static str, value: &str) -> Result<(), SerializeError> {
    if value.contains(['\n', '\r']) {
        return Err(SerializeError::Multiline {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
