//! Recipe CLI commands

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::app::Session;
use crate::domain::{Amount, DisplayFormat, IngredientGroup, Recipe};
use crate::recipemd;
use crate::storage::{filename, ConflictPolicy, FileSystem, LocalFs, RecipeFile, RecipeStore};

pub(crate) fn list(session: &Session, tag: Option<&str>) -> Result<()> {
    let output = &session.output;
    let store = session.open_store()?;
    let recipes = store.recipes();
    let shown: Vec<&RecipeFile> = recipes
        .iter()
        .filter(|f| tag.map_or(true, |t| f.recipe.has_tag(t)))
        .collect();

    if output.is_json() {
        let items: Vec<_> = shown
            .iter()
            .map(|f| {
                serde_json::json!({
                    "title": f.recipe.title,
                    "file": f.file_name(),
                    "path": f.path,
                    "tags": f.recipe.tags,
                    "ingredients": f.recipe.ingredient_count(),
                    "error": f.parse_error.as_ref().map(|e| e.to_string()),
                })
            })
            .collect();
        let errors: Vec<_> = store
            .errors()
            .iter()
            .map(|(path, err)| serde_json::json!({ "path": path, "error": err.to_string() }))
            .collect();
        output.data(&serde_json::json!({ "recipes": items, "errors": errors }));
        return Ok(());
    }

    if shown.is_empty() {
        match tag {
            Some(tag) => println!("No recipes tagged '{}'", tag),
            None => println!("No recipes in {}", session.library.display()),
        }
    } else {
        println!("{:<32} {:<32} TAGS", "TITLE", "FILE");
        println!("{}", "-".repeat(72));
        for file in &shown {
            let title = if file.is_fallback() {
                format!("{} (unparsed)", file.recipe.title)
            } else {
                file.recipe.title.clone()
            };
            println!(
                "{:<32} {:<32} {}",
                title,
                file.file_name(),
                file.recipe.tags.join(", ")
            );
        }
    }

    for (path, err) in store.errors() {
        output.warn(&format!("{}: {}", path.display(), err));
    }

    Ok(())
}

pub(crate) fn show(
    session: &Session,
    name: &str,
    scale: Option<f64>,
    target_yield: Option<&str>,
    amounts: Option<DisplayFormat>,
) -> Result<()> {
    let output = &session.output;
    let store = session.open_store()?;
    let file = locate(&store, session, name)?;

    if let Some(err) = &file.parse_error {
        bail!("{} could not be parsed: {}", file.path.display(), err);
    }

    let mut recipe = file.recipe.clone();
    if let Some(factor) = scale {
        if !(factor.is_finite() && factor > 0.0) {
            bail!("Scale factor must be a positive number, got {}", factor);
        }
        output.verbose_ctx("show", &format!("Scaling by {}", factor));
        recipe = recipe.scaled(factor);
    }
    if let Some(target) = target_yield {
        let amount = Amount::parse(target)
            .with_context(|| format!("'{}' is not an amount (try \"8 servings\")", target))?;
        recipe = match recipe.scale_to_yield(&amount) {
            Some(scaled) => scaled,
            None => bail!("'{}' has no yield matching '{}'", recipe.title, target),
        };
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": file.path,
            "recipe": recipe,
        }));
        return Ok(());
    }

    let format = amounts.unwrap_or(session.config.amount_format);
    print_recipe(&store, &recipe, format);
    Ok(())
}

fn print_recipe(store: &RecipeStore<LocalFs>, recipe: &Recipe, format: DisplayFormat) {
    println!("{}", recipe.title);
    println!("{}", "=".repeat(recipe.title.chars().count()));

    if let Some(description) = &recipe.description {
        println!("\n{}", description);
    }
    if !recipe.tags.is_empty() {
        println!("\nTags: {}", recipe.tags.join(", "));
    }
    if !recipe.yields.is_empty() {
        let yields: Vec<String> = recipe
            .yields
            .amounts
            .iter()
            .map(|a| a.format(format))
            .collect();
        println!("Yields: {}", yields.join(", "));
    }

    println!("\nIngredients:");
    for group in &recipe.ingredient_groups {
        print_group(store, group, format, 1);
    }

    if let Some(instructions) = &recipe.instructions {
        println!("\nInstructions:\n{}", instructions);
    }
}

fn print_group(
    store: &RecipeStore<LocalFs>,
    group: &IngredientGroup,
    format: DisplayFormat,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    let item_indent = match &group.title {
        Some(title) => {
            println!("{}{}:", indent, title);
            "  ".repeat(depth + 1)
        }
        None => indent,
    };

    for ingredient in &group.ingredients {
        let link = match (&ingredient.linked_recipe, store.resolve_link(ingredient)) {
            (_, Some(target)) => format!(" -> {}", target.file_name()),
            (Some(target), None) => format!(" -> {} (missing)", target),
            (None, None) => String::new(),
        };
        println!("{}- {}{}", item_indent, ingredient.display_text(format), link);
    }
    for subgroup in &group.subgroups {
        print_group(store, subgroup, format, depth + 1);
    }
}

pub(crate) fn check(session: &Session, files: &[PathBuf]) -> Result<()> {
    let output = &session.output;

    // (path, error message) for every failure
    let mut failures: Vec<(PathBuf, String)> = Vec::new();
    let mut checked = 0;

    if files.is_empty() {
        let store = session.open_store()?;
        let recipes = store.recipes();
        checked = recipes.len() + store.errors().len();
        for file in recipes.iter() {
            if let Some(err) = &file.parse_error {
                failures.push((file.path.clone(), err.to_string()));
            }
        }
        for (path, err) in store.errors() {
            failures.push((path.clone(), err.to_string()));
        }
    } else {
        for path in files {
            checked += 1;
            output.verbose_ctx("check", &format!("Parsing {}", path.display()));
            let result = LocalFs
                .read_text(path)
                .map_err(|e| recipemd::ParseError::from_io(path, &e))
                .and_then(|text| recipemd::parse(&text));
            if let Err(err) = result {
                failures.push((path.clone(), err.to_string()));
            }
        }
    }

    if output.is_json() {
        let items: Vec<_> = failures
            .iter()
            .map(|(path, err)| serde_json::json!({ "path": path, "error": err }))
            .collect();
        output.data(&serde_json::json!({
            "checked": checked,
            "failed": items,
        }));
    } else {
        for (path, err) in &failures {
            println!("{}: {}", path.display(), err);
        }
        if failures.is_empty() {
            output.success(&format!("{} recipe(s) OK", checked));
        }
    }

    if !failures.is_empty() {
        bail!("{} of {} recipe(s) failed to parse", failures.len(), checked);
    }
    Ok(())
}

pub(crate) fn add(session: &Session, source: &Path) -> Result<()> {
    let output = &session.output;
    let text = fs::read_to_string(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let recipe = recipemd::parse(&text)
        .with_context(|| format!("{} is not a valid RecipeMD file", source.display()))?;

    let mut store = session.open_store()?;
    let file = store
        .create(&recipe)
        .with_context(|| format!("Failed to add '{}'", recipe.title))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "title": file.recipe.title,
            "file": file.file_name(),
            "path": file.path,
        }));
    } else {
        output.success(&format!(
            "Added recipe: {} ({})",
            file.recipe.title,
            file.file_name()
        ));
    }
    Ok(())
}

pub(crate) fn format(session: &Session, name: &str, force: bool) -> Result<()> {
    let output = &session.output;
    let mut store = session.open_store()?;
    let file = locate(&store, session, name)?;

    if let Some(err) = &file.parse_error {
        bail!("Cannot format {}: {}", file.path.display(), err);
    }

    let policy = if force {
        ConflictPolicy::Overwrite
    } else {
        ConflictPolicy::Check
    };
    let updated = match store.update(&file, &file.recipe, policy) {
        Ok(updated) => updated,
        Err(e) if e.is_conflict() => {
            return Err(e).context("Run again with --force to overwrite");
        }
        Err(e) => return Err(e.into()),
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "file": updated.file_name(),
            "path": updated.path,
            "modified": updated.modified,
        }));
    } else {
        output.success(&format!("Formatted {}", updated.file_name()));
    }
    Ok(())
}

pub(crate) fn remove(session: &Session, name: &str) -> Result<()> {
    let output = &session.output;
    let mut store = session.open_store()?;

    // Unreadable files can still be deleted by path
    let path = match locate(&store, session, name) {
        Ok(file) => file.path,
        Err(e) => {
            let candidate = candidate_path(session, name);
            if store.errors().contains_key(&candidate) {
                candidate
            } else {
                return Err(e);
            }
        }
    };

    store
        .delete(&path)
        .with_context(|| format!("Failed to delete {}", path.display()))?;

    if output.is_json() {
        output.data(&serde_json::json!({ "deleted": path }));
    } else {
        output.success(&format!("Deleted {}", path.display()));
    }
    Ok(())
}

pub(crate) fn slug(session: &Session, title: &str) -> Result<()> {
    let existing = if LocalFs.is_dir(&session.library) {
        LocalFs
            .list(&session.library)
            .with_context(|| format!("Failed to list {}", session.library.display()))?
    } else {
        Vec::new()
    };
    let names = existing
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned());
    let name = filename::generate(title, names)?;

    if session.output.is_json() {
        session
            .output
            .data(&serde_json::json!({ "title": title, "file": name }));
    } else {
        println!("{}", name);
    }
    Ok(())
}

/// Path in the library that `name` refers to, adding `.md` if missing
fn candidate_path(session: &Session, name: &str) -> PathBuf {
    let path = Path::new(name);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        session.library.join(path.file_name().unwrap_or(path.as_os_str()))
    };
    if filename::is_recipe_file(&path) {
        path
    } else {
        let mut with_ext = path.into_os_string();
        with_ext.push(".");
        with_ext.push(filename::EXTENSION);
        PathBuf::from(with_ext)
    }
}

/// Finds a recipe by path, file name or title
fn locate(store: &RecipeStore<LocalFs>, session: &Session, name: &str) -> Result<RecipeFile> {
    let candidate = candidate_path(session, name);
    if let Some(file) = store.get(&candidate).or_else(|| store.find_by_title(name)) {
        return Ok(file.clone());
    }
    if let Some(err) = store.errors().get(&candidate) {
        bail!("{}", err);
    }
    bail!(
        "Recipe not found: {} (in {})",
        name,
        session.library.display()
    )
}
