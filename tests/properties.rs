//! Property tests for the codec, amounts and file names

use proptest::prelude::*;

use recipe_shelf::domain::{fraction, Amount, Ingredient, IngredientGroup, Recipe, Yield};
use recipe_shelf::recipemd::{parse, serialize};
use recipe_shelf::storage::filename;

const UNITS: &[&str] = &["g", "ml", "cups", "tbsp", "large cloves"];

/// Amount spellings as found in hand-written files
const WRITTEN_AMOUNTS: &[&str] = &["1 1/2 cups", "½", "1½ tbsp", "0.25 g", "3", "2 large cloves", "1/3 cup"];

const DESCRIPTION_HEADINGS: &[&str] = &["# Aside", "## Notes", "### Tips"];

/// Lines with Markdown meaning in a recipe header
const HEADER_LINES: &[&str] = &[
    "Plain text.",
    "*drink*",
    "**2 cups**",
    "_quick_",
    "---",
    "***",
    "# Heading",
    "## Notes",
    "- item",
    "1. step",
    "```",
    "===",
    "",
];

fn amount() -> impl Strategy<Value = Option<Amount>> {
    let computed = (1u32..80, prop::option::of(prop::sample::select(UNITS)))
        .prop_map(|(quarters, unit)| Amount::new(f64::from(quarters) / 4.0, unit));
    let written = prop::sample::select(WRITTEN_AMOUNTS)
        .prop_filter_map("amount must parse", |text| Amount::parse(text));
    prop::option::of(prop_oneof![computed, written])
}

fn link() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        "[a-z]{3,8}(-[a-z]{3,8})?\\.md",
        "[A-Z][a-z]{2,8} [A-Z][a-z]{2,8}",
    ])
}

fn ingredient() -> impl Strategy<Value = Ingredient> {
    ("[a-z]{2,10}( [a-z]{2,10}){0,2}", amount(), link()).prop_map(|(name, amount, link)| {
        let mut ingredient = Ingredient::new(name);
        ingredient.amount = amount;
        ingredient.linked_recipe = link;
        ingredient
    })
}

fn ingredients(min: usize) -> impl Strategy<Value = Vec<Ingredient>> {
    prop::collection::vec(ingredient(), min..4)
}

fn titled_group() -> impl Strategy<Value = IngredientGroup> {
    let subgroup = ("[A-Z][a-z]{2,8}", ingredients(0)).prop_map(|(title, ingredients)| {
        let mut group = IngredientGroup::titled(title);
        group.ingredients = ingredients;
        group
    });
    (
        "[A-Z][a-z]{2,8}( [a-z]{2,8})?",
        ingredients(0),
        prop::collection::vec(subgroup, 0..3),
    )
        .prop_map(|(title, ingredients, subgroups)| {
            let mut group = IngredientGroup::titled(title);
            group.ingredients = ingredients;
            group.subgroups = subgroups;
            group
        })
}

/// Descriptions in the form the parser hands back: a sentence, headings, a
/// tight list and a fenced block hiding a rule
fn description() -> impl Strategy<Value = Option<String>> {
    (
        prop::option::of("[A-Z][a-z]{2,8}( [a-z]{2,8}){0,5} \\*[a-z]{3,6}\\*\\."),
        prop::option::of(prop::sample::select(DESCRIPTION_HEADINGS)),
        prop::option::of(prop::collection::vec("- [a-z]{3,8}( [a-z]{3,8})?", 1..4)),
        prop::bool::ANY,
    )
        .prop_map(|(sentence, heading, list, fenced)| {
            let mut blocks: Vec<String> = Vec::new();
            blocks.extend(sentence);
            blocks.extend(heading.map(str::to_string));
            blocks.extend(list.map(|items| items.join("\n")));
            if fenced {
                blocks.push("```\n---\n```".to_string());
            }
            (!blocks.is_empty()).then(|| blocks.join("\n\n"))
        })
}

fn yields() -> impl Strategy<Value = Vec<Amount>> {
    let one = prop_oneof![
        (1u32..24).prop_map(|n| Amount::new(f64::from(n), Some("servings"))),
        (1u32..40).prop_map(|n| Amount::parse_yield(&format!("makes {}", n))),
        Just(Amount::text_only("a big pot")),
    ];
    prop::collection::vec(one, 0..3)
}

fn instructions() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        "[A-Z][a-z]{2,8}( [a-z]{2,8}){0,8}\\.",
        Just("1. Boil *water*.\n2. Steep.\n\n---\n\nEnjoy.".to_string()),
        Just("## Method\n\n- stir\n- wait".to_string()),
    ])
}

fn recipe() -> impl Strategy<Value = Recipe> {
    (
        "[A-Z][a-z]{2,10}( [A-Za-z]{2,10}){0,3}",
        description(),
        prop::collection::vec("[a-z]{3,8}", 0..4),
        yields(),
        prop::option::of(ingredients(1)),
        prop::collection::vec(titled_group(), 0..3),
        instructions(),
    )
        .prop_map(
            |(title, description, tags, yields, untitled, groups, instructions)| {
                let mut recipe = Recipe::new(title);
                recipe.description = description;
                recipe.tags = tags;
                recipe.yields = Yield { amounts: yields };
                if let Some(untitled) = untitled {
                    let mut first = IngredientGroup::untitled();
                    first.ingredients = untitled;
                    recipe.ingredient_groups.push(first);
                }
                recipe.ingredient_groups.extend(groups);
                recipe.instructions = instructions;
                recipe
            },
        )
        .prop_filter("recipe needs ingredients", |r| r.ingredient_count() > 0)
}

/// Any mix of Markdown-significant header lines
fn raw_description() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(HEADER_LINES), 1..6).prop_map(|lines| lines.join("\n"))
}

/// (name, value, unit, link) per ingredient, in document order
type FlatIngredient = (String, Option<f64>, Option<String>, Option<String>);

fn flat(recipe: &Recipe) -> Vec<FlatIngredient> {
    recipe
        .all_ingredients()
        .into_iter()
        .map(|i| {
            (
                i.name.clone(),
                i.amount.as_ref().map(Amount::value),
                i.amount.as_ref().and_then(|a| a.unit().map(str::to_string)),
                i.linked_recipe.clone(),
            )
        })
        .collect()
}

fn yields_of(recipe: &Recipe) -> Vec<(f64, Option<String>)> {
    recipe
        .yields
        .amounts
        .iter()
        .map(|a| (a.value(), a.unit().map(str::to_string)))
        .collect()
}

/// Group titles and sizes, nested the same way as the groups
fn shape(groups: &[IngredientGroup]) -> Vec<(Option<String>, usize, String)> {
    groups
        .iter()
        .map(|g| {
            (
                g.title.clone(),
                g.ingredients.len(),
                format!("{:?}", shape(&g.subgroups)),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn round_trip_preserves_recipe(recipe in recipe()) {
        let text = serialize(&recipe).unwrap();
        let parsed = parse(&text).unwrap();

        prop_assert_eq!(&parsed.title, &recipe.title);
        prop_assert_eq!(&parsed.tags, &recipe.tags);
        prop_assert_eq!(&parsed.description, &recipe.description);
        prop_assert_eq!(&parsed.instructions, &recipe.instructions);
        prop_assert_eq!(flat(&parsed), flat(&recipe));
        prop_assert_eq!(shape(&parsed.ingredient_groups), shape(&recipe.ingredient_groups));
        prop_assert_eq!(yields_of(&parsed), yields_of(&recipe));
    }

    #[test]
    fn written_headers_keep_their_sections(recipe in recipe(), description in raw_description()) {
        let mut recipe = recipe;
        recipe.description = Some(description);

        // Either the header is refused or it reads back with the same sections
        if let Ok(text) = serialize(&recipe) {
            let parsed = parse(&text).unwrap();
            prop_assert_eq!(&parsed.title, &recipe.title);
            prop_assert_eq!(&parsed.tags, &recipe.tags);
            prop_assert_eq!(yields_of(&parsed), yields_of(&recipe));
            prop_assert_eq!(flat(&parsed), flat(&recipe));
            prop_assert_eq!(shape(&parsed.ingredient_groups), shape(&recipe.ingredient_groups));
        }
    }

    #[test]
    fn serializing_parsed_text_is_stable(recipe in recipe()) {
        let text = serialize(&recipe).unwrap();
        let again = serialize(&parse(&text).unwrap()).unwrap();
        prop_assert_eq!(again, text);
    }

    #[test]
    fn scaling_is_linear_and_keeps_unit(
        value in 0.0f64..1000.0,
        unit in prop::option::of(prop::sample::select(UNITS)),
        m1 in 0.01f64..100.0,
        m2 in 0.01f64..100.0,
    ) {
        let amount = Amount::new(value, unit);
        let twice = amount.scale(m1).scale(m2);
        let once = amount.scale(m1 * m2);

        let tolerance = 1e-9 * once.value().abs().max(1.0);
        prop_assert!((twice.value() - once.value()).abs() <= tolerance);
        prop_assert_eq!(twice.unit(), amount.unit());
        prop_assert_eq!(once.unit(), unit);
    }

    #[test]
    fn repeated_filenames_are_distinct(title in "[A-Za-z][A-Za-z' ]{0,20}", n in 1usize..12) {
        let mut existing: Vec<String> = Vec::new();
        for _ in 0..n {
            let name = filename::generate(&title, &existing).unwrap();
            prop_assert!(name.ends_with(".md"));
            prop_assert!(!existing.contains(&name));
            existing.push(name);
        }
        prop_assert_eq!(existing.len(), n);
    }
}

#[test]
fn every_glyph_round_trips() {
    for (glyph, value) in fraction::all() {
        assert_eq!(fraction::glyph_of(value), Some(glyph));
        let back = fraction::value_of(glyph).unwrap();
        assert!((back - value).abs() < fraction::GLYPH_TOLERANCE);
    }
}
