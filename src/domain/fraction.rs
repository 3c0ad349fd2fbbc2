//! Unicode vulgar-fraction glyphs
//!
//! Static lookup between the glyphs a recipe may use for amounts (`½`, `¾`, ...)
//! and their numeric value.

/// Tolerance used when matching a value against a table entry
pub const GLYPH_TOLERANCE: f64 = 0.01;

/// Glyph table, sorted by ascending value
const FRACTIONS: &[(char, f64)] = &[
    ('⅒', 1.0 / 10.0),
    ('⅑', 1.0 / 9.0),
    ('⅛', 1.0 / 8.0),
    ('⅐', 1.0 / 7.0),
    ('⅙', 1.0 / 6.0),
    ('⅕', 1.0 / 5.0),
    ('¼', 1.0 / 4.0),
    ('⅓', 1.0 / 3.0),
    ('⅜', 3.0 / 8.0),
    ('⅖', 2.0 / 5.0),
    ('½', 1.0 / 2.0),
    ('⅗', 3.0 / 5.0),
    ('⅝', 5.0 / 8.0),
    ('⅔', 2.0 / 3.0),
    ('¾', 3.0 / 4.0),
    ('⅘', 4.0 / 5.0),
    ('⅚', 5.0 / 6.0),
    ('⅞', 7.0 / 8.0),
];

/// Returns the value of a fraction glyph, if it is one
pub fn value_of(glyph: char) -> Option<f64> {
    FRACTIONS
        .iter()
        .find(|(g, _)| *g == glyph)
        .map(|(_, value)| *value)
}

/// Returns the glyph closest to `value`.
///
/// Entries are scanned in ascending order and the first one within
/// [`GLYPH_TOLERANCE`] wins.
pub fn glyph_of(value: f64) -> Option<char> {
    FRACTIONS
        .iter()
        .find(|(_, v)| (v - value).abs() < GLYPH_TOLERANCE)
        .map(|(g, _)| *g)
}

/// Returns true if the character is a tabled fraction glyph
pub fn is_glyph(c: char) -> bool {
    value_of(c).is_some()
}

/// Iterates over all `(glyph, value)` pairs in ascending value order
pub fn all() -> impl Iterator<Item = (char, f64)> {
    FRACTIONS.iter().copied()
}
