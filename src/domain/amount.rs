//! Quantities: ingredient amounts and recipe yields
//!
//! An [`Amount`] is a non-negative number with an optional unit. Amounts parsed
//! from a document keep their original text so they can be written back
//! unchanged; scaling drops it.
//!
//! Accepted numerals:
//! - integers and decimals: `2`, `0.5`
//! - ASCII fractions: `1/2`
//! - mixed numbers: `1 1/2`, `1½`, `1 ½`
//! - a single fraction glyph: `¾`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::fraction::{self, GLYPH_TOLERANCE};

/// How an amount is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    /// Original text when available, decimal otherwise
    #[default]
    Original,
    Decimal,
    /// Integer part plus a fraction glyph, decimal when no glyph matches
    Fraction,
}

impl DisplayFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayFormat::Original => "original",
            DisplayFormat::Decimal => "decimal",
            DisplayFormat::Fraction => "fraction",
        }
    }
}

impl FromStr for DisplayFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "original" => Ok(DisplayFormat::Original),
            "decimal" => Ok(DisplayFormat::Decimal),
            "fraction" => Ok(DisplayFormat::Fraction),
            other => Err(format!(
                "unknown amount format '{}' (expected original, decimal or fraction)",
                other
            )),
        }
    }
}

/// A quantity with an optional unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Amount {
    value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_text: Option<String>,
}

impl Amount {
    /// Creates an amount from a value and unit.
    ///
    /// Negative and NaN values are clamped to zero; a blank unit counts as none.
    pub fn new(value: f64, unit: Option<&str>) -> Self {
        Self {
            value: clamp(value),
            unit: normalize_unit(unit),
            raw_text: None,
        }
    }

    /// Creates an amount with no quantity, carrying only its text (e.g. "a handful")
    pub fn text_only(text: &str) -> Self {
        let text = text.trim();
        Self {
            value: 0.0,
            unit: None,
            raw_text: (!text.is_empty()).then(|| text.to_string()),
        }
    }

    /// Parses text that starts with a numeral, e.g. `2 cups` or `1½ tbsp`.
    ///
    /// Everything after the numeral is the unit. Returns `None` when the text
    /// does not start with a numeral.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (value, len) = parse_numeral(text)?;
        Some(Self {
            value,
            unit: normalize_unit(Some(&text[len..])),
            raw_text: Some(text.to_string()),
        })
    }

    /// Parses a yield phrase such as `4 servings` or `makes 12`.
    ///
    /// A leading numeral is preferred; otherwise the first numeral that starts
    /// a word is used and the words after it become the unit. Phrases without
    /// any numeral become text-only amounts.
    pub fn parse_yield(phrase: &str) -> Self {
        let phrase = phrase.trim();
        if let Some(amount) = Self::parse(phrase) {
            return amount;
        }

        let word_starts = phrase
            .char_indices()
            .filter(|(i, _)| *i > 0 && phrase[..*i].ends_with(char::is_whitespace))
            .map(|(i, _)| i);

        for start in word_starts {
            if let Some((value, len)) = parse_numeral(&phrase[start..]) {
                return Self {
                    value,
                    unit: normalize_unit(Some(&phrase[start + len..])),
                    raw_text: Some(phrase.to_string()),
                };
            }
        }

        Self::text_only(phrase)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Original document text, present only for unscaled parsed amounts
    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    /// True when the amount has no numeral at all
    pub fn is_text_only(&self) -> bool {
        self.raw_text
            .as_deref()
            .is_some_and(|raw| !raw.chars().any(|c| c.is_ascii_digit() || fraction::is_glyph(c)))
    }

    /// Multiplies the value, keeping the unit. Text-only amounts are returned unchanged.
    pub fn scale(&self, multiplier: f64) -> Self {
        if self.is_text_only() {
            return self.clone();
        }
        Self {
            value: clamp(self.value * multiplier),
            unit: self.unit.clone(),
            raw_text: None,
        }
    }

    /// Renders the amount, unit included
    pub fn format(&self, format: DisplayFormat) -> String {
        if let Some(raw) = &self.raw_text {
            if format == DisplayFormat::Original || self.is_text_only() {
                return raw.clone();
            }
        }

        let numeral = match format {
            DisplayFormat::Fraction => format_fraction(self.value),
            DisplayFormat::Original | DisplayFormat::Decimal => format_decimal(self.value),
        };

        match &self.unit {
            Some(unit) => format!("{} {}", numeral, unit),
            None => numeral,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DisplayFormat::Original))
    }
}

fn clamp(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}

fn normalize_unit(unit: Option<&str>) -> Option<String> {
    unit.map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

/// Renders a value as a decimal.
///
/// Integers get no decimal places, quarter steps get one or two, anything
/// else is rounded to two places with trailing zeros removed.
pub fn format_decimal(value: f64) -> String {
    if (value - value.round()).abs() < 0.001 {
        return format!("{:.0}", value.round());
    }

    let frac = value.fract();
    if is_multiple_of(frac, 0.25) {
        if is_multiple_of(frac, 0.5) {
            return format!("{:.1}", value);
        }
        return format!("{:.2}", value);
    }

    let fixed = format!("{:.2}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Renders a value as an integer part plus a fraction glyph (`1½`), falling
/// back to [`format_decimal`] when the remainder has no glyph
pub fn format_fraction(value: f64) -> String {
    let whole = value.floor();
    let remainder = value - whole;

    if remainder >= GLYPH_TOLERANCE && remainder <= 1.0 - GLYPH_TOLERANCE {
        if let Some(glyph) = fraction::glyph_of(remainder) {
            return if whole == 0.0 {
                glyph.to_string()
            } else {
                format!("{:.0}{}", whole, glyph)
            };
        }
    }

    format_decimal(value)
}

fn is_multiple_of(value: f64, step: f64) -> bool {
    let steps = value / step;
    ((steps - steps.round()) * step).abs() < 0.001
}

/// Length of the run of ASCII digits at the start of `text`
fn digits_len(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}

/// Parses the numeral at the start of `text`, returning its value and byte length
fn parse_numeral(text: &str) -> Option<(f64, usize)> {
    let first = text.chars().next()?;
    if let Some(value) = fraction::value_of(first) {
        return Some((value, first.len_utf8()));
    }

    let int_len = digits_len(text);
    if int_len == 0 {
        return None;
    }
    let whole: f64 = text[..int_len].parse().ok()?;
    let rest = &text[int_len..];

    // a/b
    if let Some(after_slash) = rest.strip_prefix('/') {
        let den_len = digits_len(after_slash);
        if den_len > 0 {
            let den: f64 = after_slash[..den_len].parse().ok()?;
            if den > 0.0 {
                return Some((whole / den, int_len + 1 + den_len));
            }
        }
        return Some((whole, int_len));
    }

    // a.b
    if let Some(after_dot) = rest.strip_prefix('.') {
        let frac_len = digits_len(after_dot);
        if frac_len > 0 {
            let end = int_len + 1 + frac_len;
            let value: f64 = text[..end].parse().ok()?;
            return Some((value, end));
        }
        return Some((whole, int_len));
    }

    let trimmed = rest.trim_start_matches(' ');
    let spaces = rest.len() - trimmed.len();

    // 1½ or 1 ½
    if let Some(c) = trimmed.chars().next() {
        if let Some(value) = fraction::value_of(c) {
            return Some((whole + value, int_len + spaces + c.len_utf8()));
        }
    }

    // 1 1/2
    if spaces > 0 {
        let num_len = digits_len(trimmed);
        if num_len > 0 {
            if let Some(after_slash) = trimmed[num_len..].strip_prefix('/') {
                let den_len = digits_len(after_slash);
                if den_len > 0 {
                    let num: f64 = trimmed[..num_len].parse().ok()?;
                    let den: f64 = after_slash[..den_len].parse().ok()?;
                    if den > 0.0 && num < den {
                        let len = int_len + spaces + num_len + 1 + den_len;
                        return Some((whole + num / den, len));
                    }
                }
            }
        }
    }

    Some((whole, int_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> Amount {
        Amount::parse(text).unwrap()
    }

    #[test]
    fn parse_integer_with_unit() {
        let amount = parsed("2 cups");
        assert_eq!(amount.value(), 2.0);
        assert_eq!(amount.unit(), Some("cups"));
        assert_eq!(amount.raw_text(), Some("2 cups"));
    }

    #[test]
    fn parse_without_unit() {
        let amount = parsed("1");
        assert_eq!(amount.value(), 1.0);
        assert_eq!(amount.unit(), None);
    }

    #[test]
    fn parse_numeral_forms() {
        assert_eq!(parsed("0.5 l").value(), 0.5);
        assert_eq!(parsed("1/4 tsp").value(), 0.25);
        assert_eq!(parsed("1 1/2 cups").value(), 1.5);
        assert_eq!(parsed("1 1/2 cups").unit(), Some("cups"));
        assert_eq!(parsed("¾ cup").value(), 0.75);
        assert_eq!(parsed("1½ tbsp").value(), 1.5);
        assert_eq!(parsed("2 ½").value(), 2.5);
    }

    #[test]
    fn parse_unit_glued_to_numeral() {
        let amount = parsed("200g");
        assert_eq!(amount.value(), 200.0);
        assert_eq!(amount.unit(), Some("g"));
    }

    #[test]
    fn parse_keeps_multi_word_units() {
        let amount = parsed("2 heaped tbsp");
        assert_eq!(amount.unit(), Some("heaped tbsp"));
    }

    #[test]
    fn parse_rejects_text_without_numeral() {
        assert!(Amount::parse("some").is_none());
        assert!(Amount::parse("").is_none());
    }

    #[test]
    fn zero_denominator_is_not_a_fraction() {
        let amount = parsed("1/0 cup");
        assert_eq!(amount.value(), 1.0);
        assert_eq!(amount.unit(), Some("/0 cup"));
    }

    #[test]
    fn yield_with_leading_number() {
        let amount = Amount::parse_yield("4 servings");
        assert_eq!(amount.value(), 4.0);
        assert_eq!(amount.unit(), Some("servings"));
    }

    #[test]
    fn yield_with_number_later_in_phrase() {
        let amount = Amount::parse_yield("makes 12");
        assert_eq!(amount.value(), 12.0);
        assert_eq!(amount.unit(), None);
        assert_eq!(amount.raw_text(), Some("makes 12"));
    }

    #[test]
    fn yield_without_number_is_text_only() {
        let amount = Amount::parse_yield("one big pot");
        assert!(amount.is_text_only());
        assert_eq!(amount.value(), 0.0);
        assert_eq!(amount.format(DisplayFormat::Decimal), "one big pot");
        assert_eq!(amount.scale(3.0), amount);
    }

    #[test]
    fn new_clamps_and_normalizes() {
        let amount = Amount::new(-3.0, Some("  "));
        assert_eq!(amount.value(), 0.0);
        assert_eq!(amount.unit(), None);
        assert_eq!(Amount::new(f64::NAN, None).value(), 0.0);
    }

    #[test]
    fn scale_drops_raw_text() {
        let amount = parsed("1 1/2 cups").scale(2.0);
        assert_eq!(amount.value(), 3.0);
        assert_eq!(amount.unit(), Some("cups"));
        assert_eq!(amount.raw_text(), None);
        assert_eq!(amount.format(DisplayFormat::Original), "3 cups");
    }

    #[test]
    fn original_format_is_verbatim() {
        assert_eq!(parsed("1 1/2 cups").format(DisplayFormat::Original), "1 1/2 cups");
        assert_eq!(parsed("1 1/2 cups").format(DisplayFormat::Decimal), "1.5 cups");
        assert_eq!(parsed("1 1/2 cups").format(DisplayFormat::Fraction), "1½ cups");
    }

    #[test]
    fn decimal_cleanup() {
        assert_eq!(format_decimal(3.0), "3");
        assert_eq!(format_decimal(1.5), "1.5");
        assert_eq!(format_decimal(0.75), "0.75");
        assert_eq!(format_decimal(2.25), "2.25");
        assert_eq!(format_decimal(1.0 / 3.0), "0.33");
        assert_eq!(format_decimal(0.1), "0.1");
        assert_eq!(format_decimal(2.999_9), "3");
    }

    #[test]
    fn fraction_rendering() {
        assert_eq!(format_fraction(0.5), "½");
        assert_eq!(format_fraction(2.75), "2¾");
        assert_eq!(format_fraction(1.0 / 3.0), "⅓");
        assert_eq!(format_fraction(4.0), "4");
        assert_eq!(format_fraction(1.45), "1.45");
    }

    #[test]
    fn display_format_from_str() {
        assert_eq!("Fraction".parse::<DisplayFormat>(), Ok(DisplayFormat::Fraction));
        assert!("metric".parse::<DisplayFormat>().is_err());
    }
}
