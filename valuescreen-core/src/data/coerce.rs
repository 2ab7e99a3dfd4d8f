//! Numeric coercion of raw fact values.

/// Markers source pages use for "no value".
const PLACEHOLDERS: &[&str] = &["-", "—", "N/A", "n/a", "NaN", "nan"];

/// Coerce a raw cell to a number.
///
/// Thousands separators and surrounding whitespace are stripped, then the
/// remainder is parsed as `f64`. Empty, placeholder, unparsable and
/// non-finite cells are undefined (`None`); coercion never fails.
pub fn coerce_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed) {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
