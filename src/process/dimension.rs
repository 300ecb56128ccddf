// src/process/dimension.rs

use once_cell::sync::Lazy;
use regex::Regex;

static FEET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)'").expect("feet pattern"));
static INCH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"([0-9]+)""#).expect("inch pattern"));

/// Convert a dimension cell to whole inches.
///
/// Understands `5'6"`, `6'`, `14"` and bare numbers like `48` or `1,200`.
/// Returns `None` when the text carries no digits at all (or the value
/// does not fit in a `u64`).
pub fn to_inches(text: &str) -> Option<u64> {
    let mut working = text;
    let mut feet = None;

    // first feet token anywhere; only a leading one is cut from the text
    if let Some(caps) = FEET_RE.captures(text) {
        feet = Some(caps[1].parse::<u64>().ok()?);
        let whole = caps.get(0)?;
        if whole.start() == 0 {
            working = &text[whole.end()..];
        }
    }

    let inch = match INCH_RE.captures(working) {
        Some(caps) => Some(caps[1].parse::<u64>().ok()?),
        None => None,
    };

    if feet.is_some() || inch.is_some() {
        return feet
            .unwrap_or(0)
            .checked_mul(12)?
            .checked_add(inch.unwrap_or(0));
    }

    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}
