use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::finsheet::tools::model::CellValue;

fn non_numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\d.]").expect("invalid non-numeric regex"))
}

fn parenthesized_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\(\s*[\d.,\s]*\d[\d.,\s]*\)").expect("invalid parenthesized number regex")
    })
}

fn text_noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\d.()]").expect("invalid text noise regex"))
}

fn alpha_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z]+").expect("invalid alpha run regex"))
}

/// Extracts the numeric content of a cell.
///
/// Numbers pass through unchanged. Text is trimmed and stripped of every
/// character other than digits and `.`; accounting-style parentheses, either
/// wrapping the whole value or wrapping the only number inside surrounding
/// text, make the result negative. Values beyond the `f64` range are treated
/// like unparseable ones. Text that leaves nothing parseable behind yields
/// `None`.
pub fn clean_numeric_value(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Missing => None,
        CellValue::Number(number) => (!number.is_nan()).then_some(*number),
        CellValue::Text(text) => clean_numeric_text(text),
    }
}

fn clean_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();

    let wrapped = trimmed.len() >= 2 && trimmed.starts_with('(') && trimmed.ends_with(')');
    let (body, is_negative) = if wrapped {
        (&trimmed[1..trimmed.len() - 1], true)
    } else {
        (trimmed, only_number_is_parenthesized(trimmed))
    };

    let digits = non_numeric_re().replace_all(body, "");
    if digits.is_empty() {
        return None;
    }

    match digits.parse::<f64>() {
        Ok(number) if !number.is_finite() => {
            warn!(value = %digits, "numeric value out of range");
            None
        }
        Ok(number) if is_negative => Some(-number),
        Ok(number) => Some(number),
        Err(error) => {
            warn!(value = %digits, %error, "failed to parse numeric value");
            None
        }
    }
}

/// True when the text carries a parenthesized number and no digit outside of
/// it, as in `CAD (100)`. `Revenue (2023) 500` does not qualify.
fn only_number_is_parenthesized(text: &str) -> bool {
    let Some(found) = parenthesized_number_re().find(text) else {
        return false;
    };
    !text[..found.start()]
        .chars()
        .chain(text[found.end()..].chars())
        .any(|ch| ch.is_ascii_digit())
}

/// Returns the descriptive words embedded in a cell, space-joined.
///
/// Digits, decimal points and parentheses are removed first, then every run
/// of ASCII letters is kept. Missing cells and numbers produce an empty
/// string, which callers read as "no annotation".
pub fn extract_text_content(value: &CellValue) -> String {
    let CellValue::Text(text) = value else {
        return String::new();
    };

    let stripped = text_noise_re().replace_all(text, "");
    alpha_run_re()
        .find_iter(&stripped)
        .map(|found| found.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
