//! Field validators shared by the stores.
//!
//! Every check returns [`Error::Validation`] naming the offending field.

use crate::errors::{Error, Result};

/// Maximum length of category and product names
pub const NAME_MAX_LEN: usize = 256;
/// Maximum length of a category slug
pub const SLUG_MAX_LEN: usize = 50;
/// Maximum length of a username
pub const USERNAME_MAX_LEN: usize = 150;
/// Largest value the price column accepts
pub const PRICE_MAX: i64 = 2_147_483_647;
/// Upper bound for review scores and average scores
pub const SCORE_MAX: i16 = 5;

/// Checks that `value` is not blank and at most `max_len` characters long.
pub fn required_text(field: &'static str, value: &str, max_len: Option<usize>) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "this field is required"));
    }
    if let Some(max_len) = max_len {
        let len = value.chars().count();
        if len > max_len {
            return Err(Error::validation(
                field,
                format!("at most {max_len} characters allowed, got {len}"),
            ));
        }
    }
    Ok(())
}

/// Checks a slug: non-empty, bounded, only `[A-Za-z0-9_-]`.
pub fn slug(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation("slug", "this field is required"));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(Error::validation(
            "slug",
            format!("character {bad:?} is not allowed; use latin letters, digits, hyphen or underscore"),
        ));
    }
    if value.len() > SLUG_MAX_LEN {
        return Err(Error::validation(
            "slug",
            format!("at most {SLUG_MAX_LEN} characters allowed"),
        ));
    }
    Ok(())
}

/// Checks that a price lies in `[0, PRICE_MAX]`.
pub fn price(value: i64) -> Result<()> {
    if !(0..=PRICE_MAX).contains(&value) {
        return Err(Error::validation(
            "price",
            format!("must be between 0 and {PRICE_MAX}, got {value}"),
        ));
    }
    Ok(())
}

/// Checks an optional average score: finite and in `[0, 5]` when present.
pub fn avg_score(value: Option<f64>) -> Result<()> {
    match value {
        Some(score) if !score.is_finite() || !(0.0..=f64::from(SCORE_MAX)).contains(&score) => {
            Err(Error::validation(
                "avg_score",
                format!("must be between 0 and {SCORE_MAX}, got {score}"),
            ))
        }
        _ => Ok(()),
    }
}

/// Checks a review score: in `[0, 5]`.
pub fn score(value: i16) -> Result<()> {
    if !(0..=SCORE_MAX).contains(&value) {
        return Err(Error::validation(
            "score",
            format!("must be between 0 and {SCORE_MAX}, got {value}"),
        ));
    }
    Ok(())
}
