//! Integer-cent money helpers.

use crate::errors::CoreError;

/// Format cents as a decimal amount, e.g. `129900` → `"1299.00"`.
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Parse a decimal amount with at most two fractional digits into cents.
///
/// Accepts `"1299"`, `"1299.5"` and `"1299.00"`; rejects signs, thousands
/// separators and extra precision.
///
/// # Errors
///
/// Returns `CoreError::Validation` when the text is not a plain amount.
pub fn parse_cents(raw: &str) -> Result<i64, CoreError> {
    let invalid = || CoreError::Validation(format!("invalid amount '{raw}'"));
    let trimmed = raw.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty()
        || fraction.len() > 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };
    whole
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(fraction))
        .ok_or_else(invalid)
}

/// Split `total` into `parts` installments; the remainder lands on the last one.
///
/// Returns an empty vector when `parts` is zero.
#[must_use]
pub fn split_installments(total: i64, parts: u32) -> Vec<i64> {
    if parts == 0 {
        return Vec::new();
    }
    let n = i64::from(parts);
    let base = total / n;
    let mut out = vec![base; parts as usize];
    if let Some(last) = out.last_mut() {
        *last += total - base * n;
    }
    out
}
