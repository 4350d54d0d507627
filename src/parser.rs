//! Field-level parsers for catalog and site cells.
//!
//! Every parser returns a [`ParseError`] instead of guessing; the caller
//! decides which default to substitute.

use crate::error::ParseError;

/// Parses a numeric cell. Empty cells are [`ParseError::Missing`]; `NaN` and
/// infinities are rejected.
pub fn parse_number(raw: &str) -> Result<f64, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Missing);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::NotNumeric(trimmed.to_string())),
    }
}

/// Parses an optional numeric cell, folding `None` into [`ParseError::Missing`].
pub fn parse_optional_number(raw: Option<&str>) -> Result<f64, ParseError> {
    raw.map_or(Err(ParseError::Missing), parse_number)
}

/// Parses a site temperature range such as `"2-18"`.
///
/// The cell is split on `-` and the first two pieces are read as bounds, so a
/// negative lower bound (`"-5-10"`) does not parse.
pub fn parse_site_temperature_range(raw: &str) -> Result<(f64, f64), ParseError> {
    if !raw.contains('-') {
        return Err(ParseError::MalformedRange(raw.to_string()));
    }
    let mut parts = raw.split('-');
    let (Some(lo), Some(hi)) = (parts.next(), parts.next()) else {
        return Err(ParseError::MalformedRange(raw.to_string()));
    };
    let lo = parse_number(lo).map_err(|_| ParseError::MalformedRange(raw.to_string()))?;
    let hi = parse_number(hi).map_err(|_| ParseError::MalformedRange(raw.to_string()))?;
    Ok((lo, hi))
}

/// Parses a drone temperature resistance such as `"-20°C to 50°C"`.
pub fn parse_resistance_range(raw: &str) -> Result<(f64, f64), ParseError> {
    if raw.trim() == "Not specified" {
        return Err(ParseError::Missing);
    }
    let cleaned = raw.replace("°C", "");
    let parts: Vec<&str> = cleaned.split(" to ").collect();
    match parts.as_slice() {
        [lo, hi] => {
            let lo = parse_number(lo).map_err(|_| ParseError::MalformedRange(raw.to_string()))?;
            let hi = parse_number(hi).map_err(|_| ParseError::MalformedRange(raw.to_string()))?;
            Ok((lo, hi))
        }
        _ => Err(ParseError::MalformedRange(raw.to_string())),
    }
}

/// Title-cases text: the first letter of every alphabetic run is upper case,
/// the remaining letters lower case.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for c in raw.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
