//! Single-cell normalizers for messy real-world values.
//!
//! Each function handles one pattern (ratios stored as fractions, percent signs,
//! thousands separators and unit placeholders) and never fails: values it cannot
//! handle come back unchanged. Callers chain the ones that match their data.
//!
//! ```rust,ignore
//! use autoclean::{normalize, Cell};
//!
//! let cell = normalize::replace_symbol(&Cell::text("12.5 %"));
//! assert_eq!(cell, "12.5");
//! ```

use crate::models::Cell;

/// Tokens `convert_ratio` leaves untouched.
const RATIO_SENTINELS: [&str; 4] = ["inf", "-inf", "nan", "Nan"];

/// Tokens `is_not_numeric` treats as numeric-like.
const NUMERIC_SENTINELS: [&str; 4] = ["inf", "-inf", "NaN", "nan"];

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Round to two decimals from the exact binary value, ties to even.
fn round2(v: f64) -> f64 {
    format!("{:.2}", v).parse().unwrap_or(v)
}

/// Convert a ratio to a percentage rounded to two decimals.
///
/// Sentinel text (`inf`, `-inf`, `nan`, `Nan`) and unparsable text are returned as-is.
pub fn convert_ratio(x: &Cell) -> Cell {
    match x {
        Cell::Missing => Cell::Missing,
        Cell::Number(v) => Cell::Number(round2(v * 100.0)),
        Cell::Integer(n) => Cell::Number(round2(*n as f64 * 100.0)),
        Cell::Text(s) if RATIO_SENTINELS.contains(&s.as_str()) => x.clone(),
        Cell::Text(s) => match parse_float(s) {
            Some(v) => Cell::Number(round2(v * 100.0)),
            None => x.clone(),
        },
    }
}

/// Strip `%` signs and spaces from values that contain a `%`.
pub fn replace_symbol(x: &Cell) -> String {
    let text = x.to_text();
    if text.contains('%') {
        text.replace(['%', ' '], "")
    } else {
        text
    }
}

/// True when the value is neither a number nor a numeric sentinel.
pub fn is_not_numeric(x: &Cell) -> bool {
    match x {
        Cell::Missing | Cell::Integer(_) | Cell::Number(_) => false,
        Cell::Text(s) => !NUMERIC_SENTINELS.contains(&s.as_str()) && parse_float(s).is_none(),
    }
}

/// Drop thousands separators and replace the `RU` placeholder with `0`.
pub fn clean_thousands_and_units(x: &Cell) -> Cell {
    match x {
        Cell::Text(s) => Cell::Text(s.replace(',', "").replace("RU", "0")),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_ratio_sentinels_unchanged() {
        for token in ["inf", "-inf", "nan", "Nan"] {
            assert_eq!(convert_ratio(&Cell::text(token)), Cell::text(token));
        }
    }

    #[test]
    fn test_convert_ratio_numeric() {
        assert_eq!(convert_ratio(&Cell::text("0.5")), Cell::Number(50.0));
        assert_eq!(convert_ratio(&Cell::text("0.1234")), Cell::Number(12.34));
        assert_eq!(convert_ratio(&Cell::text(" 2 ")), Cell::Number(200.0));
        assert_eq!(convert_ratio(&Cell::Number(0.25)), Cell::Number(25.0));
        assert_eq!(convert_ratio(&Cell::Integer(3)), Cell::Number(300.0));
    }

    #[test]
    fn test_convert_ratio_rounds_like_decimal() {
        // products land on or just under a two-decimal tie
        assert_eq!(convert_ratio(&Cell::text("0.00125")), Cell::Number(0.12));
        assert_eq!(convert_ratio(&Cell::text("0.02675")), Cell::Number(2.67));
        assert_eq!(convert_ratio(&Cell::text("0.00625")), Cell::Number(0.62));
        assert_eq!(convert_ratio(&Cell::Number(0.00125)), Cell::Number(0.12));
    }

    #[test]
    fn test_convert_ratio_unparsable_unchanged() {
        assert_eq!(convert_ratio(&Cell::text("abc")), Cell::text("abc"));
        assert_eq!(convert_ratio(&Cell::text("12%")), Cell::text("12%"));
        assert_eq!(convert_ratio(&Cell::Missing), Cell::Missing);
    }

    #[test]
    fn test_replace_symbol() {
        assert_eq!(replace_symbol(&Cell::text("45%")), "45");
        assert_eq!(replace_symbol(&Cell::text("45% ")), "45");
        assert_eq!(replace_symbol(&Cell::text("45")), "45");
        assert_eq!(replace_symbol(&Cell::text("4 5 %")), "45");
        // no '%' means spaces survive
        assert_eq!(replace_symbol(&Cell::text("4 5")), "4 5");
        assert_eq!(replace_symbol(&Cell::Number(45.0)), "45.0");
    }

    #[test]
    fn test_is_not_numeric() {
        assert!(!is_not_numeric(&Cell::text("3.14")));
        assert!(is_not_numeric(&Cell::text("abc")));
        assert!(!is_not_numeric(&Cell::text("nan")));
        assert!(!is_not_numeric(&Cell::text("NaN")));
        assert!(!is_not_numeric(&Cell::text("-inf")));
        assert!(!is_not_numeric(&Cell::Number(1.0)));
        assert!(!is_not_numeric(&Cell::Missing));
        assert!(is_not_numeric(&Cell::text("1,000")));
    }

    #[test]
    fn test_clean_thousands_and_units() {
        assert_eq!(clean_thousands_and_units(&Cell::text("1,000")), Cell::text("1000"));
        assert_eq!(clean_thousands_and_units(&Cell::text("RU")), Cell::text("0"));
        assert_eq!(
            clean_thousands_and_units(&Cell::text("1,2RU4")),
            Cell::text("1204")
        );
        assert_eq!(clean_thousands_and_units(&Cell::Number(1.5)), Cell::Number(1.5));
        assert_eq!(clean_thousands_and_units(&Cell::Missing), Cell::Missing);
    }
}
