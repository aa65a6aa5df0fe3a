//! Value coercion.
//!
//! Every read of raw sheet data goes through here so that malformed cells
//! degrade to a caller-supplied default instead of leaking `NaN` into the
//! numeric pipeline. Nothing in this module fails.

use crate::domain::{Cell, SheetTable};

/// Parse a numeric string, ignoring `,` thousands separators.
///
/// The longest leading number is read and anything after it is ignored, so
/// `"100 USD"` gives `100`. Returns `None` when there is no leading number or
/// it is not finite.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|&c| c != ',').collect();
    let v = leading_number(cleaned.trim())?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// `[sign] digits [. digits] [e [sign] digits]` at the start of `s`.
fn leading_number(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        // A bare `e` is not part of the number.
        if exp_end > exp {
            end = exp_end;
        }
    }

    Some(&s[..end])
}

/// Numeric content of a raw cell, if it has any.
pub fn cell_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => parse_number(s),
        _ => None,
    }
}

/// Look up `table[tenor][column]`, falling back to `default` when the tenor or
/// column is absent or the stored value is not finite.
pub fn coerce(table: &SheetTable, tenor: &str, column: &str, default: f64) -> f64 {
    match table.value(tenor, column) {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(parse_number("1,234,567.5"), Some(1_234_567.5));
        assert_eq!(parse_number(" -2,000 "), Some(-2000.0));
    }

    #[test]
    fn rejects_garbage_and_non_finite() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number(","), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn reads_leading_number_and_ignores_suffix() {
        assert_eq!(parse_number("12abc"), Some(12.0));
        assert_eq!(parse_number("100 USD"), Some(100.0));
        assert_eq!(parse_number("1,250.5 bbl"), Some(1250.5));
        assert_eq!(parse_number("-.5x"), Some(-0.5));
        assert_eq!(parse_number("3."), Some(3.0));
        assert_eq!(parse_number("2e3kg"), Some(2000.0));
        assert_eq!(parse_number("7e"), Some(7.0));
        assert_eq!(parse_number("0x10"), Some(0.0));
        assert_eq!(parse_number("USD 100"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("1e999"), None);
    }

    #[test]
    fn numeric_cells_pass_through() {
        assert_eq!(cell_number(&Cell::Number(-0.25)), Some(-0.25));
        assert_eq!(cell_number(&Cell::Number(0.0)), Some(0.0));
        assert_eq!(cell_number(&Cell::Number(f64::NAN)), None);
        assert_eq!(cell_number(&Cell::Bool(true)), None);
        assert_eq!(cell_number(&Cell::text("100 USD")), Some(100.0));
        assert_eq!(cell_number(&Cell::Empty), None);
    }

    #[test]
    fn coerce_is_total() {
        let mut table = SheetTable::from_rows([("Cash", [("Jan", 100.0), ("Feb", f64::NAN)])]);
        table.merge("3M".into(), Default::default(), crate::domain::MergePolicy::LastWins);

        assert_eq!(coerce(&table, "Cash", "Jan", 0.0), 100.0);
        assert_eq!(coerce(&table, "Cash", "Feb", -1.0), -1.0);
        assert_eq!(coerce(&table, "Cash", "Mar", 7.0), 7.0);
        assert_eq!(coerce(&table, "3M", "Jan", 0.0), 0.0);
        assert_eq!(coerce(&table, "Missing", "Jan", 3.0), 3.0);
    }
}
