//! Ratio strings and cooking fractions
//!
//! Recipe quantities are authored as ratio strings (`"2"`, `"3/4"`,
//! `"1 1/2"`). Scaling multiplies them by a batch multiplier that is first
//! snapped to sixteenths, so every scaled quantity stays a fraction with a
//! small denominator.

use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Denominator used when turning a decimal multiplier into a fraction
pub const MULTIPLIER_DENOMINATOR: i64 = 16;

/// Tolerance for snapping a decimal amount onto a cooking fraction
const SNAP_TOLERANCE: f64 = 0.01;

/// Denominators a cook expects to read: halves, thirds, quarters, eighths
const COOKING_DENOMINATORS: [i64; 4] = [2, 3, 4, 8];

static RATIO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)\s+(\d+)/(\d+)|(\d+)/(\d+)|(\d+))$").expect("ratio pattern is valid")
});

/// A reduced fraction; the denominator is always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Fraction {
    pub num: i64,
    pub den: i64,
}

impl Fraction {
    /// Build a reduced fraction, or `None` for a zero denominator
    pub fn new(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let sign = if den < 0 { -1 } else { 1 };
        let divisor = gcd(num, den).max(1);
        Some(Self {
            num: sign * num / divisor,
            den: sign * den / divisor,
        })
    }

    pub fn whole(value: i64) -> Self {
        Self { num: value, den: 1 }
    }

    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fraction(*self))
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Parse `"N"`, `"N/D"` or `"W N/D"` into a reduced fraction
///
/// Blank input, any other shape, and zero denominators yield `None`; callers
/// render such quantities literally without scaling.
pub fn parse_ratio(text: &str) -> Option<Fraction> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let caps = RATIO.captures(trimmed)?;
    let int = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i64>().ok());

    if let (Some(whole), Some(num), Some(den)) = (int(1), int(2), int(3)) {
        let num = whole.checked_mul(den)?.checked_add(num)?;
        return Fraction::new(num, den);
    }
    if let (Some(num), Some(den)) = (int(4), int(5)) {
        return Fraction::new(num, den);
    }
    int(6).map(Fraction::whole)
}

/// Snap a decimal to the nearest sixteenth
pub fn decimal_to_fraction(value: f64) -> Fraction {
    if !value.is_finite() {
        return Fraction::whole(0);
    }
    let num = (value * MULTIPLIER_DENOMINATOR as f64).round() as i64;
    Fraction::new(num, MULTIPLIER_DENOMINATOR).unwrap_or(Fraction::whole(0))
}

/// Scale a fraction by a multiplier snapped to sixteenths
pub fn multiply_fraction(frac: Fraction, multiplier: f64) -> Fraction {
    let factor = decimal_to_fraction(multiplier);
    match (
        frac.num.checked_mul(factor.num),
        frac.den.checked_mul(factor.den),
    ) {
        (Some(num), Some(den)) => Fraction::new(num, den).unwrap_or(Fraction::whole(0)),
        _ => decimal_to_fraction(frac.to_f64() * factor.to_f64()),
    }
}

/// Render as a whole number, bare fraction, or mixed number
pub fn format_fraction(frac: Fraction) -> String {
    if frac.den == 1 {
        return frac.num.to_string();
    }
    let sign = if frac.num < 0 { "-" } else { "" };
    let num = frac.num.abs();
    let whole = num / frac.den;
    let rem = num % frac.den;
    if whole == 0 {
        format!("{}{}/{}", sign, rem, frac.den)
    } else {
        format!("{}{} {}/{}", sign, whole, rem, frac.den)
    }
}

/// Render a converted decimal amount
///
/// Amounts sitting on a common cooking fraction read as that fraction;
/// anything else is rounded to two decimals with trailing zeros dropped.
pub fn format_amount_for_display(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    for den in COOKING_DENOMINATORS {
        let num = (value * den as f64).round();
        if (value - num / den as f64).abs() < SNAP_TOLERANCE {
            if let Some(frac) = Fraction::new(num as i64, den) {
                return format_fraction(frac);
            }
        }
    }
    match Decimal::from_f64(value) {
        Some(d) => d
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
            .to_string(),
        None => format!("{:.2}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_shapes() {
        assert_eq!(parse_ratio("2"), Some(Fraction::whole(2)));
        assert_eq!(parse_ratio("3/4"), Fraction::new(3, 4));
        assert_eq!(parse_ratio("1 1/2"), Fraction::new(3, 2));
        assert_eq!(parse_ratio("  2/4 "), Fraction::new(1, 2));
        assert_eq!(parse_ratio("6/3"), Some(Fraction::whole(2)));
    }

    #[test]
    fn rejects_other_shapes() {
        for text in ["", "   ", "1/0", "0.5", "a pinch", "1 2", "1/2/3", "-1", "1  1/0"] {
            assert_eq!(parse_ratio(text), None, "expected None for {:?}", text);
        }
    }

    #[test]
    fn multiplier_is_snapped_to_sixteenths() {
        assert_eq!(decimal_to_fraction(0.5), Fraction::new(1, 2).unwrap());
        // 1/3 snaps to 5/16
        assert_eq!(decimal_to_fraction(1.0 / 3.0), Fraction::new(5, 16).unwrap());
        let scaled = multiply_fraction(Fraction::whole(1), 1.0 / 3.0);
        assert_eq!(format_fraction(scaled), "5/16");
    }

    #[test]
    fn half_cup_doubled_is_one() {
        let frac = parse_ratio("1/2").unwrap();
        assert_eq!(format_fraction(multiply_fraction(frac, 2.0)), "1");
    }

    #[test]
    fn formats_mixed_numbers() {
        assert_eq!(format_fraction(Fraction::new(7, 4).unwrap()), "1 3/4");
        assert_eq!(format_fraction(Fraction::new(3, 8).unwrap()), "3/8");
        assert_eq!(format_fraction(Fraction::whole(0)), "0");
        assert_eq!(format_fraction(Fraction::new(-3, 2).unwrap()), "-1 1/2");
    }

    #[test]
    fn display_amounts_snap_or_round() {
        assert_eq!(format_amount_for_display(0.5), "1/2");
        assert_eq!(format_amount_for_display(0.333), "1/3");
        assert_eq!(format_amount_for_display(2.0), "2");
        assert_eq!(format_amount_for_display(1.125), "1 1/8");
        assert_eq!(format_amount_for_display(3.5274), "3.53");
        assert_eq!(format_amount_for_display(2.1), "2.1");
    }
}
