// Utility helpers for parsing, guarded arithmetic and number formatting.
//
// Every ratio in the engine goes through `ppm` or `percent_change` so that a
// zero denominator resolves to a defined value instead of NaN or infinity.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Counts are sometimes exported as `12.0`; accept those but reject real
/// fractions and negatives.
pub fn parse_u64_safe(s: Option<&str>) -> Option<u64> {
    let v = parse_f64_safe(s)?;
    if v < 0.0 || v.fract() != 0.0 {
        return None;
    }
    Some(v as u64)
}

/// Defect rate in parts per million. Zero deliveries yield 0.
pub fn ppm(defective: f64, deliveries: f64) -> f64 {
    if deliveries <= 0.0 {
        return 0.0;
    }
    let v = defective / deliveries * 1_000_000.0;
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Relative change in percent.
///
/// `previous == 0` has no meaningful ratio: growth from nothing reports 100,
/// no movement reports 0, and a drop below zero reports -100.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous != 0.0 {
        let v = (current - previous) / previous * 100.0;
        return if v.is_finite() { v } else { 0.0 };
    }
    if current > 0.0 {
        100.0
    } else if current < 0.0 {
        -100.0
    } else {
        0.0
    }
}

pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Round `value` up to the next multiple of `step`, never returning less than
/// `floor`.
pub fn round_up_to_step(value: f64, step: f64, floor: f64) -> f64 {
    if step <= 0.0 || !value.is_finite() {
        return floor;
    }
    let ceiling = (value / step).ceil() * step;
    ceiling.max(floor)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with a fixed number of decimal places and
    // locale-aware thousands separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppm_guards_zero_deliveries() {
        assert_eq!(ppm(10.0, 0.0), 0.0);
        assert_eq!(ppm(0.0, 0.0), 0.0);
        assert_eq!(ppm(30.0, 300_000.0), 100.0);
    }

    #[test]
    fn percent_change_fallbacks() {
        assert_eq!(percent_change(150.0, 100.0), 50.0);
        assert_eq!(percent_change(50.0, 100.0), -50.0);
        assert_eq!(percent_change(5.0, 0.0), 100.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn rounds_up_to_step_with_floor() {
        assert_eq!(round_up_to_step(41.0, 20.0, 20.0), 60.0);
        assert_eq!(round_up_to_step(40.0, 20.0, 20.0), 40.0);
        assert_eq!(round_up_to_step(0.0, 20.0, 20.0), 20.0);
        assert_eq!(round_up_to_step(101.0, 100.0, 100.0), 200.0);
    }

    #[test]
    fn parses_spreadsheet_numbers() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_u64_safe(Some("12.0")), Some(12));
        assert_eq!(parse_u64_safe(Some("-3")), None);
        assert_eq!(parse_u64_safe(Some("1.5")), None);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_int(9855_i64), "9,855");
    }
}
