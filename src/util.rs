// Utility helpers for parsing and formatting.
//
// All the forgiving CSV number/date handling lives here so the loader and the
// core can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
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
    s.parse::<f64>().ok()
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // CSV dates are expected in `YYYY-MM-DD` format.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Trimmed owned string, with `fallback` for missing or blank cells.
pub fn text_or(s: Option<String>, fallback: &str) -> String {
    match s {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
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
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
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

/// Kilograms rendered as tonnes from 1000 kg upwards.
pub fn format_weight(kg: f64) -> String {
    if kg >= 1000.0 {
        format!("{} t", format_number(kg / 1000.0, 1))
    } else {
        format!("{} kg", format_number(kg, 0))
    }
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_parse_forgivingly() {
        assert_eq!(parse_f64_safe(Some("1,250.5")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("  42 ")), Some(42.0));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn dates_parse_iso_only() {
        assert_eq!(
            parse_date_safe(Some("2024-04-01")),
            NaiveDate::from_ymd_opt(2024, 4, 1)
        );
        assert_eq!(parse_date_safe(Some("04/01/2024")), None);
        assert_eq!(parse_date_safe(Some(" ")), None);
    }

    #[test]
    fn numbers_get_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_number(0.0, 1), "0.0");
        assert_eq!(format_int(9855u64), "9,855");
    }

    #[test]
    fn weights_switch_to_tonnes() {
        assert_eq!(format_weight(750.0), "750 kg");
        assert_eq!(format_weight(1500.0), "1.5 t");
        assert_eq!(format_weight(2_345_000.0), "2,345.0 t");
    }

    #[test]
    fn blank_text_falls_back() {
        assert_eq!(text_or(Some("  Tokyo ".into()), "-"), "Tokyo");
        assert_eq!(text_or(Some("   ".into()), "-"), "-");
        assert_eq!(text_or(None, "-"), "-");
    }
}
