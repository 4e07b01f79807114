use chrono::{DateTime, FixedOffset, TimeZone};

use crate::models::TransactionKind;

/// Insert thousands separators into a string of ASCII digits.
fn group_digits(digits: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format a count with thousands separators: 1234567 -> "1,234,567"
pub fn number(val: u64) -> String {
    group_digits(&val.to_string())
}

/// en-US style number: grouped integer part, at most three fraction digits,
/// trailing zeros dropped. 1234.5 -> "1,234.5", 1000 -> "1,000".
pub fn locale_number(val: f64) -> String {
    let rounded = format!("{:.3}", val.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let is_zero = int_part.chars().all(|c| c == '0') && frac.is_empty();

    let mut out = String::new();
    if val < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Dollar amount at full locale precision, used for chart ticks and tooltips.
pub fn currency(val: f64) -> String {
    format!("${}", locale_number(val))
}

/// Signed transaction amount with exactly two decimals and no grouping:
/// "- $42.50" for purchases, "+ $42.50" for sales.
pub fn signed_amount(kind: TransactionKind, total: f64) -> String {
    format!("{} ${:.2}", kind.sign(), total)
}

/// Short numeric date (M/D/YYYY) in the given timezone.
pub fn short_date<Tz: TimeZone>(at: &DateTime<FixedOffset>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%-m/%-d/%Y").to_string()
}
