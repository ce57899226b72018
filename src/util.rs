// Utility helpers for parsing, counting and formatting.
//
// Centralizes the "dirty" cell handling so the rest of the code can assume
// clean, typed values.
use crate::types::InsightEntry;
use num_format::{Locale, ToFormattedString};
use std::collections::HashMap;

/// Parse an age cell.
///
/// - Accepts `Option<&str>` so callers can pass through missing cells.
/// - Trims surrounding whitespace.
/// - Returns `None` for empty cells, text, `NaN` and infinities.
pub fn parse_age(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // `f64::from_str` would happily accept "inf" and "NaN"; only the
    // exponent marker is allowed through.
    if s.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Decade bucket of an age: `floor(age / 10) * 10`.
pub fn age_bucket(age: f64) -> i64 {
    (age / 10.0).floor() as i64 * 10
}

/// Count non-empty values and rank them by descending count.
///
/// Ties keep the order in which each distinct value was first seen, so the
/// ranking is stable across runs over the same input.
pub fn rank_counts<'a, I>(values: I) -> Vec<InsightEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut entries: Vec<InsightEntry> = Vec::new();
    for v in values {
        if v.is_empty() {
            continue;
        }
        match index.get(v) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(v, entries.len());
                entries.push(InsightEntry { value: v.to_string(), count: 1 });
            }
        }
    }
    // `sort_by` is stable, which preserves first-seen order among ties.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Make a string usable as an Excel sheet name: no `[]:*?/\`, at most 31
/// characters, never empty.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(31)
        .collect();
    let trimmed = cleaned.trim_matches('\'');
    if trimmed.trim().is_empty() {
        "Sheet".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in log messages
    // (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_age_accepts_numbers_only() {
        assert_eq!(parse_age(Some(" 23 ")), Some(23.0));
        assert_eq!(parse_age(Some("41.5")), Some(41.5));
        assert_eq!(parse_age(Some("")), None);
        assert_eq!(parse_age(Some("twenty")), None);
        assert_eq!(parse_age(Some("NaN")), None);
        assert_eq!(parse_age(Some("inf")), None);
        assert_eq!(parse_age(None), None);
    }

    #[test]
    fn parse_age_reads_exponent_notation() {
        assert_eq!(parse_age(Some("2.5e1")), Some(25.0));
        assert_eq!(parse_age(Some("3E1")), Some(30.0));
        assert_eq!(parse_age(Some("e")), None);
        assert_eq!(parse_age(Some("1e400")), None);
    }

    #[test]
    fn age_bucket_floors_to_decade() {
        assert_eq!(age_bucket(23.0), 20);
        assert_eq!(age_bucket(29.0), 20);
        assert_eq!(age_bucket(30.0), 30);
        assert_eq!(age_bucket(9.9), 0);
        assert_eq!(age_bucket(67.5), 60);
    }

    #[test]
    fn rank_counts_orders_by_count_then_first_seen() {
        let ranked = rank_counts(["b", "a", "", "a", "c", "b", "d"]);
        let got: Vec<(&str, usize)> = ranked.iter().map(|e| (e.value.as_str(), e.count)).collect();
        assert_eq!(got, vec![("b", 2), ("a", 2), ("c", 1), ("d", 1)]);
    }

    #[test]
    fn rank_counts_of_nothing_is_empty() {
        assert!(rank_counts(Vec::<&str>::new()).is_empty());
        assert!(rank_counts(["", ""]).is_empty());
    }

    #[test]
    fn sheet_names_are_excel_safe() {
        assert_eq!(sanitize_sheet_name("Volunteer Report"), "Volunteer Report");
        assert_eq!(sanitize_sheet_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), 31);
        assert_eq!(sanitize_sheet_name(""), "Sheet");
    }

    #[test]
    fn format_int_groups_thousands() {
        assert_eq!(format_int(9855usize), "9,855");
    }
}
