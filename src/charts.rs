//! Chart specifications derived from record statistics.
//!
//! Everything here is pure data; pixels are produced by a
//! [`ChartRenderer`](crate::render::ChartRenderer).
use crate::groups::Group;
use crate::types::{Anchor, ChartKind, ChartPalette, ChartSpec, Record, Sentiment};
use crate::util::{age_bucket, rank_counts};
use std::collections::BTreeMap;

pub const ROLE_CHART_ANCHOR: Anchor = Anchor::new(1, 3); // D2
pub const SENTIMENT_CHART_ANCHOR: Anchor = Anchor::new(1, 1); // B2
pub const AGE_CHART_ANCHOR: Anchor = Anchor::new(1, 11); // L2
pub const PARTICIPATION_CHART_ANCHOR: Anchor = Anchor::new(22, 6); // G23

/// Slice label for records whose value is empty.
pub const BLANK_LABEL: &str = "(blank)";

/// Ranked slices over every value, empty ones included under [`BLANK_LABEL`],
/// so the slices always sum to the number of records.
fn counted_points<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<(String, f64)> {
    rank_counts(values.into_iter().map(|v| if v.is_empty() { BLANK_LABEL } else { v }))
        .into_iter()
        .map(|e| (e.value, e.count as f64))
        .collect()
}

/// Pie of records per role over the whole canonical relation.
pub fn role_distribution(records: &[Record]) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Pie,
        title: "Volunteer vs Donor Distribution".to_string(),
        category_label: "Role".to_string(),
        value_label: "Count".to_string(),
        points: counted_points(records.iter().map(|r| r.role.as_str())),
        palette: ChartPalette::Pastel,
        anchor: ROLE_CHART_ANCHOR,
    }
}

/// Bar chart with exactly NEGATIVE, NEUTRAL, POSITIVE, zero-filled.
pub fn sentiment_distribution(group: &Group) -> ChartSpec {
    let points = Sentiment::ORDERED
        .iter()
        .map(|s| {
            let n = group.records.iter().filter(|r| r.sentiment == *s).count();
            (s.as_str().to_string(), n as f64)
        })
        .collect();
    ChartSpec {
        kind: ChartKind::Bar,
        title: format!("Sentiment Distribution - {}", group.role),
        category_label: "Sentiment".to_string(),
        value_label: "Number of Comments".to_string(),
        points,
        palette: ChartPalette::Diverging,
        anchor: SENTIMENT_CHART_ANCHOR,
    }
}

/// Bar chart of records per age decade, ascending by decade.
pub fn age_distribution(group: &Group) -> ChartSpec {
    // Buckets live only in this local map; the records are not touched.
    let mut buckets: BTreeMap<i64, usize> = BTreeMap::new();
    for r in &group.records {
        *buckets.entry(age_bucket(r.age)).or_default() += 1;
    }
    ChartSpec {
        kind: ChartKind::Bar,
        title: format!("Age Distribution - {}", group.role),
        category_label: "Age Group (10-year intervals)".to_string(),
        value_label: "Count".to_string(),
        points: buckets.into_iter().map(|(b, n)| (b.to_string(), n as f64)).collect(),
        palette: ChartPalette::Pastel,
        anchor: AGE_CHART_ANCHOR,
    }
}

/// Pie of `would_participate_again` answers, most frequent first.
pub fn participation_distribution(group: &Group) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Pie,
        title: format!("Would Participate Again - {}", group.role),
        category_label: "Would Participate Again".to_string(),
        value_label: "Count".to_string(),
        points: counted_points(group.records.iter().map(|r| r.would_participate_again.as_str())),
        palette: ChartPalette::Pastel,
        anchor: PARTICIPATION_CHART_ANCHOR,
    }
}

/// The three per-group charts in sheet order.
pub fn group_charts(group: &Group) -> Vec<ChartSpec> {
    vec![
        sentiment_distribution(group),
        age_distribution(group),
        participation_distribution(group),
    ]
}
