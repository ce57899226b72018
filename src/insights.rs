use crate::groups::Group;
use crate::types::{InsightTable, Record, Sentiment};
use crate::util::rank_counts;

pub const MOTIVATIONS: &str = "Motivations";
pub const POSITIVE_ASPECTS: &str = "Positive Aspects";
pub const NEGATIVE_ASPECTS: &str = "Negative Aspects";
pub const SUGGESTED_IMPROVEMENTS: &str = "Suggested Improvements";

fn table<'a>(name: &str, values: impl IntoIterator<Item = &'a str>) -> InsightTable {
    InsightTable { name: name.to_string(), entries: rank_counts(values) }
}

fn with_sentiment(records: &[Record], s: Sentiment) -> impl Iterator<Item = &Record> {
    records.iter().filter(move |r| r.sentiment == s)
}

/// The four insight tables of a group, in report order.
pub fn extract_insights(group: &Group) -> Vec<InsightTable> {
    let records = &group.records;
    vec![
        table(MOTIVATIONS, records.iter().map(|r| r.motivation.as_str())),
        table(
            POSITIVE_ASPECTS,
            with_sentiment(records, Sentiment::Positive).map(|r| r.reason.as_str()),
        ),
        table(
            NEGATIVE_ASPECTS,
            with_sentiment(records, Sentiment::Negative).map(|r| r.comment.as_str()),
        ),
        table(
            SUGGESTED_IMPROVEMENTS,
            records.iter().map(|r| r.suggested_improvements.as_str()),
        ),
    ]
}
