use crate::error::{ReportError, Result};
use crate::types::{Record, Sentiment};
use crate::util::{format_int, parse_age};
use csv::{ReaderBuilder, StringRecord};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Canonical fields every survey file must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Role,
    Age,
    Motivation,
    Comment,
    SuggestedImprovements,
    WouldParticipateAgain,
    Reason,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Role,
        Field::Age,
        Field::Motivation,
        Field::Comment,
        Field::SuggestedImprovements,
        Field::WouldParticipateAgain,
        Field::Reason,
    ];

    pub fn canonical_name(&self) -> &'static str {
        match self {
            Field::Role => "Role",
            Field::Age => "Age",
            Field::Motivation => "Motivation",
            Field::Comment => "Comment",
            Field::SuggestedImprovements => "Suggested Improvements",
            Field::WouldParticipateAgain => "Would Participate Again",
            Field::Reason => "Reason",
        }
    }
}

// Header text (after trimming) -> canonical field. Both the survey form's
// question texts and the canonical names are accepted.
static COLUMN_MAP: Lazy<HashMap<&'static str, Field>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("Select your role", Field::Role);
    m.insert("Enter your age", Field::Age);
    m.insert("What motivated you to participate?", Field::Motivation);
    m.insert("Briefly comment about your experience", Field::Comment);
    m.insert("What improvements should we apply to the program?", Field::SuggestedImprovements);
    m.insert("Would you participate again?", Field::WouldParticipateAgain);
    m.insert("Why would you participate again or not?", Field::Reason);
    for f in Field::ALL {
        m.insert(f.canonical_name(), f);
    }
    m
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_age: usize,
    pub parse_errors: usize,
}

/// Column positions of the canonical fields inside the input header.
#[derive(Debug, Clone)]
struct ColumnIndex(HashMap<Field, usize>);

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut idx = HashMap::new();
        for (pos, h) in headers.iter().enumerate() {
            match COLUMN_MAP.get(h.trim()) {
                // First matching column wins if a file repeats a header.
                Some(field) => {
                    idx.entry(*field).or_insert(pos);
                }
                None => debug!("Ignoring unmapped column '{}'", h.trim()),
            }
        }
        let missing: Vec<String> = Field::ALL
            .iter()
            .filter(|f| !idx.contains_key(*f))
            .map(|f| f.canonical_name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ReportError::MissingColumns(missing));
        }
        Ok(ColumnIndex(idx))
    }

    fn get<'r>(&self, row: &'r StringRecord, field: Field) -> Option<&'r str> {
        self.0.get(&field).and_then(|&i| row.get(i))
    }

    fn text(&self, row: &StringRecord, field: Field) -> String {
        self.get(row, field).unwrap_or_default().to_string()
    }
}

/// Load and clean a survey file from disk.
pub fn load_and_clean(path: impl AsRef<Path>, delimiter: u8) -> Result<(Vec<Record>, LoadReport)> {
    let path = path.as_ref();
    info!("Loading survey responses from {}", path.display());
    let file = std::fs::File::open(path)?;
    load_from_reader(file, delimiter)
}

/// Turn raw delimited rows into canonical records.
///
/// Rows whose age cannot be parsed are dropped here, before any grouping
/// happens; the number dropped is reported and logged.
pub fn load_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<(Vec<Record>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);
    let columns = ColumnIndex::from_headers(rdr.headers()?)?;

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping unreadable row {}: {}", report.total_rows, e);
                report.parse_errors += 1;
                continue;
            }
        };

        let Some(age) = parse_age(columns.get(&row, Field::Age)) else {
            report.dropped_age += 1;
            continue;
        };

        records.push(Record {
            role: columns.text(&row, Field::Role),
            age,
            motivation: columns.text(&row, Field::Motivation),
            comment: columns.text(&row, Field::Comment),
            suggested_improvements: columns.text(&row, Field::SuggestedImprovements),
            would_participate_again: columns.text(&row, Field::WouldParticipateAgain),
            reason: columns.text(&row, Field::Reason),
            sentiment: Sentiment::Neutral,
        });
    }
    report.kept_rows = records.len();

    info!(
        "Processed dataset: {} rows read, {} kept",
        format_int(report.total_rows),
        format_int(report.kept_rows)
    );
    if report.dropped_age > 0 {
        warn!("Dropped {} rows with an unparseable age", format_int(report.dropped_age));
    }
    if report.parse_errors > 0 {
        warn!("Skipped {} rows the CSV reader could not decode", format_int(report.parse_errors));
    }
    Ok((records, report))
}
