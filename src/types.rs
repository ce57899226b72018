use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Three-valued sentiment derived from the classifier's ordinal rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sentiment {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl Sentiment {
    /// Fixed category order used by the sentiment bar chart.
    pub const ORDERED: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
            Sentiment::Positive => "POSITIVE",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One survey response after normalization. Text fields are never null;
/// a missing cell is an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub role: String,
    pub age: f64,
    pub motivation: String,
    pub comment: String,
    pub suggested_improvements: String,
    pub would_participate_again: String,
    pub reason: String,
    pub sentiment: Sentiment,
}

/// A single (value, occurrences) pair of an insight table.
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct InsightEntry {
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// Frequency-ranked list of text values, highest count first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightTable {
    pub name: String,
    pub entries: Vec<InsightEntry>,
}

impl InsightTable {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
}

/// Colour scheme a renderer should fill the categories with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartPalette {
    #[default]
    Pastel,
    /// Cool-to-warm ramp for ordered categories such as sentiment.
    Diverging,
}

/// Zero-based cell position, written and parsed in A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub row: u32,
    pub col: u16,
}

impl Anchor {
    pub const fn new(row: u32, col: u16) -> Self {
        Anchor { row, col }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut n = self.col as u32 + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        let col: String = letters.into_iter().rev().collect();
        write!(f, "{}{}", col, self.row + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorParseError(pub String);

impl fmt::Display for AnchorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cell reference '{}'", self.0)
    }
}

impl std::error::Error for AnchorParseError {}

impl FromStr for Anchor {
    type Err = AnchorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AnchorParseError(s.to_string());
        let s_up = s.trim().to_ascii_uppercase();
        let split = s_up.find(|c: char| c.is_ascii_digit()).ok_or_else(err)?;
        let (letters, digits) = s_up.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(err());
        }
        let mut col: u32 = 0;
        for c in letters.chars() {
            col = col * 26 + (c as u32 - 'A' as u32 + 1);
            if col > u16::MAX as u32 {
                return Err(err());
            }
        }
        let row: u32 = digits.parse().map_err(|_| err())?;
        if row == 0 {
            return Err(err());
        }
        Ok(Anchor { row: row - 1, col: (col - 1) as u16 })
    }
}

/// Declarative chart description; rendering happens elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    /// Axis label for the categories.
    pub category_label: String,
    /// Axis label for the values; unused by pies.
    pub value_label: String,
    pub points: Vec<(String, f64)>,
    pub palette: ChartPalette,
    pub anchor: Anchor,
}

impl ChartSpec {
    pub fn total(&self) -> f64 {
        self.points.iter().map(|(_, v)| *v).sum()
    }
}
