use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unsupported input encoding: {0} (only utf-8 is supported)")]
    UnsupportedEncoding(String),

    #[error("Sentiment classification failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Failed to render chart '{title}': {reason}")]
    Render { title: String, reason: String },

    #[error("Workbook error: {0}")]
    Workbook(String),
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::Workbook(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("could not start classifier '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not exchange data with classifier '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("classifier exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("classifier returned malformed output: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("classifier returned {actual} ratings for {expected} comments")]
    LengthMismatch { expected: usize, actual: usize },
}
