use crate::error::{ReportError, Result};
use std::path::PathBuf;

/// What to do when a chart cannot be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFailurePolicy {
    /// Abort the run; no workbook is saved.
    #[default]
    Abort,
    /// Log the failure and write a note row instead of the image.
    Placeholder,
}

/// Everything one batch run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub delimiter: u8,
    pub expected_roles: Vec<String>,
    pub render_failure: RenderFailurePolicy,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        RunConfig {
            input: input.into(),
            output_dir: PathBuf::from("."),
            delimiter: b';',
            expected_roles: Vec::new(),
            render_failure: RenderFailurePolicy::Abort,
        }
    }
}

/// Only UTF-8 input is read; accept the usual spellings of it.
pub fn check_encoding(encoding: &str) -> Result<()> {
    match encoding.trim().to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Ok(()),
        other => Err(ReportError::UnsupportedEncoding(other.to_string())),
    }
}

/// Delimiters must be a single ASCII character.
pub fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    let s = if s == "\\t" { "\t" } else { s };
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
    }
}
