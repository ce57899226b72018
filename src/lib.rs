//! Survey insight reports.
//!
//! Loads survey responses from a delimited file, classifies the sentiment of
//! free-text comments through an external classifier, aggregates per-role
//! insight tables and charts, and writes everything into a multi-sheet
//! workbook.
pub mod charts;
pub mod config;
pub mod error;
pub mod groups;
pub mod insights;
pub mod loader;
pub mod output;
pub mod render;
pub mod report;
pub mod sentiment;
pub mod types;
pub mod util;
pub mod workbook;

pub use config::{RenderFailurePolicy, RunConfig};
pub use error::{ClassifierError, ReportError, Result};
pub use render::{ChartRenderer, SvgChartRenderer};
pub use report::{build_report, run, write_report, Report, RunContext};
pub use sentiment::{CommandClassifier, SentimentClassifier};
pub use types::{Anchor, ChartKind, ChartPalette, ChartSpec, InsightTable, Record, Sentiment};
pub use workbook::{Cell, MemoryWorkbook, WorkbookSink, XlsxWorkbook};
