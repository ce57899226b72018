//! Report assembly: runs the pipeline and lays out the workbook.
//!
//! Layout is computed first as a plain [`Report`] value, then replayed into
//! a [`WorkbookSink`] sheet by sheet (create, rows, images).
use crate::charts::{group_charts, role_distribution};
use crate::config::{RenderFailurePolicy, RunConfig};
use crate::error::Result;
use crate::groups::{partition, Group};
use crate::insights::extract_insights;
use crate::loader::{load_and_clean, LoadReport};
use crate::render::ChartRenderer;
use crate::sentiment::{classify_records, SentimentClassifier};
use crate::types::{ChartSpec, InsightTable, Record};
use crate::util::{format_int, round2};
use crate::workbook::{Cell, WorkbookSink};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

pub const SUMMARY_SHEET: &str = "Analysis Summary";

/// Per-run values threaded through the pipeline.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub started_at: DateTime<Local>,
    pub start: Instant,
}

impl RunContext {
    pub fn new() -> Self {
        RunContext { started_at: Local::now(), start: Instant::now() }
    }

    pub fn timestamp(&self) -> String {
        self.started_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn output_file_name(&self) -> String {
        format!("EventInsights_{}.xlsx", self.started_at.format("%Y-%m-%d_%H-%M-%S"))
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Summary,
    Insights,
    Charts,
}

/// One sheet: rows are written first, then the charts at their anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub kind: SheetKind,
    pub rows: Vec<Vec<Cell>>,
    pub charts: Vec<ChartSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupInsights {
    pub role: String,
    pub tables: Vec<InsightTable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub sheets: Vec<Sheet>,
    pub insights: Vec<GroupInsights>,
}

fn insight_rows(tables: &[InsightTable]) -> Vec<Vec<Cell>> {
    let mut rows = Vec::new();
    for t in tables {
        rows.push(vec![Cell::from(t.name.as_str())]);
        rows.push(vec![Cell::from(t.name.as_str()), Cell::from("Count")]);
        for e in &t.entries {
            rows.push(vec![Cell::from(e.value.as_str()), Cell::from(e.count)]);
        }
        rows.push(Vec::new());
    }
    rows
}

fn summary_sheet(records: &[Record], load: &LoadReport, ctx: &RunContext) -> Sheet {
    Sheet {
        name: SUMMARY_SHEET.to_string(),
        kind: SheetKind::Summary,
        rows: vec![
            vec![Cell::from("Analysis Timestamp"), Cell::from(ctx.timestamp())],
            vec![Cell::from("Total Entries Analyzed"), Cell::from(records.len())],
            vec![Cell::from("Execution Time (seconds)"), Cell::from(round2(ctx.elapsed_secs()))],
            vec![Cell::from("Rows Dropped (unparseable age)"), Cell::from(load.dropped_age)],
            Vec::new(),
        ],
        charts: vec![role_distribution(records)],
    }
}

/// Longest sheet name Excel accepts.
const MAX_SHEET_NAME: usize = 31;

/// `"<role> <suffix>"`, shortening the role rather than the suffix so the
/// name fits Excel's limit and the two sheets of a group stay distinct.
fn group_sheet_name(role: &str, suffix: &str) -> String {
    let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count() + 1);
    let role: String = role.chars().take(keep).collect();
    format!("{role} {suffix}")
}

/// Lay out the whole workbook: summary first, then per group an insights
/// sheet and a charts sheet, in group order.
pub fn build_report(records: &[Record], load: &LoadReport, groups: &[Group], ctx: &RunContext) -> Report {
    let mut sheets = vec![summary_sheet(records, load, ctx)];
    let mut insights = Vec::with_capacity(groups.len());

    for g in groups {
        let tables = extract_insights(g);
        sheets.push(Sheet {
            name: group_sheet_name(&g.role, "Report"),
            kind: SheetKind::Insights,
            rows: insight_rows(&tables),
            charts: Vec::new(),
        });
        sheets.push(Sheet {
            name: group_sheet_name(&g.role, "Charts"),
            kind: SheetKind::Charts,
            rows: Vec::new(),
            charts: group_charts(g),
        });
        insights.push(GroupInsights { role: g.role.clone(), tables });
    }
    Report { sheets, insights }
}

/// Replay a report into a workbook sink. Does not save.
pub fn write_report<R, W>(report: &Report, renderer: &R, sink: &mut W, policy: RenderFailurePolicy) -> Result<()>
where
    R: ChartRenderer + ?Sized,
    W: WorkbookSink + ?Sized,
{
    for sheet in &report.sheets {
        let id = sink.create_sheet(&sheet.name)?;
        for row in &sheet.rows {
            sink.append_row(id, row)?;
        }
        for chart in &sheet.charts {
            match renderer.render(chart) {
                Ok(png) => sink.embed_image(id, chart.anchor, &png)?,
                Err(e) if policy == RenderFailurePolicy::Placeholder => {
                    warn!("Chart '{}' skipped: {}", chart.title, e);
                    sink.append_row(id, &[Cell::from(format!("{}: chart unavailable ({})", chart.title, e))])?;
                }
                Err(e) => return Err(e),
            }
        }
        info!("Wrote sheet '{}'", sheet.name);
    }
    Ok(())
}

/// Run one batch end to end and save the workbook.
///
/// Returns the path of the saved file and the assembled report. Any error
/// aborts before `save`, so a failed run leaves no output file.
pub fn run<C, R, W>(
    config: &RunConfig,
    ctx: &RunContext,
    classifier: &C,
    renderer: &R,
    sink: &mut W,
) -> Result<(PathBuf, Report)>
where
    C: SentimentClassifier + ?Sized,
    R: ChartRenderer + ?Sized,
    W: WorkbookSink + ?Sized,
{
    let (mut records, load) = load_and_clean(&config.input, config.delimiter)?;
    classify_records(&mut records, classifier)?;

    let groups = partition(&records, &config.expected_roles);
    info!(
        "Building report for {} records in {} groups",
        format_int(records.len()),
        groups.len()
    );

    let report = build_report(&records, &load, &groups, ctx);
    write_report(&report, renderer, sink, config.render_failure)?;

    let path = config.output_dir.join(ctx.output_file_name());
    sink.save(&path)?;
    Ok((path, report))
}
