use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use survey_insights::report::SUMMARY_SHEET;
use survey_insights::workbook::WorkbookOp;
use survey_insights::{
    run, Cell, ChartRenderer, ChartSpec, ClassifierError, MemoryWorkbook, ReportError, RunConfig,
    RunContext, SentimentClassifier,
};
use tempfile::NamedTempFile;

const HEADER: &str = "Select your role;Enter your age;What motivated you to participate?;Briefly comment about your experience;What improvements should we apply to the program?;Would you participate again?;Why would you participate again or not?";

/// Deterministic stand-in for the model: looks comments up in a table.
struct LookupClassifier(HashMap<&'static str, &'static str>);

impl SentimentClassifier for LookupClassifier {
    fn classify(&self, batch: &[String]) -> Result<Vec<String>, ClassifierError> {
        Ok(batch
            .iter()
            .map(|c| self.0.get(c.as_str()).copied().unwrap_or("3 stars").to_string())
            .collect())
    }
}

struct ConstantClassifier(&'static str);

impl SentimentClassifier for ConstantClassifier {
    fn classify(&self, batch: &[String]) -> Result<Vec<String>, ClassifierError> {
        Ok(batch.iter().map(|_| self.0.to_string()).collect())
    }
}

struct Unavailable;

impl SentimentClassifier for Unavailable {
    fn classify(&self, _batch: &[String]) -> Result<Vec<String>, ClassifierError> {
        Err(ClassifierError::Failed { status: "exit status: 1".into(), stderr: "model missing".into() })
    }
}

struct StubRenderer;

impl ChartRenderer for StubRenderer {
    fn render(&self, spec: &ChartSpec) -> survey_insights::Result<Vec<u8>> {
        Ok(spec.title.as_bytes().to_vec())
    }
}

fn write_input(rows: &[&str]) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    writeln!(f, "{HEADER}").unwrap();
    for r in rows {
        writeln!(f, "{r}").unwrap();
    }
    f.flush().unwrap();
    f
}

fn config_for(input: &NamedTempFile) -> RunConfig {
    let mut cfg = RunConfig::new(input.path());
    cfg.output_dir = PathBuf::from("reports");
    cfg
}

fn ten_rows() -> NamedTempFile {
    write_input(&[
        "Volunteer;23;Help others;Amazing day;More water;Yes;Great team",
        "Volunteer;35;Help others;Too chaotic;Better signage;No;Disorganized",
        "Donor;52;Tax benefits;Smooth process;;Yes;Transparent",
        "Volunteer;unknown;Friends;Fine;;Yes;Fun",
        "Donor;44;Give back;Too chaotic;Online receipts;Maybe;",
        "Volunteer;29;Friends;;More water;Yes;Great team",
        "Donor;;Give back;Amazing day;;Yes;Impact",
        "Volunteer;30;Help others;Amazing day;;Yes;Great team",
        "Donor;61;Give back;;Online receipts;No;Too many emails",
        "Volunteer;41;Career;Fine;Better signage;Maybe;Learned a lot",
    ])
}

fn lookup() -> LookupClassifier {
    LookupClassifier(HashMap::from([
        ("Amazing day", "5 stars"),
        ("Smooth process", "4 stars"),
        ("Too chaotic", "1 star"),
        ("Fine", "3 stars"),
    ]))
}

fn cell_text(c: &Cell) -> &str {
    match c {
        Cell::Text(t) => t,
        _ => "",
    }
}

#[test]
fn two_roles_with_bad_ages_give_five_sheets() {
    let input = ten_rows();
    let mut wb = MemoryWorkbook::new();
    let ctx = RunContext::new();
    let (path, report) = run(&config_for(&input), &ctx, &lookup(), &StubRenderer, &mut wb).unwrap();

    assert_eq!(
        wb.sheet_names(),
        &[SUMMARY_SHEET, "Volunteer Report", "Volunteer Charts", "Donor Report", "Donor Charts"]
    );
    assert_eq!(path, PathBuf::from("reports").join(ctx.output_file_name()));
    assert_eq!(wb.ops.last(), Some(&WorkbookOp::Save(path.display().to_string())));

    let summary = wb.sheet_id(SUMMARY_SHEET).unwrap();
    let rows = wb.rows(summary);
    assert_eq!(rows[1], &[Cell::from("Total Entries Analyzed"), Cell::Number(8.0)][..]);
    assert_eq!(rows[3], &[Cell::from("Rows Dropped (unparseable age)"), Cell::Number(2.0)][..]);
    assert_eq!(wb.images(summary).len(), 1);

    let role_pie = &report.sheets[0].charts[0];
    assert_eq!(role_pie.points, vec![("Volunteer".to_string(), 5.0), ("Donor".to_string(), 3.0)]);

    let volunteer = &report.insights[0];
    assert_eq!(volunteer.role, "Volunteer");
    let motivations: Vec<(&str, usize)> =
        volunteer.tables[0].entries.iter().map(|e| (e.value.as_str(), e.count)).collect();
    assert_eq!(motivations, vec![("Help others", 3), ("Friends", 1), ("Career", 1)]);
    // Positive: rows 23 and 30 ("Amazing day") -> reason "Great team" twice.
    assert_eq!(volunteer.tables[1].entries[0].value, "Great team");
    assert_eq!(volunteer.tables[1].total(), 2);
    assert_eq!(volunteer.tables[2].entries[0].value, "Too chaotic");

    let donor_charts = wb.sheet_id("Donor Charts").unwrap();
    assert_eq!(wb.images(donor_charts).len(), 3);
    let sentiment = &report.sheets[4].charts[0];
    assert_eq!(
        sentiment.points,
        vec![
            ("NEGATIVE".to_string(), 1.0),
            ("NEUTRAL".to_string(), 1.0),
            ("POSITIVE".to_string(), 1.0)
        ]
    );
}

#[test]
fn insights_sheet_layout_is_written_in_order() {
    let input = ten_rows();
    let mut wb = MemoryWorkbook::new();
    run(&config_for(&input), &RunContext::new(), &lookup(), &StubRenderer, &mut wb).unwrap();

    let sheet = wb.sheet_id("Donor Report").unwrap();
    let rows = wb.rows(sheet);
    let headers: Vec<&str> = rows
        .iter()
        .filter(|r| r.len() == 1)
        .map(|r| cell_text(&r[0]))
        .collect();
    assert_eq!(
        headers,
        vec!["Motivations", "Positive Aspects", "Negative Aspects", "Suggested Improvements"]
    );
    assert_eq!(rows.iter().filter(|r| r.is_empty()).count(), 4);
    assert_eq!(rows[1], &[Cell::from("Motivations"), Cell::from("Count")][..]);
    assert_eq!(rows[2], &[Cell::from("Give back"), Cell::Number(2.0)][..]);
}

#[test]
fn expected_role_without_records_still_gets_sheets() {
    let input = write_input(&[
        "Volunteer;23;Help;Amazing day;;Yes;Fun",
        "Guest;not-a-number;Curious;Too chaotic;;No;Bored",
    ]);
    let mut cfg = config_for(&input);
    cfg.expected_roles = vec!["Volunteer".to_string(), "Guest".to_string()];
    let mut wb = MemoryWorkbook::new();
    let (_, report) = run(&cfg, &RunContext::new(), &lookup(), &StubRenderer, &mut wb).unwrap();

    assert_eq!(wb.sheet_names().len(), 5);
    let guest = &report.insights[1];
    assert_eq!(guest.role, "Guest");
    assert_eq!(guest.tables.len(), 4);
    assert!(guest.tables.iter().all(|t| t.is_empty()));

    let guest_report = wb.sheet_id("Guest Report").unwrap();
    assert_eq!(wb.rows(guest_report).len(), 4 * 3);

    let guest_charts = &report.sheets[4];
    assert_eq!(guest_charts.name, "Guest Charts");
    let sentiment: Vec<f64> = guest_charts.charts[0].points.iter().map(|(_, v)| *v).collect();
    assert_eq!(sentiment, vec![0.0, 0.0, 0.0]);
    assert!(guest_charts.charts[2].points.is_empty());
    assert_eq!(wb.images(wb.sheet_id("Guest Charts").unwrap()).len(), 3);
}

#[test]
fn neutral_classifier_empties_sentiment_tables_only() {
    let input = ten_rows();
    let mut wb = MemoryWorkbook::new();
    let (_, report) = run(
        &config_for(&input),
        &RunContext::new(),
        &ConstantClassifier("3 stars"),
        &StubRenderer,
        &mut wb,
    )
    .unwrap();

    let (_, classified) =
        run(&config_for(&input), &RunContext::new(), &lookup(), &StubRenderer, &mut MemoryWorkbook::new())
            .unwrap();

    for (g, c) in report.insights.iter().zip(&classified.insights) {
        assert_eq!(g.role, c.role);
        assert!(g.tables[1].is_empty());
        assert!(g.tables[2].is_empty());
        // Sentiment-independent tables match a classified run exactly.
        assert_eq!(g.tables[0], c.tables[0], "motivations for {}", g.role);
        assert_eq!(g.tables[3], c.tables[3], "improvements for {}", g.role);
    }
    let donor_motivations: Vec<(&str, usize)> =
        report.insights[1].tables[0].entries.iter().map(|e| (e.value.as_str(), e.count)).collect();
    assert_eq!(donor_motivations, vec![("Give back", 2), ("Tax benefits", 1)]);
    let volunteer_sentiment = &report.sheets[2].charts[0].points;
    assert_eq!(volunteer_sentiment[1], ("NEUTRAL".to_string(), 5.0));
}

#[test]
fn classifier_failure_aborts_without_saving() {
    let input = ten_rows();
    let mut wb = MemoryWorkbook::new();
    let err = run(&config_for(&input), &RunContext::new(), &Unavailable, &StubRenderer, &mut wb).unwrap_err();
    assert!(matches!(err, ReportError::Classifier(ClassifierError::Failed { .. })));
    assert!(wb.ops.is_empty());
}

#[test]
fn missing_columns_abort_before_anything_is_written() {
    let mut f = NamedTempFile::new().unwrap();
    writeln!(f, "Role;Age\nDonor;30").unwrap();
    let mut wb = MemoryWorkbook::new();
    let err = run(&RunConfig::new(f.path()), &RunContext::new(), &lookup(), &StubRenderer, &mut wb).unwrap_err();
    assert!(matches!(err, ReportError::MissingColumns(_)));
    assert!(wb.ops.is_empty());
}

#[test]
fn repeated_runs_produce_identical_tables() {
    let input = ten_rows();
    let ctx = RunContext::new();
    let (_, a) = run(&config_for(&input), &ctx, &lookup(), &StubRenderer, &mut MemoryWorkbook::new()).unwrap();
    let (_, b) = run(&config_for(&input), &ctx, &lookup(), &StubRenderer, &mut MemoryWorkbook::new()).unwrap();
    assert_eq!(a.insights, b.insights);
}
