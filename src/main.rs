// Entry point: parse the command line, wire the real collaborators
// (command classifier, SVG renderer, xlsx workbook) and run one batch.
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use survey_insights::config::{check_encoding, parse_delimiter};
use survey_insights::{
    output, report, CommandClassifier, RenderFailurePolicy, RunConfig, RunContext, SvgChartRenderer,
    XlsxWorkbook,
};
use tracing::{debug, info};

/// Survey Insights - sentiment-aware survey report generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Delimited survey file to analyze
    #[arg(default_value = "volunteering_data.csv")]
    input: PathBuf,

    /// Field delimiter (single character; "\t" for tab)
    #[arg(short, long, default_value = ";", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Input text encoding (only utf-8 is supported)
    #[arg(long, default_value = "utf-8")]
    encoding: String,

    /// Directory the workbook is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Sentiment classifier program (reads a JSON array of texts on stdin,
    /// prints a JSON array of star ratings)
    #[arg(short, long)]
    classifier: String,

    /// Extra argument passed to the classifier program (repeatable)
    #[arg(long = "classifier-arg", allow_hyphen_values = true)]
    classifier_args: Vec<String>,

    /// Role that always gets its own sheets, even with no responses (repeatable)
    #[arg(long = "role")]
    roles: Vec<String>,

    /// Keep going when a chart fails to render, leaving a note instead
    #[arg(long)]
    partial_report: bool,

    /// Print the insight tables to stdout before saving
    #[arg(long)]
    preview: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let ctx = RunContext::new();
    let args = Args::parse();
    debug!("Arguments: {:?}", args);
    check_encoding(&args.encoding)?;

    let config = RunConfig {
        input: args.input,
        output_dir: args.output_dir,
        delimiter: args.delimiter,
        expected_roles: args.roles,
        render_failure: if args.partial_report {
            RenderFailurePolicy::Placeholder
        } else {
            RenderFailurePolicy::Abort
        },
    };
    info!("Starting survey analysis of {}", config.input.display());

    let classifier = CommandClassifier::new(args.classifier, args.classifier_args);
    let renderer = SvgChartRenderer::new();
    let mut workbook = XlsxWorkbook::new();

    let (path, report) = report::run(&config, &ctx, &classifier, &renderer, &mut workbook)
        .with_context(|| format!("Report generation failed for {}", config.input.display()))?;

    if args.preview {
        output::preview_insights(&report.insights, 10);
    }
    println!("Report saved to {}", path.display());
    Ok(())
}
