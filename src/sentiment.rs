//! Sentiment classification adapter.
//!
//! The model itself lives outside this crate behind [`SentimentClassifier`].
//! This module batches the non-empty comments, calls the classifier exactly
//! once, and maps the returned star ratings onto [`Sentiment`].
use crate::error::ClassifierError;
use crate::types::{Record, Sentiment};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

/// External capability mapping an ordered batch of texts to a parallel
/// batch of rating labels such as `"4 stars"`.
pub trait SentimentClassifier {
    fn classify(&self, batch: &[String]) -> Result<Vec<String>, ClassifierError>;
}

static RATING_LABELS: Lazy<HashMap<&'static str, Sentiment>> = Lazy::new(|| {
    HashMap::from([
        ("1 star", Sentiment::Negative),
        ("2 stars", Sentiment::Negative),
        ("3 stars", Sentiment::Neutral),
        ("4 stars", Sentiment::Positive),
        ("5 stars", Sentiment::Positive),
        ("1", Sentiment::Negative),
        ("2", Sentiment::Negative),
        ("3", Sentiment::Neutral),
        ("4", Sentiment::Positive),
        ("5", Sentiment::Positive),
    ])
});

/// Map a rating label to a sentiment. Unknown labels are NEUTRAL.
pub fn sentiment_for_label(label: &str) -> Sentiment {
    RATING_LABELS.get(label.trim()).copied().unwrap_or(Sentiment::Neutral)
}

/// Assign a sentiment to every record.
///
/// Records with an empty comment stay NEUTRAL and are not sent to the
/// classifier. A failing batch call aborts the run.
pub fn classify_records<C>(records: &mut [Record], classifier: &C) -> Result<(), ClassifierError>
where
    C: SentimentClassifier + ?Sized,
{
    for r in records.iter_mut() {
        r.sentiment = Sentiment::Neutral;
    }

    let positions: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.comment.is_empty())
        .map(|(i, _)| i)
        .collect();
    if positions.is_empty() {
        debug!("No comments to classify");
        return Ok(());
    }

    let batch: Vec<String> = positions.iter().map(|&i| records[i].comment.clone()).collect();
    let started = Instant::now();
    let labels = classifier.classify(&batch)?;
    if labels.len() != batch.len() {
        return Err(ClassifierError::LengthMismatch { expected: batch.len(), actual: labels.len() });
    }
    info!(
        "Classified {} comments in {:.2}s",
        batch.len(),
        started.elapsed().as_secs_f64()
    );

    for (&i, label) in positions.iter().zip(&labels) {
        records[i].sentiment = sentiment_for_label(label);
    }
    Ok(())
}

/// Runs an external program as the classifier.
///
/// The batch is written to the program's stdin as a JSON array of strings;
/// the program must print a JSON array of ratings (strings like `"4 stars"`
/// or integers 1-5) in the same order.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RatingValue {
    Label(String),
    Stars(i64),
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandClassifier { program: program.into(), args }
    }
}

impl SentimentClassifier for CommandClassifier {
    fn classify(&self, batch: &[String]) -> Result<Vec<String>, ClassifierError> {
        debug!("Invoking classifier '{}' with {} texts", self.program, batch.len());
        let payload = serde_json::to_vec(batch)?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ClassifierError::Spawn { program: self.program.clone(), source })?;

        // Feed stdin from its own thread while `wait_with_output` drains
        // stdout and stderr; a full pipe on either side must not deadlock.
        let stdin = child.stdin.take();
        let (output, written) = thread::scope(|s| {
            let writer = s.spawn(move || -> io::Result<()> {
                if let Some(mut stdin) = stdin {
                    stdin.write_all(&payload)?;
                }
                Ok(())
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked")));
            (output, written)
        });

        let output = output.map_err(|source| ClassifierError::Io { program: self.program.clone(), source })?;
        // An early exit also breaks the stdin pipe; the exit status and
        // stderr carry the real cause, so they are checked first.
        if !output.status.success() {
            return Err(ClassifierError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written.map_err(|source| ClassifierError::Io { program: self.program.clone(), source })?;

        let ratings: Vec<RatingValue> = serde_json::from_slice(&output.stdout)?;
        Ok(ratings
            .into_iter()
            .map(|r| match r {
                RatingValue::Label(s) => s,
                RatingValue::Stars(n) => n.to_string(),
            })
            .collect())
    }
}
