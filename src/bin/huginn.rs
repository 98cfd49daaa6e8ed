//! huginn: annotate review records from the command line.
//!
//! Prints one JSON object per line on stdout. `one` prints the outcome
//! (`{"status":"success",…}` / `{"status":"error",…}`). `bulk` tags every
//! line with an `event`: one `review_analyzed` line per record, then a
//! final `bulk_analysis_finished` line. Logs go to stderr.

use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tracing::info;

use huginn::config::{Config, Secrets};
use huginn::{HuginnBuilder, Outcome, Record, RecordId};

/// Huginn annotation CLI
#[derive(Parser)]
#[command(name = "huginn")]
#[command(version = huginn::PKG_VERSION)]
#[command(about = "Sentiment, tags and summaries for review records")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "HUGINN_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured model.
    #[arg(short, long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a single record
    One {
        /// Record id (numeric ids are kept as numbers)
        #[arg(long)]
        id: String,
        /// Record text (or omit to read from stdin)
        text: Option<String>,
    },

    /// Analyze many records, streaming results as they complete
    Bulk {
        /// JSON array or JSON-lines file of `{id, text}` records (or omit to read from stdin)
        input: Option<PathBuf>,
        /// Simultaneous requests (1-5)
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // stdout carries the event stream, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("huginn=info")),
        )
        .init();

    let args = Args::parse();

    let config = Config::load_or_default(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    let mut builder = HuginnBuilder::from_config(&config, &secrets);
    if let Some(model) = args.model {
        builder = builder.model(model);
    }

    info!(version = huginn::version_string(), "huginn starting");

    match args.command {
        Command::One { id, text } => {
            let text = match text {
                Some(text) => text,
                None => strip_line_ending(read_stdin()?),
            };
            let orchestrator = builder.build()?;
            let record = Record::new(parse_id(&id), text);

            let outcome = orchestrator.analyze_one(&record).await;
            print_line(&outcome)?;
            if let Outcome::Failure { .. } = outcome {
                std::process::exit(1);
            }
        }
        Command::Bulk { input, concurrency } => {
            let raw = match input {
                Some(path) => std::fs::read_to_string(&path)
                    .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
                None => read_stdin()?,
            };
            let records = Record::parse_many(&raw)?;

            if let Some(n) = concurrency {
                builder = builder.concurrency(n);
            }
            let orchestrator = builder.build()?;

            let mut events = orchestrator.analyze_bulk_stream(records);
            while let Some(event) = events.next().await {
                print_line(&event)?;
            }
        }
    }

    Ok(())
}

/// Ids that look like integers are kept numeric, matching grid row ids.
fn parse_id(raw: &str) -> RecordId {
    match raw.parse::<i64>() {
        Ok(n) => RecordId::from(n),
        Err(_) => RecordId::from(raw),
    }
}

/// Drop the single line ending a shell pipe adds; the text is otherwise kept as is.
fn strip_line_ending(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

fn write_line<T: serde::Serialize>(
    mut out: impl Write,
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn print_line<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    write_line(io::stdout().lock(), value)
}

fn read_stdin() -> Result<String, Box<dyn std::error::Error>> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Err("no input given; pass it as an argument or pipe it on stdin".into());
    }
    let mut buf = String::new();
    stdin.read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use huginn::{BatchSummary, BulkEvent};

    fn rendered(event: &BulkEvent) -> serde_json::Value {
        let mut buf = Vec::new();
        write_line(&mut buf, event).unwrap();
        assert_eq!(buf.last(), Some(&b'\n'));
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn bulk_lines_all_carry_an_event_tag() {
        let outcome = rendered(&BulkEvent::Outcome(Outcome::Failure {
            id: RecordId::from(4i64),
            message: "AI returned an invalid data format.".to_string(),
        }));
        assert_eq!(outcome["event"], "review_analyzed");
        assert_eq!(outcome["status"], "error");
        assert_eq!(outcome["id"], 4);

        let finished = rendered(&BulkEvent::Finished(BatchSummary {
            total: 1,
            succeeded: 0,
            failed: 1,
        }));
        assert_eq!(finished["event"], "bulk_analysis_finished");
        assert_eq!(finished["failed"], 1);
    }

    #[test]
    fn only_the_trailing_line_ending_is_stripped() {
        assert_eq!(strip_line_ending("great app\n".into()), "great app");
        assert_eq!(strip_line_ending("great app\r\n".into()), "great app");
        assert_eq!(strip_line_ending("great app  \n\n".into()), "great app  \n");
        assert_eq!(strip_line_ending("  spaced  ".into()), "  spaced  ");
    }

    #[test]
    fn numeric_ids_stay_numeric() {
        assert_eq!(parse_id("15"), RecordId::from(15i64));
        assert_eq!(parse_id("row-15"), RecordId::from("row-15"));
    }
}
