use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use learner_grades::fixtures;
use learner_grades::grading::{self, parse_timestamp};
use learner_grades::report;
use learner_grades::{Clock, FixedClock, GradebookInput, SystemClock};

#[derive(Parser)]
#[command(name = "learner-grades")]
#[command(about = "Weighted grade summaries for a course assignment group", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade the built-in sample gradebook
    Sample {
        /// Evaluate due dates as of this time instead of now
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<DateTime<Utc>>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Grade a gradebook file and print the summaries as JSON
    Score {
        #[arg(long)]
        input: PathBuf,
        /// Replace the gradebook's submissions with rows from this CSV
        #[arg(long)]
        submissions_csv: Option<PathBuf>,
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<DateTime<Utc>>,
    },
    /// Generate a markdown report for a gradebook file
    Report {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        submissions_csv: Option<PathBuf>,
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<DateTime<Utc>>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Markdown,
}

fn parse_as_of(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("unrecognised timestamp `{raw}`"))
}

fn clock_for(as_of: Option<DateTime<Utc>>) -> Box<dyn Clock> {
    match as_of {
        Some(instant) => Box::new(FixedClock(instant)),
        None => Box::new(SystemClock),
    }
}

fn load_input(input: &Path, submissions_csv: Option<&Path>) -> anyhow::Result<GradebookInput> {
    let mut gradebook = fixtures::load_gradebook(input)?;
    if let Some(csv) = submissions_csv {
        gradebook.submissions = fixtures::import_submissions_csv(csv)?;
    }
    Ok(gradebook)
}

fn render(gradebook: &GradebookInput, clock: &dyn Clock, format: Format) -> anyhow::Result<String> {
    let summaries = grading::learner_data_with_clock(
        &gradebook.course,
        &gradebook.assignment_group,
        &gradebook.submissions,
        clock,
    );

    match format {
        Format::Json => {
            serde_json::to_string_pretty(&summaries).context("failed to serialize summaries")
        }
        Format::Markdown => Ok(report::build_report(
            &gradebook.course,
            &gradebook.assignment_group,
            clock.now(),
            &summaries,
        )),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sample { as_of, format } => {
            let gradebook = fixtures::sample_gradebook();
            let clock = clock_for(as_of);
            println!("{}", render(&gradebook, clock.as_ref(), format)?);
        }
        Commands::Score {
            input,
            submissions_csv,
            as_of,
        } => {
            let gradebook = load_input(&input, submissions_csv.as_deref())?;
            let clock = clock_for(as_of);
            println!("{}", render(&gradebook, clock.as_ref(), Format::Json)?);
        }
        Commands::Report {
            input,
            submissions_csv,
            as_of,
            out,
        } => {
            let gradebook = load_input(&input, submissions_csv.as_deref())?;
            let clock = clock_for(as_of);
            let report = render(&gradebook, clock.as_ref(), Format::Markdown)?;
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
