use crate::infra::{build_orchestrator, parse_company_type, parse_grade, Orchestrator};
use clap::Args;
use posting_fit::classification::ClassificationInput;
use posting_fit::config::AppConfig;
use posting_fit::error::AppError;
use posting_fit::postings::read_postings_from_path;
use posting_fit::{CompanyType, Grade, JobPosting, PipelineState};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Posting title
    pub(crate) title: String,
    /// Hiring company
    pub(crate) company: String,
    #[arg(long)]
    pub(crate) location: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
    /// Candidate profile JSON (defaults to FIT_PROFILE_PATH or the bundled profile)
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with title, company, location and description columns
    pub(crate) input: PathBuf,
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
    /// Only print kept postings at or above this grade
    #[arg(long, value_parser = parse_grade)]
    pub(crate) min_grade: Option<Grade>,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    pub(crate) company: String,
    /// Domain keyword seen in the company's postings (repeatable)
    #[arg(long = "domain")]
    pub(crate) domains: Vec<String>,
    #[arg(long)]
    pub(crate) title: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
    /// Record a manual override instead of classifying
    #[arg(long, value_parser = parse_company_type)]
    pub(crate) set: Option<CompanyType>,
}

/// Tally printed to stderr after a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct BatchSummary {
    pub(crate) total: usize,
    pub(crate) kept: usize,
    pub(crate) hard_filtered: usize,
    pub(crate) context_filtered: usize,
    pub(crate) printed: usize,
}

fn engine(profile: Option<&std::path::Path>) -> Result<std::sync::Arc<Orchestrator>, AppError> {
    let config = AppConfig::load()?;
    build_orchestrator(&config.engine, profile)
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let orchestrator = engine(args.profile.as_deref())?;
    let mut posting = JobPosting::new(args.title, args.company);
    posting.location = args.location;
    posting.description = args.description;
    score_posting(&orchestrator, &posting, &mut io::stdout().lock())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let orchestrator = engine(args.profile.as_deref())?;
    let postings = read_postings_from_path(&args.input)?;
    let summary = evaluate_postings(
        &orchestrator,
        &postings,
        args.min_grade,
        &mut io::stdout().lock(),
    )?;
    eprintln!(
        "{} postings: {} kept, {} hard filtered, {} context filtered, {} printed",
        summary.total,
        summary.kept,
        summary.hard_filtered,
        summary.context_filtered,
        summary.printed
    );
    Ok(())
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let orchestrator = engine(None)?;
    classify_company(&orchestrator, args, &mut io::stdout().lock())
}

pub(crate) fn score_posting(
    orchestrator: &Orchestrator,
    posting: &JobPosting,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let result = orchestrator.score_job(posting)?;
    write_json_line(out, &result)
}

pub(crate) fn evaluate_postings(
    orchestrator: &Orchestrator,
    postings: &[JobPosting],
    min_grade: Option<Grade>,
    out: &mut impl Write,
) -> Result<BatchSummary, AppError> {
    let mut summary = BatchSummary {
        total: postings.len(),
        ..BatchSummary::default()
    };

    for posting in postings {
        let evaluation = orchestrator.evaluate(posting)?;
        match evaluation.state {
            PipelineState::Kept => summary.kept += 1,
            PipelineState::HardFiltered => summary.hard_filtered += 1,
            PipelineState::ContextFiltered => summary.context_filtered += 1,
            _ => {}
        }

        let print = match min_grade {
            Some(minimum) => evaluation.should_surface(minimum),
            None => true,
        };
        if print {
            write_json_line(out, &evaluation)?;
            summary.printed += 1;
        }
    }

    Ok(summary)
}

pub(crate) fn classify_company(
    orchestrator: &Orchestrator,
    args: ClassifyArgs,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let classifier = orchestrator.classifier();
    if let Some(company_type) = args.set {
        let record = classifier.record_manual(&args.company, company_type)?;
        return write_json_line(out, &record);
    }

    let classification = classifier.classify(&ClassificationInput {
        company: args.company,
        domain_keywords: args.domains,
        job_title: args.title,
        job_description: args.description,
    })?;
    write_json_line(out, &classification)
}

fn write_json_line<T: Serialize>(out: &mut impl Write, value: &T) -> Result<(), AppError> {
    let line = serde_json::to_string(value)
        .map_err(|err| AppError::InvalidInput(format!("could not serialize output: {err}")))?;
    writeln!(out, "{line}")?;
    Ok(())
}
