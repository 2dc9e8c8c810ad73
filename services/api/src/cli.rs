use crate::batch::{run_batch, run_classify, run_score, BatchArgs, ClassifyArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use posting_fit::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "posting-fit",
    about = "Score, filter and classify job postings against a candidate profile",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score one posting and print the breakdown as JSON
    Score(ScoreArgs),
    /// Run every posting in a CSV export through the filter pipeline
    Batch(BatchArgs),
    /// Classify a company, or record a manual classification with --set
    Classify(ClassifyArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Candidate profile JSON used by the scoring routes
    #[arg(long)]
    pub(crate) profile: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Batch(args) => run_batch(args),
        Command::Classify(args) => run_classify(args),
    }
}
