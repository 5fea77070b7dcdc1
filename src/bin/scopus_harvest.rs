use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use scopus_harvest::app::{App, ProgressSink, RunOptions, RunResult, SearchResult};
use scopus_harvest::batch::{BatchReport, ItemState, validate_batch};
use scopus_harvest::config::{ConfigLoader, DEFAULT_SEARCH_COUNT, HarvestConfig};
use scopus_harvest::domain::DocumentRequest;
use scopus_harvest::elsevier::{ElsevierHttpClient, SearchOptions};
use scopus_harvest::error::HarvestError;
use scopus_harvest::fetch::{ElsevierFetcher, FetchOutcome};
use scopus_harvest::output::{ConsoleSink, JsonOutput, OutputMode};
use scopus_harvest::store::{DocumentStore, IdStore};

#[derive(Parser)]
#[command(name = "scopus-harvest")]
#[command(about = "Harvest Scopus IDs with a filtered search and fetch abstracts in batches")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Search Scopus and overwrite the identifier store")]
    Search(SearchArgs),
    #[command(about = "Fetch abstracts for one batch of stored identifiers")]
    Fetch(FetchArgs),
    #[command(about = "Read a single document (abstract:, pii:, doi:, affiliation:)")]
    Read(ReadArgs),
    #[command(about = "Optionally search, then fetch the first batch (default)")]
    Run(RunArgs),
}

#[derive(Args, Clone)]
struct SearchArgs {
    #[arg(long)]
    all: bool,

    #[arg(long, default_value_t = DEFAULT_SEARCH_COUNT)]
    count: u32,

    #[arg(long)]
    query: Option<String>,
}

#[derive(Args, Clone)]
struct FetchArgs {
    #[arg(long, default_value_t = 1)]
    batch: usize,

    #[arg(long)]
    batch_size: Option<usize>,
}

#[derive(Args)]
struct ReadArgs {
    document: String,
}

#[derive(Args, Clone, Default)]
struct RunArgs {
    #[arg(long)]
    search: bool,

    #[arg(long)]
    all: bool,

    #[arg(long, default_value_t = DEFAULT_SEARCH_COUNT)]
    count: u32,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<HarvestError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &HarvestError) -> u8 {
    match error {
        HarvestError::StoreRead { .. }
        | HarvestError::MissingApiKey
        | HarvestError::ConfigRead(_) => 2,
        HarvestError::ElsevierHttp(_)
        | HarvestError::ElsevierStatus { .. }
        | HarvestError::ElsevierResponse(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs {
            count: DEFAULT_SEARCH_COUNT,
            ..RunArgs::default()
        }));

    match command {
        Commands::Search(args) => {
            let query = args.query.clone().unwrap_or_else(|| config.query.clone());
            let app = build_app(&config, query)?;
            let options = SearchOptions {
                get_all: args.all,
                count: args.count,
            };
            let result = app.search_and_store(options, sink_for(output_mode))?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_search(&result).into_diagnostic()?,
                OutputMode::Human => print_search_summary(&result),
            }
        }
        Commands::Fetch(args) => {
            let (app, batch_size) = prepare_fetch(&config, &args)?;
            let report = app.fetch_batch(args.batch, batch_size, sink_for(output_mode))?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_batch(&report).into_diagnostic()?,
                OutputMode::Human => print_batch_summary(&report),
            }
        }
        Commands::Read(args) => {
            let request: DocumentRequest = args.document.parse()?;
            let app = build_app(&config, config.query.clone())?;
            let result = app.read_document(&request, sink_for(output_mode));
            match output_mode {
                OutputMode::Json => JsonOutput::print_read(&result).into_diagnostic()?,
                OutputMode::Human => match &result.outcome {
                    FetchOutcome::Fetched { title, path } => {
                        println!("{}: {}", result.document, title.as_deref().unwrap_or("(untitled)"));
                        println!("saved to {path}");
                    }
                    FetchOutcome::Failed { reason } => {
                        println!("Read document failed: {reason}");
                    }
                },
            }
        }
        Commands::Run(args) => {
            let app = build_app(&config, config.query.clone())?;
            let options = RunOptions {
                search: args.search.then_some(SearchOptions {
                    get_all: args.all,
                    count: args.count,
                }),
                batch_number: 1,
                batch_size: config.batch_size,
            };
            let result = app.run(options, sink_for(output_mode))?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_run(&result).into_diagnostic()?,
                OutputMode::Human => print_run_summary(&result),
            }
        }
    }

    Ok(())
}

type ElsevierApp = App<ElsevierHttpClient, ElsevierFetcher<ElsevierHttpClient>>;

fn prepare_fetch(
    config: &HarvestConfig,
    args: &FetchArgs,
) -> Result<(ElsevierApp, usize), HarvestError> {
    let batch_size = args.batch_size.unwrap_or(config.batch_size);
    validate_batch(args.batch, batch_size)?;
    let app = build_app(config, config.query.clone())?;
    Ok((app, batch_size))
}

fn build_app(
    config: &HarvestConfig,
    query: String,
) -> Result<ElsevierApp, HarvestError> {
    let client = ElsevierHttpClient::new(config)?;
    let fetcher = ElsevierFetcher::new(client.clone(), DocumentStore::new(config.output_dir.clone()));
    Ok(App::new(
        IdStore::new(config.store_path.clone()),
        query,
        client,
        fetcher,
    ))
}

fn sink_for(mode: OutputMode) -> &'static dyn ProgressSink {
    match mode {
        OutputMode::Json => &JsonOutput,
        OutputMode::Human => &ConsoleSink,
    }
}

fn print_search_summary(result: &SearchResult) {
    println!("query: {}", result.query);
    println!(
        "{} Scopus IDs saved to {} ({} without an ID)",
        result.collected, result.store_path, result.missing
    );
}

fn print_batch_summary(report: &BatchReport) {
    println!(
        "batch {} (size {}): {} fetched, {} failed",
        report.batch_number,
        report.batch_size,
        report.fetched(),
        report.failed()
    );
    for item in &report.items {
        let id = item
            .scopus_id
            .as_ref()
            .map(|id| id.as_str())
            .unwrap_or("<none>");
        match (&item.state, &item.outcome) {
            (ItemState::Fetched, Some(FetchOutcome::Fetched { title, .. })) => {
                println!("  ok     {id} {}", title.as_deref().unwrap_or(""));
            }
            (_, Some(FetchOutcome::Failed { reason })) => {
                println!("  failed {id} {reason}");
            }
            _ => println!("  ?      {id}"),
        }
    }
}

fn print_run_summary(result: &RunResult) {
    if let Some(search) = &result.search {
        print_search_summary(search);
    }
    print_batch_summary(&result.batch);
}
