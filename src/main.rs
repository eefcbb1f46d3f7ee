use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{self, EnvFilter};

use repo_search::config::{DefaultOperator, SearchConfig};
use repo_search::search::{QueryArgs, QueryExecutor};

/// Query a repository full-text index from the command line.
#[derive(Parser, Debug)]
#[command(name = "repo-search", version)]
struct Cli {
    /// Query string
    query: String,

    /// Path to the index directory
    #[arg(long, conflicts_with = "config")]
    index_dir: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Restrict results to a collection
    #[arg(long, conflicts_with = "community")]
    collection: Option<u32>,

    /// Restrict results to a community
    #[arg(long)]
    community: Option<u32>,

    /// Offset of the first hit
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Number of hits per page
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Default boolean operator between bare terms (or|and)
    #[arg(long, default_value = "or")]
    operator: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let mut config = match (&cli.config, &cli.index_dir) {
        (Some(path), _) => SearchConfig::from_file(path)?,
        (None, Some(dir)) => SearchConfig::new(dir),
        (None, None) => anyhow::bail!("either --index-dir or --config is required"),
    };
    if cli.operator.eq_ignore_ascii_case("and") {
        config.default_operator = DefaultOperator::And;
    }

    let executor = QueryExecutor::new(config);
    let mut args = QueryArgs::new(cli.query)
        .with_start(cli.start)
        .with_page_size(cli.page_size);

    let results = if let Some(id) = cli.collection {
        executor.execute_in_collection(&mut args, id)?
    } else if let Some(id) = cli.community {
        executor.execute_in_community(&mut args, id)?
    } else {
        executor.execute(&args)?
    };
    executor.close();

    if let Some(code) = results.error {
        eprintln!("search failed: {code}");
        std::process::exit(1);
    }

    for (resource_type, handle) in results.hit_types.iter().zip(&results.hit_handles) {
        println!("{}\t{}", resource_type.label(), handle);
    }

    Ok(())
}
