use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use filefind_indexer::Indexer;
use filefind_search::{tokens, SearchEngine, SearchResult};
use filefind_store::MetadataStore;
use filefind_vector_store::EmbeddingModel;
use serde::Serialize;
use std::env;
use std::io::Read;
use std::path::PathBuf;

mod format;

#[derive(Parser)]
#[command(name = "filefind")]
#[command(about = "Semantic search over file names", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the metadata database
    #[arg(long, global = true, default_value = "data/index.db")]
    db: PathBuf,

    /// Override embedding backend for this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log only warnings and errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index file names under one or more directories
    Index(IndexArgs),

    /// Search indexed file names by meaning
    Search(SearchArgs),

    /// Print the most common file-name tokens (word-cloud input)
    Words(WordsArgs),
}

#[derive(Args)]
struct IndexArgs {
    /// Root directories; newline-separated paths are read from stdin when
    /// none are given
    dirs: Vec<PathBuf>,

    /// Emit stats as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Free-text query
    query: String,

    /// Number of results per page
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Results to skip before the page starts
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Emit results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct WordsArgs {
    /// Number of tokens to print
    #[arg(long, default_value_t = 50)]
    top: usize,

    /// Emit tokens as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, ValueEnum)]
enum EmbedMode {
    Fast,
    Stub,
}

impl EmbedMode {
    const fn as_str(self) -> &'static str {
        match self {
            EmbedMode::Fast => "fast",
            EmbedMode::Stub => "stub",
        }
    }
}

#[derive(Serialize)]
struct SearchHit {
    name: String,
    size: String,
    modified: String,
    path: String,
    score: f32,
}

impl From<SearchResult> for SearchHit {
    fn from(result: SearchResult) -> Self {
        Self {
            name: result.record.name,
            size: format::human_size(result.record.size_bytes),
            modified: format::format_timestamp(result.record.modified_at),
            path: result.record.path,
            score: result.score,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Some(mode) = cli.embed_mode {
        env::set_var("FILEFIND_EMBEDDING_MODE", mode.as_str());
    }

    log::debug!("Using database at {}", cli.db.display());
    let store = MetadataStore::open(&cli.db)
        .with_context(|| format!("opening metadata store at {}", cli.db.display()))?;

    match cli.command {
        Commands::Index(args) => run_index(&store, args),
        Commands::Search(args) => run_search(&store, args),
        Commands::Words(args) => run_words(&store, args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn run_index(store: &MetadataStore, args: IndexArgs) -> Result<()> {
    let roots = if args.dirs.is_empty() {
        read_roots_from_stdin()?
    } else {
        args.dirs
    };
    if roots.is_empty() {
        bail!("no directories given (pass them as arguments or one per line on stdin)");
    }

    let embedder = EmbeddingModel::new().context("initializing embedding model")?;
    let stats = Indexer::new(store, &embedder)
        .index_roots(&roots)
        .context("indexing failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "Indexed {} files ({} skipped, {} embedding failures) in {} ms",
            stats.files_indexed, stats.files_skipped, stats.embed_failures, stats.time_ms
        );
    }
    Ok(())
}

fn read_roots_from_stdin() -> Result<Vec<PathBuf>> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("reading directory list from stdin")?;
    Ok(input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

fn run_search(store: &MetadataStore, args: SearchArgs) -> Result<()> {
    let embedder = EmbeddingModel::new().context("initializing embedding model")?;
    let engine = SearchEngine::new(store, &embedder);
    let session = engine.session(&args.query).context("search failed")?;
    let hits: Vec<SearchHit> = session
        .results_page(args.offset, args.limit)
        .context("search failed")?
        .into_iter()
        .map(SearchHit::from)
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No matching files found.");
        return Ok(());
    }
    for hit in &hits {
        println!(
            "{}  {}  Modified: {}  {}  (distance {:.4})",
            hit.name, hit.size, hit.modified, hit.path, hit.score
        );
    }
    Ok(())
}

fn run_words(store: &MetadataStore, args: WordsArgs) -> Result<()> {
    let names = store.list_names().context("reading file names")?;
    let mut counts = tokens::token_counts(names);
    counts.truncate(args.top);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    if counts.is_empty() {
        println!("Nothing indexed yet.");
        return Ok(());
    }
    for (token, count) in &counts {
        println!("{count:>6}  {token}");
    }
    Ok(())
}
