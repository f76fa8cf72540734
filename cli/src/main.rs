//! gofill - Go code completion from the command line or over HTTP

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use color_eyre::Result;
use gofill_cli::CompletionHandler;
use gofill_cli::resolve_root;
use gofill_cli::split_cursor;
use gofill_core::GofillConfig;
use gofill_core::Indexer;
use gofill_core::IndexerConfig;
use gofill_core::PackageCatalog;
use gofill_core::QueryEngine;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;

/// gofill - suggest completions for Go source from an indexed package tree
#[derive(Parser, Debug)]
#[command(name = "gofill")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long, global = true, env = "GOFILL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index a package tree and print a summary
    Index {
        /// Package root, e.g. $GOROOT/src
        root: Option<PathBuf>,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Complete at a cursor in a Go snippet and print the result as JSON
    Query {
        #[command(flatten)]
        index: IndexArgs,

        /// Byte offset of the cursor; defaults to the position of a '‸' marker
        #[arg(long)]
        offset: Option<usize>,

        /// Snippet to complete; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Serve the editor page and completions over HTTP
    Serve {
        #[command(flatten)]
        index: IndexArgs,

        /// HTTP service address
        #[arg(long)]
        http: Option<String>,
    },
}

#[derive(Args, Debug)]
struct IndexArgs {
    /// Package root, e.g. $GOROOT/src
    #[arg(long)]
    root: Option<PathBuf>,

    #[command(flatten)]
    scan: ScanArgs,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Worker threads for indexing (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Index _test.go files too
    #[arg(long)]
    include_tests: bool,

    /// Target operating system for build constraints
    #[arg(long, env = "GOOS")]
    goos: Option<String>,

    /// Target architecture for build constraints
    #[arg(long, env = "GOARCH")]
    goarch: Option<String>,

    /// Extra build tags, comma separated
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
}

impl ScanArgs {
    fn apply(&self, config: &mut IndexerConfig) {
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        config.include_tests |= self.include_tests;
        if let Some(goos) = self.goos.as_ref().filter(|g| !g.is_empty()) {
            config.goos = Some(goos.clone());
        }
        if let Some(goarch) = self.goarch.as_ref().filter(|g| !g.is_empty()) {
            config.goarch = Some(goarch.clone());
        }
        config.build_tags.extend(self.tags.iter().cloned());
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => GofillConfig::from_file(path)?,
        None => GofillConfig::default(),
    };

    match cli.command {
        Command::Index { root, scan } => {
            scan.apply(&mut config.index);
            let catalog = load_catalog(root.as_deref(), &config.index)?;
            println!(
                "{} packages, {} declarations, {} package names",
                catalog.len(),
                catalog.declaration_count(),
                catalog.short_names().count()
            );
        }
        Command::Query {
            index,
            offset,
            file,
        } => {
            index.scan.apply(&mut config.index);
            let input = match &file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut input = String::new();
                    std::io::stdin().read_to_string(&mut input)?;
                    input
                }
            };
            let (src, offset) = split_cursor(&input, offset)?;

            let catalog = load_catalog(index.root.as_deref(), &config.index)?;
            let engine = QueryEngine::new(Arc::new(catalog));
            let result = engine.query(&src, offset);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Serve { index, http } => {
            index.scan.apply(&mut config.index);
            let addr = http.unwrap_or(config.server.addr);

            let catalog = load_catalog(index.root.as_deref(), &config.index)?;
            let engine = QueryEngine::new(Arc::new(catalog));
            gofill_cli::server::serve(&addr, &CompletionHandler::new(Arc::new(engine)))?;
        }
    }

    Ok(())
}

fn load_catalog(flag: Option<&Path>, config: &IndexerConfig) -> gofill_cli::Result<PackageCatalog> {
    let goroot = std::env::var_os("GOROOT");
    let root = resolve_root(flag, config, goroot.as_deref())?;
    info!("indexing {}", root.display());
    Ok(Indexer::new(config.clone()).build(&root))
}

/// Log to stderr. `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) -> Result<()> {
    if std::env::var_os("RUST_LOG").is_some() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        return Ok(());
    }

    let log_level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
