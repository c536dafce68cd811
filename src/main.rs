//! # docsift CLI
//!
//! ## Usage
//!
//! ```bash
//! docsift --config ./config/docsift.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docsift types` | List registered file types and processor status |
//! | `docsift extract <path>` | Print extracted text and metadata |
//! | `docsift search "<query>" <paths..>` | Search files and directories |
//! | `docsift highlight "<query>" <path>` | Print text with hits marked |
//! | `docsift convert <in> <out>` | Convert one document |
//! | `docsift batch-convert <paths..> --out-dir <dir>` | Convert many documents |
//! | `docsift ingest <paths..>` | Validate, extract and chunk into a store |
//!
//! ## Examples
//!
//! ```bash
//! # Case-sensitive whole-word search with statistics
//! docsift search Parser ./docs --case-sensitive --whole-words --stats
//!
//! # Regex search that also looks at titles and other metadata
//! docsift search 'v[0-9]+\.[0-9]+' ./docs --regex --metadata
//!
//! # Turn a folder of notes into HTML
//! docsift batch-convert ./notes --out-dir ./site --format html
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docsift::commands::{self, SearchArgs};
use docsift::config;
use docsift::convert::OutputFormat;
use docsift::logging;
use docsift::registry::ProcessorRegistry;
use docsift_core::matcher::SearchOptions;

/// docsift: text extraction, search and conversion for local documents.
#[derive(Parser)]
#[command(name = "docsift", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// A missing file is not an error; built-in defaults apply.
    #[arg(long, global = true, default_value = "./config/docsift.toml")]
    config: PathBuf,

    /// Emit log lines as JSON on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered file types and whether their processor is available.
    Types {
        #[arg(long)]
        json: bool,
    },

    /// Extract one document and print its text and metadata.
    Extract {
        path: PathBuf,

        /// Print the extracted content as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search files for a keyword or pattern.
    ///
    /// Directories are walked using the `[scan]` globs; only files of a
    /// registered type are searched. Files that fail to extract are skipped.
    Search {
        query: String,

        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long, conflicts_with = "ignore_case")]
        case_sensitive: bool,

        /// Match case-insensitively even when the config says otherwise.
        #[arg(long)]
        ignore_case: bool,

        /// Only match the query as a whole word.
        #[arg(long)]
        whole_words: bool,

        /// Treat the query as a regular expression.
        #[arg(long)]
        regex: bool,

        /// Stop after this many matches per file (0 = unlimited).
        #[arg(long)]
        max_matches: Option<usize>,

        /// Lines of context around each hit.
        #[arg(long)]
        context: Option<usize>,

        /// Also match extracted metadata keys and values.
        #[arg(long)]
        metadata: bool,

        /// Print aggregate statistics after the results.
        #[arg(long)]
        stats: bool,

        #[arg(long)]
        json: bool,
    },

    /// Print a document's text with every hit wrapped in `**`.
    Highlight {
        query: String,
        path: PathBuf,

        #[arg(long, conflicts_with = "ignore_case")]
        case_sensitive: bool,

        /// Match case-insensitively even when the config says otherwise.
        #[arg(long)]
        ignore_case: bool,

        #[arg(long)]
        whole_words: bool,

        #[arg(long)]
        regex: bool,
    },

    /// Convert one document to Markdown, HTML or plain text.
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// `markdown`, `html` or `text`. Inferred from the output extension
        /// when omitted.
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Convert many documents into one output directory.
    BatchConvert {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        out_dir: PathBuf,

        #[arg(long, default_value = "markdown")]
        format: OutputFormat,
    },

    /// Validate, extract and chunk documents into an in-memory store and
    /// report what was stored.
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

/// `--case-sensitive` / `--ignore-case` as an override of the config value.
fn case_override(case_sensitive: bool, ignore_case: bool) -> Option<bool> {
    if case_sensitive {
        Some(true)
    } else if ignore_case {
        Some(false)
    } else {
        None
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;
    logging::init_tracing(cli.log_json || cfg.logging.json);

    let registry = ProcessorRegistry::with_defaults();

    match cli.command {
        Commands::Types { json } => commands::run_types(&registry, json)?,
        Commands::Extract { path, json } => commands::run_extract(&registry, &path, json)?,
        Commands::Search {
            query,
            paths,
            case_sensitive,
            ignore_case,
            whole_words,
            regex,
            max_matches,
            context,
            metadata,
            stats,
            json,
        } => {
            let args = SearchArgs {
                case_sensitive: case_override(case_sensitive, ignore_case),
                whole_words,
                regex,
                max_matches,
                context,
                metadata,
                stats,
                json,
            };
            commands::run_search(&cfg, &registry, &query, &paths, &args)?;
        }
        Commands::Highlight {
            query,
            path,
            case_sensitive,
            ignore_case,
            whole_words,
            regex,
        } => {
            let opts = SearchOptions {
                case_sensitive: case_override(case_sensitive, ignore_case)
                    .unwrap_or(cfg.search.case_sensitive),
                whole_words,
                use_regex: regex,
                ..SearchOptions::default()
            };
            commands::run_highlight(&registry, &query, &path, &opts)?;
        }
        Commands::Convert {
            input,
            output,
            format,
        } => commands::run_convert(&registry, &input, &output, format)?,
        Commands::BatchConvert {
            paths,
            out_dir,
            format,
        } => commands::run_batch_convert(&cfg, &registry, &paths, &out_dir, format)?,
        Commands::Ingest { paths } => commands::run_ingest(&cfg, &registry, &paths)?,
    }

    Ok(())
}
