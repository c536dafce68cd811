//! CLI command implementations.
//!
//! Each `run_*` function backs one `docsift` subcommand. They print their
//! results to stdout; log lines go to stderr through `tracing`.

use anyhow::{anyhow, bail, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use docsift_core::matcher::{SearchOptions, SearchResult};
use docsift_core::store::DocumentStore;

use crate::config::Config;
use crate::convert::{analyze, ConvertOutcome, DocumentConverter, OutputFormat};
use crate::ingest::Ingestor;
use crate::registry::ProcessorRegistry;
use crate::scan::collect_paths;
use crate::search::DocumentSearcher;

/// Flags for `docsift search`.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    /// `None` keeps the `[search]` config value.
    pub case_sensitive: Option<bool>,
    pub whole_words: bool,
    pub regex: bool,
    pub max_matches: Option<usize>,
    pub context: Option<usize>,
    pub metadata: bool,
    pub stats: bool,
    pub json: bool,
}

impl SearchArgs {
    /// Layer the CLI flags over the `[search]` config section.
    pub fn options(&self, config: &Config) -> SearchOptions {
        let mut opts = config.search.options();
        if let Some(case_sensitive) = self.case_sensitive {
            opts.case_sensitive = case_sensitive;
        }
        opts.whole_words = self.whole_words;
        opts.use_regex = self.regex;
        if let Some(max) = self.max_matches {
            opts.max_matches = max;
        }
        if let Some(context) = self.context {
            opts.context_lines = context;
        }
        opts
    }
}

pub fn run_types(registry: &ProcessorRegistry, json: bool) -> Result<()> {
    let rows = registry.processors();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<12} {:<10} STATUS", "EXTENSION", "PROCESSOR");
    for row in rows {
        println!("{:<12} {:<10} {}", format!(".{}", row.extension), row.processor, row.status);
    }
    Ok(())
}

pub fn run_extract(registry: &ProcessorRegistry, path: &Path, json: bool) -> Result<()> {
    let content = registry.process_document(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&content)?);
        return Ok(());
    }

    let summary = analyze(&content.text);
    println!("--- Document ---");
    println!("path:         {}", path.display());
    println!("file_type:    {}", content.file_type);
    println!("processed_at: {}", content.processed_at.to_rfc3339());
    println!(
        "summary:      {} words, {} lines, {} paragraphs, ~{} min read",
        summary.words, summary.lines, summary.paragraphs, summary.reading_minutes
    );
    println!();

    println!("--- Metadata ---");
    for (key, value) in &content.metadata {
        println!("{}: {}", key, value);
    }
    println!();

    println!("--- Body ---");
    println!("{}", content.text);
    Ok(())
}

pub fn run_search(
    config: &Config,
    registry: &ProcessorRegistry,
    query: &str,
    inputs: &[PathBuf],
    args: &SearchArgs,
) -> Result<()> {
    let paths = collect_paths(inputs, &config.scan, registry)?;
    let opts = args.options(config);
    let searcher = DocumentSearcher::new(registry);
    let results = if args.metadata {
        searcher.search_with_metadata(&paths, query, &opts)?
    } else {
        searcher.search_in_multiple_documents(&paths, query, &opts)?
    };

    if args.json {
        let sorted: BTreeMap<&String, &SearchResult> = results.iter().collect();
        let mut out = serde_json::json!({ "results": sorted });
        if args.stats {
            out["statistics"] = serde_json::to_value(searcher.statistics(&results))?;
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let mut sorted: Vec<&SearchResult> = results.values().collect();
    sorted.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    for (i, result) in sorted.iter().enumerate() {
        println!(
            "{}. {} ({} matches)",
            i + 1,
            result.file_path,
            result.total_matches
        );
        for m in &result.matches {
            if m.line_number == 0 {
                println!("    [metadata] {}", m.content);
            } else {
                println!("    line {}: {}", m.line_number, m.content.trim());
            }
            if opts.context_lines > 0 && m.line_number > 0 {
                for line in m.context.lines() {
                    println!("      {}", line);
                }
            }
        }
        println!();
    }

    if args.stats {
        let stats = searcher.statistics(&results);
        println!("--- Statistics ---");
        println!("files:          {}", stats.total_files);
        println!("matches:        {}", stats.total_matches);
        println!("avg per file:   {:.2}", stats.average_matches_per_file);
        for (ext, count) in &stats.files_by_extension {
            println!("  .{}: {}", ext, count);
        }
    }
    Ok(())
}

pub fn run_highlight(
    registry: &ProcessorRegistry,
    query: &str,
    path: &Path,
    opts: &SearchOptions,
) -> Result<()> {
    let content = registry.process_document(path)?;
    let searcher = DocumentSearcher::new(registry);
    println!("{}", searcher.highlight_matches(&content.text, query, opts)?);
    Ok(())
}

pub fn run_convert(
    registry: &ProcessorRegistry,
    input: &Path,
    output: &Path,
    format: Option<OutputFormat>,
) -> Result<()> {
    let format = match format {
        Some(f) => f,
        None => infer_format(output)?,
    };
    DocumentConverter::new(registry).convert(input, output, format)?;
    println!("{} -> {} ({})", input.display(), output.display(), format);
    println!("ok");
    Ok(())
}

pub fn run_batch_convert(
    config: &Config,
    registry: &ProcessorRegistry,
    inputs: &[PathBuf],
    out_dir: &Path,
    format: OutputFormat,
) -> Result<()> {
    let paths = collect_paths(inputs, &config.scan, registry)?;
    let outcomes = DocumentConverter::new(registry).batch_convert(&paths, out_dir, format);

    let sorted: BTreeMap<&String, &ConvertOutcome> = outcomes.iter().collect();
    let mut failed = 0;
    for (input, outcome) in &sorted {
        if matches!(outcome, ConvertOutcome::Failed(_)) {
            failed += 1;
        }
        println!("{}: {}", input, outcome);
    }

    println!();
    println!("batch-convert {}", format);
    println!("  converted: {}", sorted.len() - failed);
    println!("  failed: {}", failed);
    if failed > 0 && failed == sorted.len() {
        bail!("no documents converted");
    }
    println!("ok");
    Ok(())
}

pub fn run_ingest(config: &Config, registry: &ProcessorRegistry, inputs: &[PathBuf]) -> Result<()> {
    let paths = collect_paths(inputs, &config.scan, registry)?;
    let store = DocumentStore::new();
    let report = Ingestor::new(&store, registry, &config.ingest, &config.chunking).ingest_many(&paths);

    for doc in &report.ingested {
        println!("{}  {}  {} chunks  {}", doc.id, doc.status, doc.chunks, doc.name);
    }
    for (path, err) in &report.failed {
        eprintln!("Error: {}: {}", path.display(), err);
    }

    println!("ingest");
    println!("  documents: {}", report.ingested.len());
    println!("  chunks written: {}", report.chunks_written);
    println!("  failed: {}", report.failed.len());
    store.close();
    println!("ok");
    Ok(())
}

/// Pick an output format from the output file's extension.
pub fn infer_format(output: &Path) -> Result<OutputFormat> {
    crate::extract::extension_of(output).parse().map_err(|_| {
        anyhow!(
            "cannot infer output format from {}; pass --format",
            output.display()
        )
    })
}
