//! Keyword and regex search over files.
//!
//! [`DocumentSearcher`] extracts each file through the
//! [`ProcessorRegistry`] and hands the text to the line matcher in
//! `docsift_core::matcher`. It keeps no state of its own; extraction is
//! repeated on every call.
//!
//! Batch searches never abort on a single bad file. A file that fails to
//! extract is logged and skipped, and files without hits are left out of
//! the result map. A query that does not compile is still a hard error
//! since it would fail identically for every file.

use std::collections::HashMap;
use std::path::Path;

use docsift_core::matcher::{
    self, limit_reached, Matcher, SearchOptions, SearchResult, SearchStatistics,
};
use docsift_core::Result;
use tracing::{debug, warn};

use crate::registry::ProcessorRegistry;

pub struct DocumentSearcher<'r> {
    registry: &'r ProcessorRegistry,
}

impl<'r> DocumentSearcher<'r> {
    pub fn new(registry: &'r ProcessorRegistry) -> Self {
        Self { registry }
    }

    /// Search one file line by line.
    pub fn search_in_document(
        &self,
        path: &Path,
        query: &str,
        opts: &SearchOptions,
    ) -> Result<SearchResult> {
        let matcher = Matcher::new(query, opts)?;
        self.search_one(path, &matcher, opts, false)
    }

    /// Search one file's lines and then its extracted metadata.
    pub fn search_document_with_metadata(
        &self,
        path: &Path,
        query: &str,
        opts: &SearchOptions,
    ) -> Result<SearchResult> {
        let matcher = Matcher::new(query, opts)?;
        self.search_one(path, &matcher, opts, true)
    }

    /// Search several files. The map is keyed by the path as given and only
    /// holds files with at least one hit.
    pub fn search_in_multiple_documents<P: AsRef<Path>>(
        &self,
        paths: &[P],
        query: &str,
        opts: &SearchOptions,
    ) -> Result<HashMap<String, SearchResult>> {
        self.search_many(paths, query, opts, false)
    }

    /// [`search_in_multiple_documents`](Self::search_in_multiple_documents)
    /// that also matches metadata keys and values. Metadata hits carry line
    /// number 0 and follow the line hits.
    pub fn search_with_metadata<P: AsRef<Path>>(
        &self,
        paths: &[P],
        query: &str,
        opts: &SearchOptions,
    ) -> Result<HashMap<String, SearchResult>> {
        self.search_many(paths, query, opts, true)
    }

    pub fn statistics(&self, results: &HashMap<String, SearchResult>) -> SearchStatistics {
        matcher::statistics(results)
    }

    /// Mark every hit of `query` in `text`.
    pub fn highlight_matches(&self, text: &str, query: &str, opts: &SearchOptions) -> Result<String> {
        matcher::highlight(text, query, opts)
    }

    fn search_many<P: AsRef<Path>>(
        &self,
        paths: &[P],
        query: &str,
        opts: &SearchOptions,
        include_metadata: bool,
    ) -> Result<HashMap<String, SearchResult>> {
        let matcher = Matcher::new(query, opts)?;
        let mut results = HashMap::new();
        for path in paths {
            let path = path.as_ref();
            match self.search_one(path, &matcher, opts, include_metadata) {
                Ok(result) if result.total_matches > 0 => {
                    results.insert(path.display().to_string(), result);
                }
                Ok(_) => debug!(path = %path.display(), "no matches"),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping document"),
            }
        }
        Ok(results)
    }

    fn search_one(
        &self,
        path: &Path,
        matcher: &Matcher,
        opts: &SearchOptions,
        include_metadata: bool,
    ) -> Result<SearchResult> {
        let content = self.registry.process_document(path)?;
        let mut matches = matcher::search_lines(&content.text, matcher, opts);
        if include_metadata && !limit_reached(matches.len(), opts.max_matches) {
            let remaining = match opts.max_matches {
                0 => 0,
                max => max - matches.len(),
            };
            matches.extend(matcher::search_metadata(
                &content.metadata,
                matcher,
                remaining,
            ));
        }
        Ok(SearchResult::new(path, matches))
    }
}
