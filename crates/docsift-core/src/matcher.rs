//! Line-oriented text matching.
//!
//! This is the pure half of document search: given extracted text (or a
//! metadata map) and a query, produce [`Match`]es. Reading files and
//! dispatching on format happens in the application crate.
//!
//! # Matching modes
//!
//! Precedence is `use_regex` > `whole_words` > substring.
//!
//! | Mode | Case-insensitive behaviour |
//! |------|----------------------------|
//! | substring | both line and query are lower-cased |
//! | whole words | both lower-cased; hit must sit between non-word characters |
//! | regex | pattern compiled with the `i` flag; text left untouched |

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Metadata;

/// Marker placed before a highlighted span.
pub const HIGHLIGHT_OPEN: &str = "**";
/// Marker placed after a highlighted span.
pub const HIGHLIGHT_CLOSE: &str = "**";

/// Line number reported for hits inside document metadata.
pub const METADATA_LINE: usize = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub whole_words: bool,
    pub use_regex: bool,
    /// Stop after this many matches. `0` means unlimited.
    pub max_matches: usize,
    /// Lines of context on each side of a hit.
    pub context_lines: usize,
}

/// One hit inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// 1-based line number, or [`METADATA_LINE`] for metadata hits.
    pub line_number: usize,
    pub content: String,
    /// Surrounding lines, each prefixed with its number; the hit line is
    /// prefixed with `>`.
    pub context: String,
}

/// All hits for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub file_path: String,
    pub file_name: String,
    pub matches: Vec<Match>,
    pub total_matches: usize,
}

impl SearchResult {
    pub fn new(path: &Path, matches: Vec<Match>) -> Self {
        Self {
            file_path: path.display().to_string(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            total_matches: matches.len(),
            matches,
        }
    }
}

/// Aggregate figures over a batch of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStatistics {
    pub total_files: usize,
    pub total_matches: usize,
    /// Files with hits, grouped by lower-case extension.
    pub files_by_extension: BTreeMap<String, usize>,
    pub matches_per_file: BTreeMap<String, usize>,
    /// `0.0` when there are no files.
    pub average_matches_per_file: f64,
}

enum Mode {
    Regex(Regex),
    WholeWords(String),
    Substring(String),
}

/// A query compiled against a set of [`SearchOptions`].
pub struct Matcher {
    mode: Mode,
    case_sensitive: bool,
    empty: bool,
}

impl Matcher {
    /// Compile `query`. Fails with [`Error::InvalidPattern`] when regex mode
    /// is on and the query does not parse.
    pub fn new(query: &str, opts: &SearchOptions) -> Result<Self> {
        let mode = if opts.use_regex {
            Mode::Regex(build_regex(query, !opts.case_sensitive)?)
        } else if opts.whole_words {
            Mode::WholeWords(fold(query, opts.case_sensitive))
        } else {
            Mode::Substring(fold(query, opts.case_sensitive))
        };
        Ok(Self {
            mode,
            case_sensitive: opts.case_sensitive,
            empty: query.is_empty(),
        })
    }

    pub fn is_match(&self, line: &str) -> bool {
        if self.empty {
            return false;
        }
        match &self.mode {
            Mode::Regex(re) => re.is_match(line),
            Mode::Substring(needle) => fold(line, self.case_sensitive).contains(needle.as_str()),
            Mode::WholeWords(needle) => {
                contains_whole_word(&fold(line, self.case_sensitive), needle)
            }
        }
    }
}

fn fold(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        s.to_string()
    } else {
        s.to_lowercase()
    }
}

fn build_regex(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| Error::InvalidPattern(e.to_string()))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `haystack[start..end]` is flanked by non-word characters (or
/// the ends of the string).
fn is_whole_word_at(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Byte length of the char starting at `pos`, or 1 past the end.
fn char_len_at(s: &str, pos: usize) -> usize {
    s[pos..].chars().next().map_or(1, char::len_utf8)
}

fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        if is_whole_word_at(haystack, start, start + needle.len()) {
            return true;
        }
        // Occurrences may overlap; retry one char further on.
        from = start + char_len_at(haystack, start);
        if from > haystack.len() {
            break;
        }
    }
    false
}

/// Scan `text` line by line in order and collect matches, stopping at
/// `opts.max_matches` when it is non-zero.
pub fn search_lines(text: &str, matcher: &Matcher, opts: &SearchOptions) -> Vec<Match> {
    let lines: Vec<&str> = text.lines().collect();
    let mut matches = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if limit_reached(matches.len(), opts.max_matches) {
            break;
        }
        if matcher.is_match(line) {
            matches.push(Match {
                line_number: idx + 1,
                content: line.to_string(),
                context: context_window(&lines, idx, opts.context_lines),
            });
        }
    }
    matches
}

/// Scan metadata pairs with the same policy as lines. A pair matches when
/// either its key or its value does. Hits carry [`METADATA_LINE`].
pub fn search_metadata(metadata: &Metadata, matcher: &Matcher, max_matches: usize) -> Vec<Match> {
    let mut matches = Vec::new();
    for (key, value) in metadata {
        if limit_reached(matches.len(), max_matches) {
            break;
        }
        if matcher.is_match(key) || matcher.is_match(value) {
            let content = format!("{}: {}", key, value);
            matches.push(Match {
                line_number: METADATA_LINE,
                context: format!("[metadata] {}", content),
                content,
            });
        }
    }
    matches
}

/// True once `found` hits a non-zero `max`.
pub fn limit_reached(found: usize, max: usize) -> bool {
    max > 0 && found >= max
}

fn context_window(lines: &[&str], idx: usize, context: usize) -> String {
    let start = idx.saturating_sub(context);
    let end = (idx + context).min(lines.len().saturating_sub(1));
    (start..=end)
        .map(|i| {
            let marker = if i == idx { '>' } else { ' ' };
            format!("{} {}: {}", marker, i + 1, lines[i])
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap every hit of `query` inside `text` with [`HIGHLIGHT_OPEN`] /
/// [`HIGHLIGHT_CLOSE`]. Works on raw text, independent of any earlier
/// search.
pub fn highlight(text: &str, query: &str, opts: &SearchOptions) -> Result<String> {
    if query.is_empty() {
        return Ok(text.to_string());
    }
    let pattern = if opts.use_regex {
        query.to_string()
    } else {
        regex::escape(query)
    };
    let re = build_regex(&pattern, !opts.case_sensitive)?;
    if opts.use_regex || !opts.whole_words {
        return Ok(re
            .replace_all(text, |caps: &regex::Captures<'_>| {
                format!("{}{}{}", HIGHLIGHT_OPEN, &caps[0], HIGHLIGHT_CLOSE)
            })
            .into_owned());
    }

    // Whole words use the same boundary rule as search, which `\b` does not
    // reproduce for queries that start or end with a non-word character.
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut from = 0;
    while from <= text.len() {
        let Some(m) = re.find_at(text, from) else {
            break;
        };
        if m.is_empty() {
            break;
        }
        if is_whole_word_at(text, m.start(), m.end()) {
            out.push_str(&text[copied..m.start()]);
            out.push_str(HIGHLIGHT_OPEN);
            out.push_str(m.as_str());
            out.push_str(HIGHLIGHT_CLOSE);
            copied = m.end();
            from = m.end();
        } else {
            from = m.start() + char_len_at(text, m.start());
        }
    }
    out.push_str(&text[copied..]);
    Ok(out)
}

/// Summarize a batch of results keyed by path.
pub fn statistics(results: &HashMap<String, SearchResult>) -> SearchStatistics {
    let mut files_by_extension = BTreeMap::new();
    let mut matches_per_file = BTreeMap::new();
    let mut total_matches = 0;

    for (path, result) in results {
        let ext = Path::new(path)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "(none)".to_string());
        *files_by_extension.entry(ext).or_insert(0) += 1;
        matches_per_file.insert(path.clone(), result.total_matches);
        total_matches += result.total_matches;
    }

    let total_files = results.len();
    let average_matches_per_file = if total_files == 0 {
        0.0
    } else {
        total_matches as f64 / total_files as f64
    };

    SearchStatistics {
        total_files,
        total_matches,
        files_by_extension,
        matches_per_file,
        average_matches_per_file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> SearchOptions {
        SearchOptions::default()
    }

    fn find(text: &str, query: &str, o: &SearchOptions) -> Vec<Match> {
        let m = Matcher::new(query, o).unwrap();
        search_lines(text, &m, o)
    }

    #[test]
    fn context_window_marks_hit_line() {
        let o = SearchOptions {
            context_lines: 1,
            ..opts()
        };
        let hits = find("a\nb\nc\n", "b", &o);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line_number, 2);
        assert_eq!(hits[0].content, "b");
        assert_eq!(hits[0].context, "  1: a\n> 2: b\n  3: c");
    }

    #[test]
    fn context_is_clamped_to_bounds() {
        let o = SearchOptions {
            context_lines: 5,
            ..opts()
        };
        let hits = find("first\nsecond", "first", &o);
        assert_eq!(hits[0].context, "> 1: first\n  2: second");
    }

    #[test]
    fn case_folding() {
        assert_eq!(find("Hello", "hello", &opts()).len(), 1);
        let sensitive = SearchOptions {
            case_sensitive: true,
            ..opts()
        };
        assert!(find("Hello", "hello", &sensitive).is_empty());
    }

    #[test]
    fn whole_words_rejects_partial_hits() {
        let o = SearchOptions {
            whole_words: true,
            ..opts()
        };
        let hits = find("cat\nconcatenate\nthe cat sat\ncat_food", "cat", &o);
        let lines: Vec<usize> = hits.iter().map(|m| m.line_number).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn whole_words_checks_overlapping_occurrences() {
        let o = SearchOptions {
            whole_words: true,
            ..opts()
        };
        // The first "x x" starts inside "yx"; the next one overlaps it.
        let hits = find("yx x x
yx x", "x x", &o);
        let lines: Vec<usize> = hits.iter().map(|m| m.line_number).collect();
        assert_eq!(lines, vec![1]);
    }

    #[test]
    fn whole_word_highlight_agrees_with_search() {
        let o = SearchOptions {
            whole_words: true,
            ..opts()
        };
        for (line, query, marked) in [
            ("cost $5 total", "$5", "cost **$5** total"),
            ("we like C++ a lot", "c++", "we like **C++** a lot"),
            ("yx x x", "x x", "yx **x x**"),
            ("concatenate the cat", "cat", "concatenate the **cat**"),
        ] {
            assert_eq!(find(line, query, &o).len(), 1, "search {:?}", line);
            assert_eq!(highlight(line, query, &o).unwrap(), marked);
        }
        assert_eq!(highlight("cat_food", "cat", &o).unwrap(), "cat_food");
    }

    #[test]
    fn regex_overrides_whole_words() {
        let o = SearchOptions {
            use_regex: true,
            whole_words: true,
            ..opts()
        };
        let hits = find("concatenate\nfoo", "cat", &o);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line_number, 1);
    }

    #[test]
    fn regex_honours_case_flag() {
        let insensitive = SearchOptions {
            use_regex: true,
            ..opts()
        };
        assert_eq!(find("ERROR: disk", r"error:\s+\w+", &insensitive).len(), 1);
        let sensitive = SearchOptions {
            use_regex: true,
            case_sensitive: true,
            ..opts()
        };
        assert!(find("ERROR: disk", r"error:\s+\w+", &sensitive).is_empty());
    }

    #[test]
    fn invalid_regex_is_reported() {
        let o = SearchOptions {
            use_regex: true,
            ..opts()
        };
        assert!(matches!(
            Matcher::new("(unclosed", &o),
            Err(Error::InvalidPattern(_))
        ));
    }

    #[test]
    fn max_matches_yields_prefix() {
        let text = "x1\ny\nx2\nx3\nx4";
        let all = find(text, "x", &opts());
        assert_eq!(all.len(), 4);
        for n in 1..=4 {
            let o = SearchOptions {
                max_matches: n,
                ..opts()
            };
            let limited = find(text, "x", &o);
            assert_eq!(limited.len(), n);
            assert_eq!(&all[..n], &limited[..]);
        }
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(find("anything", "", &opts()).is_empty());
    }

    #[test]
    fn metadata_hits_use_line_zero() {
        let mut md = Metadata::new();
        md.insert("title".into(), "Quarterly Report".into());
        md.insert("author".into(), "ann".into());
        let m = Matcher::new("report", &opts()).unwrap();
        let hits = search_metadata(&md, &m, 0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line_number, METADATA_LINE);
        assert_eq!(hits[0].content, "title: Quarterly Report");
    }

    #[test]
    fn highlight_plain_and_regex() {
        let out = highlight("Foo bar foo", "foo", &opts()).unwrap();
        assert_eq!(out, "**Foo** bar **foo**");

        let o = SearchOptions {
            use_regex: true,
            case_sensitive: true,
            ..opts()
        };
        let out = highlight("a1 b22 C3", r"[a-z]\d+", &o).unwrap();
        assert_eq!(out, "**a1** **b22** C3");
    }

    #[test]
    fn highlight_escapes_literal_queries() {
        let out = highlight("cost is $5.00 (approx)", "$5.00", &opts()).unwrap();
        assert_eq!(out, "cost is **$5.00** (approx)");
    }

    #[test]
    fn statistics_of_empty_batch() {
        let stats = statistics(&HashMap::new());
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_matches, 0);
        assert_eq!(stats.average_matches_per_file, 0.0);
    }

    #[test]
    fn statistics_histogram() {
        let mut results = HashMap::new();
        let hit = |n| Match {
            line_number: n,
            content: String::new(),
            context: String::new(),
        };
        results.insert(
            "/a/one.md".to_string(),
            SearchResult::new(Path::new("/a/one.md"), vec![hit(1), hit(2), hit(3)]),
        );
        results.insert(
            "/a/two.MD".to_string(),
            SearchResult::new(Path::new("/a/two.MD"), vec![hit(1)]),
        );
        let stats = statistics(&results);
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_matches, 4);
        assert_eq!(stats.files_by_extension.get("md"), Some(&2));
        assert_eq!(stats.average_matches_per_file, 2.0);
    }
}
