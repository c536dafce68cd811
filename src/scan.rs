//! Expand command-line inputs into the list of files to work on.
//!
//! Anything that is not a directory is passed through untouched, so a
//! missing or unsupported file still reaches the registry and gets reported
//! per file. Directories are
//! walked; files inside them are kept only when they match the include
//! globs, miss the exclude globs, and have a registered processor.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::registry::ProcessorRegistry;

pub fn collect_paths(
    inputs: &[PathBuf],
    scan: &ScanConfig,
    registry: &ProcessorRegistry,
) -> Result<Vec<PathBuf>> {
    let include_set = build_globset(&scan.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(scan.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(scan.follow_symlinks) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(input).unwrap_or(path);
            let rel_str = relative.to_string_lossy();
            if exclude_set.is_match(rel_str.as_ref()) || !include_set.is_match(rel_str.as_ref()) {
                continue;
            }
            if registry.is_supported(path) {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        paths.extend(found);
    }
    Ok(paths)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walks_directories_and_filters() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("docs/drafts")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("docs/a.md"), "a").unwrap();
        fs::write(root.join("docs/drafts/b.txt"), "b").unwrap();
        fs::write(root.join("docs/c.bin"), "c").unwrap();
        fs::write(root.join(".git/config.txt"), "x").unwrap();

        let scan = ScanConfig {
            exclude_globs: vec!["drafts/**".to_string()],
            ..ScanConfig::default()
        };
        let registry = ProcessorRegistry::with_defaults();
        let paths = collect_paths(&[root.join("docs")], &scan, &registry).unwrap();
        assert_eq!(paths, vec![root.join("docs/a.md")]);

        let all = collect_paths(&[root.to_path_buf()], &ScanConfig::default(), &registry).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn explicit_files_pass_through() {
        let tmp = TempDir::new().unwrap();
        let odd = tmp.path().join("odd.xyz");
        fs::write(&odd, "?").unwrap();
        let registry = ProcessorRegistry::with_defaults();
        let paths = collect_paths(&[odd.clone()], &ScanConfig::default(), &registry).unwrap();
        assert_eq!(paths, vec![odd]);
    }

    #[test]
    fn missing_input_is_left_for_the_caller() {
        let registry = ProcessorRegistry::with_defaults();
        let missing = PathBuf::from("/no/such/file.md");
        let paths = collect_paths(&[missing.clone()], &ScanConfig::default(), &registry).unwrap();
        assert_eq!(paths, vec![missing]);
    }
}
