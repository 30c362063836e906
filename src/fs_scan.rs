//! Filesystem enumeration (spec §4.8/§6): walks the project root, applies
//! ignore globs, symlink policy, and max file size, and tags each surviving
//! file with a detected language (or leaves it untagged for the metadata
//! pass to pick up as JSON/YAML).

use crate::config::model::ParsingSection;
use crate::model::LanguageKind;
use anyhow::{Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub repo_rel_path: String,
    pub language: Option<LanguageKind>,
    pub size: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_skipped_ignored: usize,
    pub files_skipped_too_big: usize,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub root: PathBuf,
    pub files: Vec<ScannedFile>,
    pub stats: ScanStats,
}

/// Convert a path into a stable, portable repository-relative string.
pub fn normalize_repo_rel(root: &Path, p: &Path) -> String {
    let rel = p.strip_prefix(root).unwrap_or(p);
    rel.to_string_lossy().replace('\\', "/")
}

pub fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        if pat.trim().is_empty() {
            continue;
        }
        if let Ok(g) = Glob::new(pat) {
            builder.add(g);
        }
    }
    builder.build().ok()
}

fn matches_any(path: &Path, set: Option<&GlobSet>) -> bool {
    set.map_or(false, |gs| gs.is_match(path.to_string_lossy().replace('\\', "/")))
}

pub fn scan_repo(root: &Path, cfg: &ParsingSection) -> Result<ScanResult> {
    if !root.exists() {
        bail!("fs_scan: root does not exist: {}", root.display());
    }
    info!(root = %root.display(), "fs_scan: start");

    let ignore_globs = build_globset(&cfg.ignore_patterns);
    let mut stats = ScanStats::default();
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(cfg.follow_symlinks)
        .into_iter()
        .filter_entry(keep_entry);

    for entry in walker.filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let rel = normalize_repo_rel(root, path);

        if matches_any(Path::new(&rel), ignore_globs.as_ref()) {
            stats.files_skipped_ignored += 1;
            debug!(path = %rel, "fs_scan: ignored by glob");
            continue;
        }

        let meta = match std::fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "fs_scan: metadata failed, skipping file");
                continue;
            }
        };

        if meta.file_type().is_symlink() && !cfg.follow_symlinks {
            continue;
        }

        let size = meta.len();
        if size > cfg.max_file_size {
            stats.files_skipped_too_big += 1;
            debug!(path = %rel, size, "fs_scan: skipped, exceeds max_file_size");
            continue;
        }

        let language = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(LanguageKind::from_extension);

        stats.files_scanned += 1;
        files.push(ScannedFile {
            path: path.to_path_buf(),
            repo_rel_path: rel,
            language,
            size,
        });
    }

    info!(
        total = files.len(),
        ignored = stats.files_skipped_ignored,
        too_big = stats.files_skipped_too_big,
        "fs_scan: done"
    );

    Ok(ScanResult {
        root: root.to_path_buf(),
        files,
        stats,
    })
}

fn keep_entry(entry: &DirEntry) -> bool {
    if entry.file_type().is_dir() {
        if let Some(name) = entry.file_name().to_str() {
            return !matches!(name, ".git" | "node_modules" | "vendor" | "build" | ".idea" | ".vscode");
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_forward_slashes() {
        let root = Path::new("/repo");
        let p = Path::new("/repo/src/Foo.php");
        assert_eq!(normalize_repo_rel(root, p), "src/Foo.php");
    }

    #[test]
    fn ignore_glob_matches_nested_paths() {
        let gs = build_globset(&["**/vendor/**".to_string()]).unwrap();
        assert!(matches_any(Path::new("src/vendor/lib/Foo.php"), Some(&gs)));
        assert!(!matches_any(Path::new("src/App.php"), Some(&gs)));
    }
}
