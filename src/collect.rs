//! Candidate file collection.
//!
//! Turns command-line targets (files, directories, glob patterns) into a
//! sorted, duplicate-free list of `.json` paths. Directory walks skip any
//! folder named `schema` so the schema itself is never scored as data.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use walkdir::{DirEntry, WalkDir};

use crate::error::ConfigError;
use crate::types::{CollectOptions, SCHEMA_DIR_NAME};

/// Collect candidate JSON files from a list of targets.
///
/// Each target may be a file, a directory (walked recursively) or a glob
/// pattern. Targets that match nothing contribute nothing. The result is
/// sorted and de-duplicated, so it does not depend on filesystem
/// enumeration order.
pub fn collect_files<S: AsRef<str>>(targets: &[S], options: &CollectOptions) -> Vec<PathBuf> {
    let mut files = BTreeSet::new();

    for target in targets {
        let target = target.as_ref();
        let path = Path::new(target);
        if path.is_dir() {
            walk_dir(path, options, &mut files);
        } else if is_glob(target) {
            expand_glob(target, &mut files);
        } else if path.is_file() && is_json(path) {
            files.insert(path.to_path_buf());
        } else {
            tracing::debug!(path = target, "target matched no files");
        }
    }

    files.into_iter().collect()
}

/// Fail when any of the given catalog roots is missing.
pub fn require_roots(roots: &[PathBuf]) -> Result<(), ConfigError> {
    match roots.iter().find(|root| !root.is_dir()) {
        Some(missing) => Err(ConfigError::CatalogNotFound {
            path: missing.clone(),
        }),
        None => Ok(()),
    }
}

fn walk_dir(root: &Path, options: &CollectOptions, files: &mut BTreeSet<PathBuf>) {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !(options.prune_schema_dirs && is_schema_dir(entry)));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_json(entry.path()) => {
                files.insert(entry.into_path());
            }
            Ok(_) => {}
            Err(err) => tracing::debug!(error = %err, "skipping unreadable entry"),
        }
    }
}

/// A directory below the walk root whose name is `schema`, in any case.
fn is_schema_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_string_lossy()
            .eq_ignore_ascii_case(SCHEMA_DIR_NAME)
}

fn expand_glob(pattern: &str, files: &mut BTreeSet<PathBuf>) {
    let matcher = match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => glob.compile_matcher(),
        Err(err) => {
            tracing::debug!(pattern, error = %err, "invalid glob pattern");
            return;
        }
    };

    let base = glob_base(pattern);
    let implicit_base = base.as_os_str().is_empty();
    let walk_root = if implicit_base {
        PathBuf::from(".")
    } else {
        base.clone()
    };

    let mut walker = WalkDir::new(&walk_root).follow_links(false);
    if !pattern.contains("**") {
        let depth = Path::new(pattern)
            .components()
            .count()
            .saturating_sub(base.components().count());
        walker = walker.max_depth(depth);
    }

    for entry in walker.into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = if implicit_base {
            match entry.path().strip_prefix(".") {
                Ok(stripped) => stripped.to_path_buf(),
                Err(_) => continue,
            }
        } else {
            entry.path().to_path_buf()
        };
        if is_json(&path) && matcher.is_match(&path) {
            files.insert(path);
        }
    }
}

/// Leading components of a pattern that contain no glob syntax.
fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        if let Component::Normal(part) = component {
            if is_glob(&part.to_string_lossy()) {
                break;
            }
        }
        base.push(component);
    }
    base
}

fn is_glob(s: &str) -> bool {
    s.contains(|c| matches!(c, '*' | '?' | '[' | '{'))
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}
