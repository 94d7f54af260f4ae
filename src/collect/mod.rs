use crate::FileRecord;
use crate::{extract, parser};
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Walk a source tree and aggregate every file carrying at least one review
/// annotation.
///
/// Visits regular files with the given extension in a stable (name-sorted)
/// order, skipping hidden directories. Files that cannot be read are
/// reported to stderr and skipped; the walk is best-effort by design. Paths
/// in the returned records are relative to `root`.
pub fn collect_annotated_files(root: &Path, ext: &str, marker: &str) -> Vec<FileRecord> {
    let mut records = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }

        let body = match fs::read_to_string(path) {
            Ok(body) => body,
            Err(err) => {
                eprintln!("skipping {}: {err}", path.display());
                continue;
            }
        };

        let spans = parser::scan_comments(&body);
        let annotations = extract::extract_annotations(&spans, marker);
        if annotations.is_empty() {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        records.push(FileRecord {
            path: rel,
            body,
            annotations,
        });
    }

    records
}
