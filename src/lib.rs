pub mod cli;
pub mod collect;
pub mod extract;
pub mod gitlab;
pub mod highlight;
pub mod parser;
pub mod render;
pub mod session;
pub mod tui;

use std::path::PathBuf;

/// One extracted review annotation.
///
/// `line` is in the post-removal coordinate space: the line the annotation is
/// anchored to once every annotation comment block up to and including this
/// one has been stripped from the file. `raw_start..=raw_end` is the range of
/// physical lines the comment occupies in the original text; it is used for
/// filtering and rendering only, never published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub text: String,
    pub line: u32,
    pub raw_start: u32,
    pub raw_end: u32,
}

/// A source file contributing at least one annotation.
///
/// Built once during the tree walk and immutable afterwards. `path` is
/// relative to the walk root and doubles as both old and new path when
/// publishing.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub body: String,
    pub annotations: Vec<Annotation>,
}

/// The base/start/head revision triple a discussion comment is anchored
/// against. Resolved once at startup, immutable for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRefs {
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
}
