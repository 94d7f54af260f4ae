use crate::{Annotation, FileRecord};
use anyhow::Result;
use std::path::Path;

/// The remote publish collaborator, injected as a capability so the session
/// can be driven in tests without a network.
pub trait CommentSink {
    /// Post one line-anchored discussion comment. `line` is in the
    /// post-removal coordinate space.
    fn post_line_comment(&mut self, path: &Path, line: u32, text: &str) -> Result<()>;
}

/// Cursor state of the review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active {
        file: usize,
        annotation: usize,
        scroll: usize,
    },
    Done,
}

/// The interactive review session: a cursor over (file, annotation) pairs
/// plus a scroll offset for the file pane.
///
/// The session owns the aggregated records and never mutates them; the two
/// transitions `advance` and `publish` only move the cursor. `Done` is
/// terminal.
pub struct ReviewSession {
    files: Vec<FileRecord>,
    state: SessionState,
}

impl ReviewSession {
    /// Create a session positioned on the first annotation of the first
    /// file, with the file pane scrolled so that annotation's line sits at
    /// the top. An empty collection starts (and ends) in `Done`.
    pub fn new(files: Vec<FileRecord>) -> Self {
        let state = match files.first().and_then(|f| f.annotations.first()) {
            Some(first) => SessionState::Active {
                file: 0,
                annotation: 0,
                scroll: (first.line - 1) as usize,
            },
            None => SessionState::Done,
        };
        Self { files, state }
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, SessionState::Done)
    }

    /// The record and annotation under the cursor, if any.
    pub fn current(&self) -> Option<(&FileRecord, &Annotation)> {
        let SessionState::Active { file, annotation, .. } = self.state else {
            return None;
        };
        let record = &self.files[file];
        Some((record, &record.annotations[annotation]))
    }

    /// Indices of the cursor, for display ("annotation m of n").
    pub fn cursor(&self) -> Option<(usize, usize)> {
        match self.state {
            SessionState::Active { file, annotation, .. } => Some((file, annotation)),
            SessionState::Done => None,
        }
    }

    pub fn scroll(&self) -> usize {
        match self.state {
            SessionState::Active { scroll, .. } => scroll,
            SessionState::Done => 0,
        }
    }

    /// Skip to the next annotation, crossing file boundaries; transitions to
    /// `Done` after the last file's last annotation. Re-positions the scroll
    /// so the newly selected annotation's line is at the top of the pane.
    pub fn advance(&mut self) {
        let SessionState::Active {
            mut file,
            mut annotation,
            ..
        } = self.state
        else {
            return;
        };

        annotation += 1;
        if annotation == self.files[file].annotations.len() {
            annotation = 0;
            file += 1;
        }
        if file == self.files.len() {
            self.state = SessionState::Done;
            return;
        }

        let line = self.files[file].annotations[annotation].line;
        self.state = SessionState::Active {
            file,
            annotation,
            scroll: (line - 1) as usize,
        };
    }

    /// Publish the current annotation, then advance. On failure the error is
    /// returned and the cursor stays put so the reviewer can retry.
    pub fn publish(&mut self, sink: &mut dyn CommentSink) -> Result<()> {
        let Some((record, ann)) = self.current() else {
            return Ok(());
        };
        sink.post_line_comment(&record.path, ann.line, &ann.text)?;
        self.advance();
        Ok(())
    }

    pub fn scroll_down(&mut self) {
        if let SessionState::Active { scroll, .. } = &mut self.state {
            // No upper bound: scrolling past the end just shows blank rows.
            *scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        if let SessionState::Active { scroll, .. } = &mut self.state {
            *scroll = scroll.saturating_sub(1);
        }
    }
}
