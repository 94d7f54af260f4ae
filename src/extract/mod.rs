use crate::Annotation;
use crate::parser::CommentSpan;

/// Ordered set of raw line ranges (1-based, inclusive) that will be removed
/// from a file. Built once per file and shared between the extractor's line
/// re-mapping and the renderer's filtering, so the two always agree.
#[derive(Debug, Clone, Default)]
pub struct RedactionMap {
    ranges: Vec<(u32, u32)>,
}

impl RedactionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map from a file's already-extracted annotations.
    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        let mut map = Self::new();
        for ann in annotations {
            map.push(ann.raw_start, ann.raw_end);
        }
        map
    }

    /// Append a removed range. Ranges must arrive in ascending document order
    /// and must not overlap; violating that is a bug in the caller.
    pub fn push(&mut self, start: u32, end: u32) {
        assert!(start <= end, "redaction range reversed: {start}..{end}");
        assert!(
            self.ranges.last().is_none_or(|&(_, prev_end)| prev_end < start),
            "redaction ranges out of order"
        );
        self.ranges.push((start, end));
    }

    /// Whether a raw line falls inside a removed range.
    pub fn covers(&self, line: u32) -> bool {
        self.ranges
            .binary_search_by(|&(start, end)| {
                if end < line {
                    std::cmp::Ordering::Less
                } else if start > line {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Map a raw line number into the post-removal coordinate space by
    /// subtracting the height of every range strictly before it.
    pub fn mapped_line(&self, raw: u32) -> u32 {
        let removed: u32 = self
            .ranges
            .iter()
            .take_while(|&&(_, end)| end < raw)
            .map(|&(start, end)| end - start + 1)
            .sum();
        raw - removed
    }
}

/// Strip up to `n` leading whitespace characters from a line.
///
/// Never removes more than `n` characters and never removes non-whitespace.
fn strip_indent(line: &str, n: u32) -> &str {
    let mut rest = line;
    for _ in 0..n {
        match rest.chars().next() {
            Some(c) if c.is_whitespace() => rest = &rest[c.len_utf8()..],
            _ => break,
        }
    }
    rest
}

/// Sanitize a recognized annotation's text.
///
/// Strips the marker token, one following `:` separator, and surrounding
/// whitespace, then de-indents every line by up to `column - 1` whitespace
/// characters. `column` is the 1-based column the comment token started at;
/// the indentation it implies is an artifact of the source position, not part
/// of the authored text.
pub fn sanitize(text: &str, marker: &str, column: u32) -> String {
    let text = text.trim();
    let text = text.strip_prefix(marker).unwrap_or(text);
    let text = text.strip_prefix(':').unwrap_or(text);
    let text = text.trim();
    let indent = column.saturating_sub(1);
    text.lines()
        .map(|line| strip_indent(line, indent))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract review annotations from one file's comment spans.
///
/// Spans must be in document order. Comments whose trimmed text does not
/// begin with `marker` (case-sensitive) are skipped. Each accepted comment
/// yields an [`Annotation`] whose `line` is in the post-removal coordinate
/// space maintained by a shared [`RedactionMap`].
pub fn extract_annotations(spans: &[CommentSpan], marker: &str) -> Vec<Annotation> {
    let mut map = RedactionMap::new();
    let mut annotations = Vec::new();

    for span in spans {
        let trimmed = span.text.trim();
        if !trimmed.starts_with(marker) {
            continue;
        }

        let line = map.mapped_line(span.start_line);
        map.push(span.start_line, span.end_line);

        annotations.push(Annotation {
            text: sanitize(trimmed, marker, span.start_column),
            line,
            raw_start: span.start_line,
            raw_end: span.end_line,
        });
    }

    annotations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u32, end: u32, column: u32, text: &str) -> CommentSpan {
        CommentSpan {
            start_line: start,
            end_line: end,
            start_column: column,
            text: text.to_string(),
        }
    }

    #[test]
    fn strip_indent_table() {
        for (input, n, want) in [
            ("Foo", 0, "Foo"),
            ("Foo", 1, "Foo"),
            ("\tFoo", 0, "\tFoo"),
            ("\tFoo", 1, "Foo"),
            ("\t\tFoo", 1, "\tFoo"),
            ("  Foo", 5, "Foo"),
            ("", 3, ""),
        ] {
            assert_eq!(strip_indent(input, n), want, "input={input:?} n={n}");
        }
    }

    #[test]
    fn strip_indent_never_removes_more_than_n() {
        for n in 0..8u32 {
            let input = "      x";
            let out = strip_indent(input, n);
            assert!(input.len() - out.len() <= n as usize);
            assert!(out.ends_with('x'));
        }
    }

    #[test]
    fn sanitize_strips_marker_and_separator() {
        assert_eq!(sanitize("CR: fix this", "CR", 1), "fix this");
        assert_eq!(sanitize("CR fix this", "CR", 1), "fix this");
        assert_eq!(sanitize("CR:fix this", "CR", 1), "fix this");
    }

    #[test]
    fn sanitize_deindents_continuation_lines() {
        // Block comment written at column 3: interior lines carry two
        // columns of structural indentation.
        let text = "CR: first\n  second\n  third";
        assert_eq!(sanitize(text, "CR", 3), "first\nsecond\nthird");
    }

    #[test]
    fn sanitize_preserves_authored_indentation_beyond_column() {
        let text = "CR: code\n\t\tindented";
        assert_eq!(sanitize(text, "CR", 2), "code\n\tindented");
    }

    #[test]
    fn sanitize_is_idempotent_on_clean_text() {
        let clean = "already sanitized\nsecond line";
        assert_eq!(sanitize(clean, "CR", 1), clean);
        assert_eq!(sanitize(&sanitize(clean, "CR", 1), "CR", 1), clean);
    }

    #[test]
    fn extract_single_annotation() {
        // 1:"package x"  2:"// CR: fix this"  3:"func f(){}"
        let spans = vec![span(2, 2, 1, "CR: fix this")];
        let anns = extract_annotations(&spans, "CR");
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].text, "fix this");
        assert_eq!(anns[0].line, 2);
        assert_eq!(anns[0].raw_start, 2);
        assert_eq!(anns[0].raw_end, 2);
    }

    #[test]
    fn extract_skips_unmarked_comments() {
        let spans = vec![
            span(1, 1, 1, "just a comment"),
            span(3, 3, 1, "CR: real"),
            span(5, 5, 1, "cr: wrong case"),
        ];
        let anns = extract_annotations(&spans, "CR");
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].text, "real");
    }

    #[test]
    fn extract_accumulates_offset_across_blocks() {
        // Block 1 occupies lines 2-4 (3 lines), block 2 line 8.
        let spans = vec![span(2, 4, 1, "CR: first"), span(8, 8, 1, "CR: second")];
        let anns = extract_annotations(&spans, "CR");
        assert_eq!(anns[0].line, 2);
        assert_eq!(anns[1].line, 5); // 8 - 3
    }

    #[test]
    fn extract_empty_for_no_matches() {
        let spans = vec![span(1, 1, 1, "nothing here")];
        assert!(extract_annotations(&spans, "CR").is_empty());
    }

    #[test]
    fn extract_lines_are_monotonic_and_bounded() {
        let spans = vec![
            span(1, 2, 1, "CR: a"),
            span(3, 3, 1, "CR: b"),
            span(10, 12, 1, "CR: c"),
            span(20, 20, 1, "CR: d"),
        ];
        let anns = extract_annotations(&spans, "CR");
        for pair in anns.windows(2) {
            assert!(pair[0].line <= pair[1].line);
        }
        for ann in &anns {
            assert!(ann.line <= ann.raw_start);
        }
    }

    #[test]
    fn redaction_map_covers_and_maps() {
        let mut map = RedactionMap::new();
        map.push(2, 4);
        map.push(8, 8);

        assert!(!map.covers(1));
        assert!(map.covers(2));
        assert!(map.covers(4));
        assert!(!map.covers(5));
        assert!(map.covers(8));

        assert_eq!(map.mapped_line(1), 1);
        assert_eq!(map.mapped_line(2), 2); // own range not yet counted
        assert_eq!(map.mapped_line(5), 2);
        assert_eq!(map.mapped_line(8), 5);
        assert_eq!(map.mapped_line(9), 5);
    }

    #[test]
    #[should_panic(expected = "redaction ranges out of order")]
    fn redaction_map_rejects_out_of_order_push() {
        let mut map = RedactionMap::new();
        map.push(5, 6);
        map.push(2, 3);
    }
}
