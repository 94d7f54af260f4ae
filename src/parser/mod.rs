/// A raw comment span produced by the scanner, in document order.
///
/// Lines and columns are 1-based. `text` has the comment syntax removed:
/// a `//` group yields one line per member comment (with a single leading
/// space stripped), a block comment yields its interior verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSpan {
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub text: String,
}

/// Scan one file's source text for comments.
///
/// Recognizes `//` line comments and `/* ... */` block comments. Consecutive
/// line comments on adjacent lines are merged into a single span (a comment
/// group), so a multi-line annotation written as stacked `//` lines is one
/// span. Comments sharing a physical line also merge, so the spans returned
/// never overlap and their start lines are strictly increasing. String
/// literals (`"..."` with escapes, raw backtick strings, `'x'` char literals)
/// are skipped so comment tokens inside them are ignored; a lone quote that
/// never closes, like a Rust lifetime tick, is treated as punctuation.
pub fn scan_comments(source: &str) -> Vec<CommentSpan> {
    let chars: Vec<char> = source.chars().collect();
    let mut spans: Vec<CommentSpan> = Vec::new();
    // Current `//` group, not yet flushed; a non-adjacent comment ends it.
    let mut pending: Option<CommentSpan> = None;
    let mut i = 0;
    let mut line: u32 = 1;
    let mut col: u32 = 1;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match c {
            '"' => {
                // String literal: consume until the closing quote, honoring
                // backslash escapes. Normal literals cannot span lines, so an
                // unterminated one resyncs at the newline.
                i += 1;
                col += 1;
                while i < chars.len() {
                    let s = chars[i];
                    if s == '\\' && i + 1 < chars.len() && chars[i + 1] != '\n' {
                        i += 2;
                        col += 2;
                        continue;
                    }
                    if s == '\n' {
                        line += 1;
                        col = 1;
                        i += 1;
                        break;
                    }
                    i += 1;
                    col += 1;
                    if s == '"' {
                        break;
                    }
                }
            }
            '\'' => {
                // A char literal is either one char (`'x'`) or a backslash
                // escape. Anything else, such as a lifetime tick, is a
                // single punctuation char.
                let is_literal = match next {
                    Some('\\') => true,
                    Some('\n') | Some('\'') | None => false,
                    Some(_) => chars.get(i + 2) == Some(&'\''),
                };
                if !is_literal {
                    i += 1;
                    col += 1;
                    continue;
                }
                i += 1;
                col += 1;
                while i < chars.len() {
                    let s = chars[i];
                    if s == '\\' && i + 1 < chars.len() && chars[i + 1] != '\n' {
                        i += 2;
                        col += 2;
                        continue;
                    }
                    if s == '\n' {
                        line += 1;
                        col = 1;
                        i += 1;
                        break;
                    }
                    i += 1;
                    col += 1;
                    if s == '\'' {
                        break;
                    }
                }
            }
            '`' => {
                // Raw string: no escapes, may span lines.
                i += 1;
                col += 1;
                while i < chars.len() {
                    let s = chars[i];
                    if s == '\n' {
                        line += 1;
                        col = 1;
                    } else {
                        col += 1;
                    }
                    i += 1;
                    if s == '`' {
                        break;
                    }
                }
            }
            '/' if next == Some('/') => {
                let start_line = line;
                let start_column = col;
                i += 2;
                col += 2;
                let mut content = String::new();
                while i < chars.len() && chars[i] != '\n' {
                    content.push(chars[i]);
                    i += 1;
                    col += 1;
                }
                if content.starts_with(' ') {
                    content.remove(0);
                }

                match pending.as_mut() {
                    Some(group) if group.end_line + 1 == start_line => {
                        group.text.push('\n');
                        group.text.push_str(&content);
                        group.end_line = start_line;
                    }
                    _ => {
                        if let Some(done) = pending.take() {
                            spans.push(done);
                        }
                        // A block comment that closed earlier on this same
                        // line belongs to the same group; fold into it and
                        // keep it open for further adjacent lines.
                        match spans.pop() {
                            Some(mut prev) if prev.end_line == start_line => {
                                prev.text.push('\n');
                                prev.text.push_str(&content);
                                pending = Some(prev);
                            }
                            prev => {
                                if let Some(span) = prev {
                                    spans.push(span);
                                }
                                pending = Some(CommentSpan {
                                    start_line,
                                    end_line: start_line,
                                    start_column,
                                    text: content,
                                });
                            }
                        }
                    }
                }
            }
            '/' if next == Some('*') => {
                if let Some(done) = pending.take() {
                    spans.push(done);
                }
                let start_line = line;
                let start_column = col;
                i += 2;
                col += 2;
                let mut content = String::new();
                while i < chars.len() {
                    if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        i += 2;
                        col += 2;
                        break;
                    }
                    let s = chars[i];
                    if s == '\n' {
                        line += 1;
                        col = 1;
                    } else {
                        col += 1;
                    }
                    content.push(s);
                    i += 1;
                }
                // Two block comments on one physical line are one group;
                // without the merge they would claim overlapping line ranges.
                match spans.last_mut() {
                    Some(prev) if prev.end_line == start_line => {
                        prev.text.push('\n');
                        prev.text.push_str(&content);
                        prev.end_line = line;
                    }
                    _ => spans.push(CommentSpan {
                        start_line,
                        end_line: line,
                        start_column,
                        text: content,
                    }),
                }
            }
            '\n' => {
                line += 1;
                col = 1;
                i += 1;
            }
            _ => {
                col += 1;
                i += 1;
            }
        }
    }

    if let Some(done) = pending.take() {
        spans.push(done);
    }

    spans
}
