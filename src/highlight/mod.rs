use ratatui::{
    style::{Color, Style},
    text::Span,
};
use syntect::{
    easy::HighlightLines,
    highlighting::{Color as SyntectColor, Theme, ThemeSet},
    parsing::SyntaxSet,
};

/// Maximum line length for syntax highlighting (skip longer lines for performance).
const MAX_LINE_LENGTH: usize = 10_000;

/// Syntax highlighter for the file pane.
///
/// This struct is immutable and can be shared. Use `for_file()` to create
/// a stateful highlighter session for a specific file.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Create a new Highlighter with default syntax and theme sets.
    ///
    /// This loads all bundled syntaxes and themes, which takes ~250ms.
    /// The cost is paid once at initialization.
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .get("base16-ocean.dark")
            .or_else(|| theme_set.themes.values().next())
            .cloned()
            .unwrap_or_default();

        Self { syntax_set, theme }
    }

    /// Create a file-scoped highlighter session that maintains state across
    /// lines, so multi-line strings and comments highlight correctly. Lines
    /// must be fed in file order.
    pub fn for_file(&self, file_ext: &str) -> FileHighlighter<'_> {
        FileHighlighter::new(&self.syntax_set, &self.theme, file_ext)
    }

    /// Convert syntect Color to ratatui Color.
    fn syntect_to_ratatui(color: SyntectColor) -> Color {
        Color::Rgb(color.r, color.g, color.b)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Maintains HighlightLines state across lines within a single file.
pub struct FileHighlighter<'a> {
    highlighter: Option<HighlightLines<'a>>,
    syntax_set: &'a SyntaxSet,
}

impl<'a> FileHighlighter<'a> {
    fn new(syntax_set: &'a SyntaxSet, theme: &'a Theme, file_ext: &str) -> Self {
        let syntax = syntax_set
            .find_syntax_by_extension(file_ext)
            .or_else(|| syntax_set.find_syntax_by_name(file_ext));

        let highlighter = syntax.map(|s| HighlightLines::new(s, theme));

        Self {
            highlighter,
            syntax_set,
        }
    }

    /// Highlight a single source line, returning owned spans.
    ///
    /// Falls back to a plain span when the file type is unknown, the line is
    /// very long, or highlighting fails.
    pub fn highlight_line(&mut self, line: &str) -> Vec<Span<'static>> {
        if line.is_empty() {
            return vec![Span::raw(String::new())];
        }

        if line.len() > MAX_LINE_LENGTH {
            return vec![Span::raw(line.to_string())];
        }

        let Some(ref mut highlighter) = self.highlighter else {
            return vec![Span::raw(line.to_string())];
        };

        match highlighter.highlight_line(line, self.syntax_set) {
            Ok(regions) => regions
                .into_iter()
                .map(|(style, text)| {
                    let fg = Highlighter::syntect_to_ratatui(style.foreground);
                    Span::styled(text.to_string(), Style::default().fg(fg))
                })
                .collect(),
            Err(_) => vec![Span::raw(line.to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_are_recognized() {
        let highlighter = Highlighter::new();

        let fh = highlighter.for_file("go");
        assert!(fh.highlighter.is_some(), "Go syntax should be found");

        let fh = highlighter.for_file("rs");
        assert!(fh.highlighter.is_some(), "Rust syntax should be found");

        let fh = highlighter.for_file("unknown_ext_xyz");
        assert!(fh.highlighter.is_none());
    }

    #[test]
    fn highlight_produces_styled_spans() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("go");
        let spans = fh.highlight_line("func main() { fmt.Println(\"hi\") }");

        assert!(!spans.is_empty());
        assert!(spans.len() > 1, "should split into styled regions");
    }

    #[test]
    fn unknown_extension_falls_back_to_plain() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("unknown_xyz");
        let line = "some text in unknown format";
        let spans = fh.highlight_line(line);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content.as_ref(), line);
    }

    #[test]
    fn empty_line_yields_single_empty_span() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("go");
        let spans = fh.highlight_line("");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content.as_ref(), "");
    }

    #[test]
    fn long_line_is_skipped_quickly() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("go");
        let long_line = "x".repeat(15_000);

        let start = std::time::Instant::now();
        let spans = fh.highlight_line(&long_line);
        assert!(start.elapsed() < std::time::Duration::from_millis(100));
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn multiline_comment_state_is_kept() {
        let highlighter = Highlighter::new();
        let mut fh = highlighter.for_file("go");

        let spans1 = fh.highlight_line("/* start of block");
        let spans2 = fh.highlight_line("still inside */");
        assert!(!spans1.is_empty());
        assert!(!spans2.is_empty());
    }

    #[test]
    fn syntect_to_ratatui_conversion() {
        let syntect_color = SyntectColor {
            r: 255,
            g: 128,
            b: 64,
            a: 255,
        };
        assert_eq!(
            Highlighter::syntect_to_ratatui(syntect_color),
            Color::Rgb(255, 128, 64)
        );
    }
}
