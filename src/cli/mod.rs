use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cr-review",
    about = "Extract CR review comments from a source tree and publish them to a GitLab merge request"
)]
pub struct Cli {
    /// Merge request URL (e.g. "https://gitlab.com/group/project/-/merge_requests/42").
    pub merge_request_url: String,

    /// Root of the source tree to scan for annotations.
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Source file extension to scan.
    #[arg(short, long, default_value = "go")]
    pub ext: String,

    /// Marker token identifying a review comment (case-sensitive).
    #[arg(short, long, default_value = "CR")]
    pub marker: String,
}

/// Parse CLI arguments.
pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["cr-review", "https://gitlab.com/g/p/-/merge_requests/1"])
            .unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.ext, "go");
        assert_eq!(cli.marker, "CR");
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "cr-review",
            "https://gitlab.com/g/p/-/merge_requests/1",
            "--root",
            "/src",
            "--ext",
            "rs",
            "--marker",
            "REVIEW",
        ])
        .unwrap();
        assert_eq!(cli.root, PathBuf::from("/src"));
        assert_eq!(cli.ext, "rs");
        assert_eq!(cli.marker, "REVIEW");
    }

    #[test]
    fn url_is_required() {
        assert!(Cli::try_parse_from(["cr-review"]).is_err());
    }
}
