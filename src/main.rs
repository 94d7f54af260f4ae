use anyhow::{Context, Result, bail};
use std::env;

use cr_review::cli;
use cr_review::collect::collect_annotated_files;
use cr_review::gitlab::{GitlabClient, parse_merge_request_url};
use cr_review::session::ReviewSession;
use cr_review::tui::{App, run_tui};

fn main() -> Result<()> {
    let args = cli::parse_args();

    let token = match env::var("GITLAB_TOKEN") {
        Ok(token) if !token.is_empty() => token,
        _ => bail!("empty auth token: please set the GITLAB_TOKEN env variable"),
    };
    let base_url =
        env::var("GITLAB_BASE_URL").unwrap_or_else(|_| "https://gitlab.com".to_string());

    let mr = parse_merge_request_url(&args.merge_request_url)?;

    let records = collect_annotated_files(&args.root, &args.ext, &args.marker);
    if records.is_empty() {
        println!(
            "No {} comments found under {}",
            args.marker,
            args.root.display()
        );
        return Ok(());
    }

    let client = GitlabClient::connect(&base_url, &token, mr)
        .context("Failed to resolve merge request diff refs")?;

    let session = ReviewSession::new(records);
    run_tui(App::new(session, client, &args.ext))?;

    Ok(())
}
