use crate::DiffRefs;
use crate::session::CommentSink;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use ureq::Agent;

/// Global timeout for all API requests. A publish that exceeds it surfaces
/// as an ordinary retryable failure.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the GitLab API client.
#[derive(Debug, Error)]
pub enum GitlabError {
    #[error("invalid merge request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("gitlab request failed: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error("merge request !{iid} in {project} has no diff refs")]
    MissingDiffRefs { project: String, iid: u64 },
}

impl From<ureq::Error> for GitlabError {
    fn from(err: ureq::Error) -> Self {
        GitlabError::Http(Box::new(err))
    }
}

/// A merge request identified by project path and internal id, as parsed
/// from a web URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestRef {
    pub project: String,
    pub iid: u64,
}

/// Parse a merge request web URL such as
/// `https://gitlab.example.com/group/project/-/merge_requests/42`.
///
/// The legacy form without the `/-/` separator is also accepted.
pub fn parse_merge_request_url(raw: &str) -> Result<MergeRequestRef, GitlabError> {
    let invalid = |reason: &str| GitlabError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = url::Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let pos = segments
        .iter()
        .position(|&seg| seg == "merge_requests")
        .ok_or_else(|| invalid("no merge_requests path segment"))?;

    let iid: u64 = segments
        .get(pos + 1)
        .ok_or_else(|| invalid("missing merge request id"))?
        .parse()
        .map_err(|_| invalid("merge request id is not a number"))?;

    let mut project = &segments[..pos];
    if project.last() == Some(&"-") {
        project = &project[..project.len() - 1];
    }
    if project.is_empty() {
        return Err(invalid("missing project path"));
    }

    Ok(MergeRequestRef {
        project: project.join("/"),
        iid,
    })
}

#[derive(Debug, Deserialize)]
struct MergeRequestResponse {
    diff_refs: Option<DiffRefsResponse>,
}

#[derive(Debug, Deserialize)]
struct DiffRefsResponse {
    base_sha: String,
    start_sha: String,
    head_sha: String,
}

/// Blocking GitLab REST v4 client scoped to one merge request.
///
/// The diff reference triple is resolved once at construction and anchors
/// every published comment.
pub struct GitlabClient {
    agent: Agent,
    api_base: String,
    token: String,
    mr: MergeRequestRef,
    diff_refs: DiffRefs,
}

impl GitlabClient {
    /// Connect to the API and resolve the merge request's diff refs.
    /// Failure here aborts startup.
    pub fn connect(base_url: &str, token: &str, mr: MergeRequestRef) -> Result<Self, GitlabError> {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(HTTP_TIMEOUT))
            .build()
            .into();

        let api_base = format!("{}/api/v4", base_url.trim_end_matches('/'));
        let url = format!(
            "{}/projects/{}/merge_requests/{}",
            api_base,
            encode_project(&mr.project),
            mr.iid
        );

        let response: MergeRequestResponse = agent
            .get(&url)
            .header("PRIVATE-TOKEN", token)
            .call()?
            .body_mut()
            .read_json()?;

        let refs = response
            .diff_refs
            .ok_or_else(|| GitlabError::MissingDiffRefs {
                project: mr.project.clone(),
                iid: mr.iid,
            })?;

        Ok(Self {
            agent,
            api_base,
            token: token.to_string(),
            mr,
            diff_refs: DiffRefs {
                base_sha: refs.base_sha,
                start_sha: refs.start_sha,
                head_sha: refs.head_sha,
            },
        })
    }

    pub fn diff_refs(&self) -> &DiffRefs {
        &self.diff_refs
    }

    pub fn merge_request(&self) -> &MergeRequestRef {
        &self.mr
    }
}

impl CommentSink for GitlabClient {
    fn post_line_comment(&mut self, path: &Path, line: u32, text: &str) -> anyhow::Result<()> {
        let url = format!(
            "{}/projects/{}/merge_requests/{}/discussions",
            self.api_base,
            encode_project(&self.mr.project),
            self.mr.iid
        );

        // Annotations land on lines unchanged between base and head (apart
        // from removed annotation blocks), so old and new path coincide.
        let file = path.to_string_lossy();
        let body = serde_json::json!({
            "body": text,
            "position": {
                "base_sha": self.diff_refs.base_sha,
                "start_sha": self.diff_refs.start_sha,
                "head_sha": self.diff_refs.head_sha,
                "position_type": "text",
                "old_path": file,
                "new_path": file,
                "new_line": line,
            },
        });

        self.agent
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send_json(&body)
            .map_err(GitlabError::from)?;
        Ok(())
    }
}

/// Percent-encode a project path for use as a single URL path segment.
fn encode_project(project: &str) -> String {
    project.replace('/', "%2F")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modern_merge_request_url() {
        let mr =
            parse_merge_request_url("https://gitlab.com/group/project/-/merge_requests/42").unwrap();
        assert_eq!(mr.project, "group/project");
        assert_eq!(mr.iid, 42);
    }

    #[test]
    fn parse_nested_group_url() {
        let mr = parse_merge_request_url(
            "https://gitlab.example.com/group/sub/project/-/merge_requests/7",
        )
        .unwrap();
        assert_eq!(mr.project, "group/sub/project");
        assert_eq!(mr.iid, 7);
    }

    #[test]
    fn parse_legacy_url_without_dash() {
        let mr = parse_merge_request_url("https://gitlab.com/group/project/merge_requests/3637")
            .unwrap();
        assert_eq!(mr.project, "group/project");
        assert_eq!(mr.iid, 3637);
    }

    #[test]
    fn parse_rejects_non_url() {
        assert!(parse_merge_request_url("not a url").is_err());
    }

    #[test]
    fn parse_rejects_missing_iid() {
        let err =
            parse_merge_request_url("https://gitlab.com/group/project/-/merge_requests").unwrap_err();
        assert!(matches!(err, GitlabError::InvalidUrl { .. }));
    }

    #[test]
    fn parse_rejects_non_numeric_iid() {
        assert!(
            parse_merge_request_url("https://gitlab.com/g/p/-/merge_requests/new").is_err()
        );
    }

    #[test]
    fn parse_rejects_missing_project() {
        assert!(parse_merge_request_url("https://gitlab.com/-/merge_requests/1").is_err());
    }

    #[test]
    fn encode_project_escapes_slashes() {
        assert_eq!(encode_project("group/sub/project"), "group%2Fsub%2Fproject");
        assert_eq!(encode_project("flat"), "flat");
    }
}
