//! # Source Descriptor Resolution
//!
//! A component's `source` string encodes where its repository lives and,
//! optionally, which version to check out and which VCS type it uses:
//!
//! ```text
//! git://github.com/org/repo.git?version=v1.0.0&type=git
//! https://github.com/org/repo.git?version=main
//! file:///srv/mirrors/repo.git
//! git@github.com:org/repo.git?version=v2.0.0
//! ```
//!
//! [`resolve`] turns such a string into a [`ResolvedSource`]: a URL suitable
//! for `git clone` (query string removed, `git://` rewritten to `https://`),
//! the requested version and the VCS type. Resolution never fails. Anything
//! that is neither a URL with a recognized scheme nor an SCP-like
//! `user@host:path` keeps its shape; only its query string is split off.
//!
//! [`derive_name`] computes the directory name used for a component that does
//! not declare one.

use url::form_urlencoded;
use url::Url;

use crate::defaults::{DEFAULT_COMPONENT_NAME, DEFAULT_VCS_TYPE};

/// URL schemes accepted as repository locations.
pub const RECOGNIZED_SCHEMES: [&str; 5] = ["git", "https", "http", "file", "ssh"];

/// The normalized (URL, version, type) triple derived from a source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Repository location to clone from.
    pub url: String,
    /// Tag, branch or commit. Empty means the remote's default branch.
    pub version: String,
    /// VCS type tag. Carried for display; only git is ever driven.
    pub vcs_type: String,
}

impl ResolvedSource {
    /// Returns true when a specific version was requested.
    pub fn has_version(&self) -> bool {
        !self.version.is_empty()
    }

    /// Returns a copy with `version` filled in when none was resolved.
    pub fn with_fallback_version(mut self, fallback: Option<&str>) -> Self {
        if self.version.is_empty() {
            if let Some(version) = fallback {
                self.version = version.to_string();
            }
        }
        self
    }
}

/// The syntactic shape of a source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceForm {
    /// `scheme://...` with a scheme from [`RECOGNIZED_SCHEMES`].
    Url,
    /// `user@host:path`.
    Scp,
    /// Anything else, including local paths and garbage.
    Opaque,
}

/// Classifies a source string without modifying it.
pub fn classify(source: &str) -> SourceForm {
    if parse_recognized_url(source).is_some() {
        SourceForm::Url
    } else if split_scp(strip_query(source).0).is_some() {
        SourceForm::Scp
    } else {
        SourceForm::Opaque
    }
}

/// Resolves a source string into a repository URL, version and VCS type.
///
/// The `version` and `type` query parameters are extracted and the whole
/// query string is removed. Recognized URLs are normalized and `git://`
/// becomes `https://`; SCP-like sources, other schemes and local paths keep
/// their shape. Input without a query comes back unchanged with an empty
/// version. The type defaults to `"git"`.
pub fn resolve(source: &str) -> ResolvedSource {
    if let Some(mut url) = parse_recognized_url(source) {
        let (version, vcs_type) = query_params(url.query().unwrap_or(""));
        url.set_query(None);

        let mut repo_url: String = url.into();
        if let Some(rest) = repo_url.strip_prefix("git://") {
            let rewritten = format!("https://{}", rest);
            // Serialize as a special scheme so host case and root path settle.
            repo_url = match Url::parse(&rewritten) {
                Ok(https) => https.into(),
                Err(_) => rewritten,
            };
        }

        return ResolvedSource {
            url: repo_url,
            version,
            vcs_type: vcs_type_or_default(vcs_type),
        };
    }

    // SCP form, other schemes and local paths keep their shape and only lose
    // the query string.
    let (base, query) = strip_query(source);
    let (version, vcs_type) = query_params(query.unwrap_or(""));
    ResolvedSource {
        url: base.to_string(),
        version,
        vcs_type: vcs_type_or_default(vcs_type),
    }
}

/// Derives a component name from a repository URL, SCP path or local path.
///
/// The final path segment is used after removing a trailing `.git` and any
/// trailing separators. Backslashes count as separators. When nothing usable
/// remains the placeholder [`DEFAULT_COMPONENT_NAME`] is returned.
pub fn derive_name(repo: &str) -> String {
    let (base, _) = strip_query(repo);

    let path = if let Some(url) = parse_recognized_url(base) {
        url.path().to_string()
    } else if let Some((_, scp_path)) = split_scp(base) {
        scp_path.to_string()
    } else {
        base.to_string()
    };

    let normalized = path.replace('\\', "/");
    let trimmed = normalized.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('/');

    match trimmed.rsplit('/').next().unwrap_or_default() {
        "" | "." | ".." => DEFAULT_COMPONENT_NAME.to_string(),
        name => name.to_string(),
    }
}

fn parse_recognized_url(source: &str) -> Option<Url> {
    if !source.contains("://") {
        return None;
    }
    let url = Url::parse(source).ok()?;
    RECOGNIZED_SCHEMES
        .contains(&url.scheme())
        .then_some(url)
}

fn strip_query(source: &str) -> (&str, Option<&str>) {
    match source.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (source, None),
    }
}

/// Splits `user@host:path` into `("user@host", "path")`.
fn split_scp(source: &str) -> Option<(&str, &str)> {
    if source.contains("://") {
        return None;
    }
    let (authority, path) = source.split_once(':')?;
    if authority.contains(['/', '\\']) {
        return None;
    }
    let (user, host) = authority.split_once('@')?;
    if user.is_empty() || host.is_empty() {
        return None;
    }
    Some((authority, path))
}

/// Returns the first `version` and `type` values of a query string.
fn query_params(query: &str) -> (String, String) {
    let mut version = None;
    let mut vcs_type = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "version" if version.is_none() => version = Some(value.into_owned()),
            "type" if vcs_type.is_none() => vcs_type = Some(value.into_owned()),
            _ => {}
        }
    }
    (version.unwrap_or_default(), vcs_type.unwrap_or_default())
}

fn vcs_type_or_default(vcs_type: String) -> String {
    if vcs_type.is_empty() {
        DEFAULT_VCS_TYPE.to_string()
    } else {
        vcs_type
    }
}
