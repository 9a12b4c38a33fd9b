use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use url::Url;

const INDEX_FILE: &str = "index.html";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathMapError {
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0} would be written outside the download folder")]
    OutsideBase(String),
}

/// Map a URL to its save location under `base_dir`.
///
/// The layout is `base_dir/<host[:port]>/<path>`, using the authority and path
/// text exactly as written in the URL. Directory-like paths get an
/// `index.html` nested inside them, so `https://a.com/x` and `https://a.com/x/`
/// both land on `a.com/x/index.html`. Query strings and fragments are dropped,
/// which means URLs that differ only in their query overwrite each other.
/// Empty segments are skipped and `..` segments are rejected, so the result
/// always stays inside `base_dir`.
pub fn map_to_path(base_dir: &Path, url: &str) -> Result<PathBuf, PathMapError> {
    let parsed = Url::parse(url)?;
    let (netloc, raw_path) = match split_raw(url) {
        Some(parts) => parts,
        None => (parsed.host_str().unwrap_or_default(), parsed.path()),
    };

    let mut segments: Vec<&str> = raw_path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    let is_directory =
        raw_path.ends_with('/') || !segments.last().is_some_and(|last| has_extension(last));
    if is_directory {
        segments.push(INDEX_FILE);
    }

    let mut relative = PathBuf::from(netloc);
    relative.extend(&segments);
    if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(PathMapError::OutsideBase(url.to_string()));
    }

    Ok(base_dir.join(relative))
}

// Authority (minus any user info) and path as they appear in the input text.
fn split_raw(url: &str) -> Option<(&str, &str)> {
    let (_, rest) = url.split_once("://")?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let (authority, path) = match rest.find('/') {
        Some(slash) => rest.split_at(slash),
        None => (rest, ""),
    };
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    Some((host, path))
}

// Leading dots mark hidden files, not extensions.
fn has_extension(segment: &str) -> bool {
    segment.trim_start_matches('.').contains('.')
}

/// Split user input into URLs: one per line, trimmed, blank lines skipped.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
