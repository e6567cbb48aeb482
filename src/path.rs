//! Content path construction.
//!
//! A content path (`<project>/<slug>[_<w>x<h>].<format>`) is the key shared
//! by the generation API and the CDN. Paths are always computed before any
//! polling starts.

use url::Url;

use crate::error::{InlinerError, Result};
use crate::slug::slugify;

/// `_<width>x<height>` when both dimensions are known, otherwise empty.
pub fn dimension_suffix(width: Option<u32>, height: Option<u32>) -> String {
    match (width, height) {
        (Some(w), Some(h)) => format!("_{}x{}", w, h),
        _ => String::new(),
    }
}

/// True when `source` should be treated as a remote image URL.
pub fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Content path for a generation job.
///
/// If the generate endpoint echoed back a path, it wins verbatim (minus a
/// leading slash); otherwise the path is derived from project and slug.
pub fn for_generation(
    project: &str,
    slug: &str,
    width: Option<u32>,
    height: Option<u32>,
    format: &str,
    echoed: Option<&str>,
) -> String {
    if let Some(path) = echoed.map(|p| p.trim_start_matches('/')).filter(|p| !p.is_empty()) {
        return path.to_string();
    }
    format!(
        "{}/{}{}.{}",
        project.trim_matches('/'),
        slug,
        dimension_suffix(width, height),
        format
    )
}

/// Chain an edit onto an existing content path.
///
/// `web/cat.png` + "make it blue" at 100x100 becomes
/// `web/cat/make-it-blue_100x100.png`.
pub fn chain_edit(
    base_path: &str,
    instruction: &str,
    width: Option<u32>,
    height: Option<u32>,
    format: &str,
) -> String {
    let base = strip_extension(base_path.trim_matches('/'));
    format!(
        "{}/{}{}.{}",
        base,
        slugify(instruction),
        dimension_suffix(width, height),
        format
    )
}

/// Content path for editing an image addressed by URL.
///
/// Query string and fragment are dropped; only the URL path is chained.
pub fn for_remote_edit(
    source_url: &str,
    instruction: &str,
    width: Option<u32>,
    height: Option<u32>,
    format: &str,
) -> Result<String> {
    let url = Url::parse(source_url.trim()).map_err(|e| {
        InlinerError::Validation(format!("Invalid source URL {}: {}", source_url, e))
    })?;
    let path = url.path().trim_matches('/');
    if path.is_empty() {
        return Err(InlinerError::Validation(format!(
            "Source URL {} has no image path",
            source_url
        )));
    }
    Ok(chain_edit(path, instruction, width, height, format))
}

fn strip_extension(path: &str) -> &str {
    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..file_start + dot],
        _ => path,
    }
}
