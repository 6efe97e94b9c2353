use tracing::{debug, warn};
use url::Url;

use crate::page::PageHandle;

/// Value written in place of any field that could not be located.
pub const NOT_FOUND: &str = "not found";

/// Drop line breaks and tabs, squeeze runs of spaces, trim.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars().filter(|c| !matches!(c, '\r' | '\n' | '\t')) {
        if c == ' ' && out.ends_with(' ') {
            continue;
        }
        out.push(c);
    }
    out.trim().to_string()
}

/// Normalized text of the first element matching `selector`, or
/// [`NOT_FOUND`]. Lookup failures are logged and swallowed.
pub fn extract_text<P: PageHandle>(page: &P, selector: &str) -> String {
    match page.query_text(selector) {
        Ok(Some(text)) => normalize_text(&text),
        Ok(None) => {
            debug!("no element matches {}", selector);
            NOT_FOUND.to_string()
        }
        Err(e) => {
            warn!("lookup of {} failed: {}", selector, e);
            NOT_FOUND.to_string()
        }
    }
}

/// First candidate that yields something other than [`NOT_FOUND`].
pub fn extract_first<P: PageHandle>(page: &P, candidates: &[&str]) -> String {
    candidates
        .iter()
        .map(|selector| extract_text(page, selector))
        .find(|value| value != NOT_FOUND)
        .unwrap_or_else(|| NOT_FOUND.to_string())
}

/// Every matched anchor's `href`, resolved against `base`.
pub fn extract_all<P: PageHandle>(page: &P, selector: &str, base: &Url) -> Vec<String> {
    let hrefs = match page.query_all_hrefs(selector) {
        Ok(hrefs) => hrefs,
        Err(e) => {
            warn!("lookup of {} failed: {}", selector, e);
            return Vec::new();
        }
    };

    hrefs
        .iter()
        .filter_map(|href| match base.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                debug!("unresolvable href {}: {}", href, e);
                None
            }
        })
        .collect()
}
