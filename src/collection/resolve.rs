//! URL validation and resolution for discovered resources.

use log::debug;
use url::Url;

use crate::config::IGNORED_SCHEMES;

/// Scheme prefix of a URL (text before the first `:`), lowercased.
///
/// Relative references have no scheme. A `:` appearing after a `/`, `?` or `#`
/// belongs to the path, not to a scheme.
fn scheme_of(url: &str) -> Option<String> {
    let colon = url.find(':')?;
    let prefix = &url[..colon];
    if prefix.is_empty() || prefix.contains(['/', '?', '#']) {
        return None;
    }
    Some(prefix.trim().to_ascii_lowercase())
}

/// Whether the URL uses a scheme that can be a page component.
pub fn has_allowed_scheme(url: &str) -> bool {
    match scheme_of(url) {
        Some(scheme) => !IGNORED_SCHEMES.contains(&scheme.as_str()),
        None => true,
    }
}

/// Whether an `http(s)` URL names a host. Other URLs always pass.
pub fn has_required_host(url: &str) -> bool {
    match scheme_of(url).as_deref() {
        Some("http") | Some("https") => {
            let colon = url.find(':').unwrap_or(0);
            let rest = &url[colon + 1..];
            match rest.strip_prefix("//") {
                Some(authority) => !authority.is_empty() && !authority.starts_with('/'),
                None => false,
            }
        }
        _ => true,
    }
}

/// Validates a discovered URL and resolves it against `base_href`.
///
/// # Arguments
///
/// * `url` - The URL as written in the page (may be relative)
/// * `base_href` - Absolute URL the reference appeared under
///
/// # Returns
///
/// The canonical absolute URL, or `None` if the URL uses an ignored scheme,
/// is an `http(s)` URL without a host, or cannot be resolved.
pub fn resolve_component_url(url: &str, base_href: &str) -> Option<String> {
    let url = url.trim();
    if !has_allowed_scheme(url) {
        debug!("Skipping URL with ignored scheme: {url}");
        return None;
    }
    if !has_required_host(url) {
        debug!("Skipping URL without host: {url}");
        return None;
    }

    if scheme_of(url).is_some() {
        return match Url::parse(url) {
            Ok(parsed) => Some(parsed.to_string()),
            Err(e) => {
                debug!("Skipping invalid URL {url}: {e}");
                None
            }
        };
    }

    match Url::parse(base_href).and_then(|base| base.join(url)) {
        Ok(resolved) => Some(resolved.to_string()),
        Err(e) => {
            debug!("Cannot resolve {url} against '{base_href}': {e}");
            None
        }
    }
}

/// Canonical form of an absolute URL; unparsable input is returned as is.
pub fn canonicalize(url: &str) -> String {
    Url::parse(url.trim())
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.trim().to_string())
}
