//! Text heuristics shared by the built-in rules.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::component::Component;
use crate::config::MINIFY_SAVINGS_THRESHOLD;
use crate::utils::compile_regex_unsafe;

// Default ETag formats: Apache inode-size-mtime, IIS filetime:changenumber
const APACHE_ETAG_PATTERN: &str = r"^[0-9a-z]+-[0-9a-z]+-[0-9a-z]+$";
const IIS_ETAG_PATTERN: &str = r"^[0-9a-z]+:[0-9a-z]+$";
const WHITESPACE_PATTERN: &str = r"\n| {2}|\t|\r";

static APACHE_ETAG: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(APACHE_ETAG_PATTERN, "APACHE_ETAG"));
static IIS_ETAG: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(IIS_ETAG_PATTERN, "IIS_ETAG"));
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(WHITESPACE_PATTERN, "WHITESPACE_RUNS"));

/// Fills a message template for a count.
///
/// `%num%` becomes the number; `%are%`, `%s%` and `%do%` become `is`, empty
/// and `does` when the number is 1 and `are`, `s` and `do` otherwise.
///
/// ```
/// use pagegrade::plural;
///
/// assert_eq!(plural("There %are% %num% script%s%", 1), "There is 1 script");
/// assert_eq!(plural("There %are% %num% script%s%", 3), "There are 3 scripts");
/// ```
pub fn plural(template: &str, number: usize) -> String {
    let one = number == 1;
    template
        .replace("%are%", if one { "is" } else { "are" })
        .replace("%s%", if one { "" } else { "s" })
        .replace("%do%", if one { "does" } else { "do" })
        .replace("%num%", &number.to_string())
}

/// Number of `expression(` occurrences in a stylesheet.
pub fn count_expressions(css: &str) -> usize {
    css.matches("expression(").count()
}

/// AlphaImageLoader filters found in a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterCount {
    /// Plain `filter:` declarations
    pub normal: usize,
    /// `_filter:` declarations (IE6-only underscore hack)
    pub hack: usize,
}

impl FilterCount {
    pub fn total(&self) -> usize {
        self.normal + self.hack
    }
}

/// Counts `filter:` declarations whose value names `AlphaImageLoader`.
///
/// The value runs up to the next `;`; a declaration without one is ignored.
pub fn count_alpha_image_loader_filters(css: &str) -> FilterCount {
    const NEEDLE: &str = "filter:";
    let mut count = FilterCount::default();
    for (index, _) in css.match_indices(NEEDLE) {
        let is_hack = css[..index].ends_with('_');
        let value_start = index + NEEDLE.len();
        let Some(end) = css[value_start..].find(';') else {
            continue;
        };
        if css[value_start..value_start + end].contains("AlphaImageLoader") {
            if is_hack {
                count.hack += 1;
            } else {
                count.normal += 1;
            }
        }
    }
    count
}

/// Whether text looks minified.
///
/// Strips newlines, tabs, carriage returns and double spaces; if that saves
/// more than 20% of the length the text is not minified. Lengths are in
/// UTF-16 code units, as a browser measures script text. Empty text counts as
/// minified.
pub fn is_minified(text: &str) -> bool {
    let len = text.encode_utf16().count();
    if len == 0 {
        return true;
    }
    let stripped = WHITESPACE_RUNS.replace_all(text, "").encode_utf16().count();
    let savings = (len - stripped) as f64 / len as f64;
    savings <= MINIFY_SAVINGS_THRESHOLD
}

/// Whether an ETag avoids the server-default formats that embed
/// machine-specific data (Apache inode triples, IIS change numbers).
///
/// Missing ETags and unknown servers are always fine.
pub fn is_etag_good(etag: &str, server: &str) -> bool {
    if server.is_empty() || etag.is_empty() {
        return true;
    }
    let etag = etag.replace('"', "");
    if server.contains("Apache") && APACHE_ETAG.is_match(&etag) {
        return false;
    }
    if server.contains("IIS") && IIS_ETAG.is_match(&etag) {
        return false;
    }
    true
}

/// Host (with port, if any) of a URL, as the text between `//` and the next `/`.
///
/// Returns an empty string when the URL has no path after the authority.
pub fn hostname(url: &str) -> &str {
    let Some(slashes) = url.find("//") else {
        return "";
    };
    let authority = &url[slashes + 2..];
    match authority.find('/') {
        Some(end) => &authority[..end],
        None => "",
    }
}

/// Distinct host names of the components, in first-seen order.
///
/// Ports are dropped. With `exclude_ips`, hosts whose last label starts with a
/// digit (IPv4 literals) are left out.
pub fn unique_domains<'a, I>(components: I, exclude_ips: bool) -> Vec<String>
where
    I: IntoIterator<Item = &'a Component>,
{
    let mut seen = HashSet::new();
    let mut domains = Vec::new();
    for component in components {
        let Some(host) = component.url.split('/').nth(2).filter(|h| !h.is_empty()) else {
            continue;
        };
        let host = host.split(':').next().unwrap_or(host);
        if exclude_ips
            && host
                .rsplit('.')
                .next()
                .is_some_and(|label| label.starts_with(|c: char| c.is_ascii_digit()))
        {
            continue;
        }
        if seen.insert(host.to_string()) {
            domains.push(host.to_string());
        }
    }
    domains
}
