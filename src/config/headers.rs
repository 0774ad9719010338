//! HTTP header names inspected by the component model and the rules.
//!
//! Lookups through [`crate::component::Headers`] are ASCII case-insensitive, so these
//! constants only fix the canonical spelling.

/// Redirect target.
pub const HEADER_LOCATION: &str = "Location";
/// Declared (possibly compressed) body length.
pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";
/// Transfer compression (`gzip`, `deflate`).
pub const HEADER_CONTENT_ENCODING: &str = "Content-Encoding";
/// Response MIME type.
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
/// Absolute expiry date.
pub const HEADER_EXPIRES: &str = "Expires";
/// Cache directives (`max-age`, `no-cache`, `no-store`).
pub const HEADER_CACHE_CONTROL: &str = "Cache-Control";
/// Entity tag.
pub const HEADER_ETAG: &str = "ETag";
/// Last modification date of the resource.
pub const HEADER_LAST_MODIFIED: &str = "Last-Modified";
/// Cookies set by the response. Multiple values are joined with a newline.
pub const HEADER_SET_COOKIE: &str = "Set-Cookie";
/// Origin server software, used by the ETag heuristics.
pub const HEADER_SERVER: &str = "Server";
