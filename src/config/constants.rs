//! Engine constants.
//!
//! Defaults for the preference knobs plus the fixed thresholds used by the
//! component model and the built-in rules.

/// Identifier of the built-in ruleset used when nothing else is selected.
pub const DEFAULT_RULESET_ID: &str = "ydefault";

/// Weight used when neither the ruleset nor the default ruleset carries a
/// usable weight for a rule.
pub const DEFAULT_RULE_WEIGHT: u32 = 5;

/// Largest weight a ruleset may assign to a rule.
pub const MAX_RULE_WEIGHT: u32 = 100;

/// Minimum lifetime (seconds) for an expiry to count as "far future" (2 days).
pub const DEFAULT_MIN_FUTURE_EXPIRES_SECS: i64 = 172_800;

/// A `Last-Modified` date older than this (milliseconds) is considered stable.
pub const OLD_MODIFIED_THRESHOLD_MS: i64 = 24 * 60 * 60 * 1000;

/// Compressed-size estimate divisor when the network layer reports nothing.
pub const COMPRESSION_RATIO_ESTIMATE: u64 = 3;

/// Whitespace savings above this fraction mean a file is not minified.
pub const MINIFY_SAVINGS_THRESHOLD: f64 = 0.2;

/// Images narrower and shorter than this (pixels) are beacons.
pub const BEACON_MAX_DIMENSION: u32 = 2;

/// URL schemes that never become components.
pub const IGNORED_SCHEMES: [&str; 6] = ["data", "chrome", "javascript", "about", "resource", "jar"];

/// Score reported for rules that do not apply to the page.
pub const NOT_APPLICABLE_SCORE: i64 = -1;
