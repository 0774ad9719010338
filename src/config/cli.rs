//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

use super::types::{GradeOptions, LogFormat, LogLevel, OutputFormat};

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Grade a captured page with the default ruleset
/// pagegrade capture.json
///
/// # Small-site ruleset, JSON report
/// pagegrade capture.json --ruleset yblog --format json
///
/// # Count an in-house CDN
/// pagegrade capture.json --cdn-hostnames static.example.com,img.example.com
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "pagegrade",
    about = "Grades a captured web page against weighted performance rulesets."
)]
pub struct Cli {
    /// Captured page (JSON)
    #[arg(value_parser)]
    pub capture: PathBuf,

    /// Engine preferences file (JSON)
    #[arg(long, value_parser)]
    pub config: Option<PathBuf>,

    /// Ruleset id: ydefault|yslow1|yblog or a custom one
    #[arg(long)]
    pub ruleset: Option<String>,

    /// Custom rulesets file (JSON array or object)
    #[arg(long, value_parser)]
    pub custom_rulesets: Option<PathBuf>,

    /// Comma-separated host patterns that count as CDN
    #[arg(long)]
    pub cdn_hostnames: Option<String>,

    /// Keep negative rule scores instead of clamping them to zero
    #[arg(long)]
    pub allow_negative_score: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Report format: plain|json
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,
}

impl From<Cli> for GradeOptions {
    fn from(cli: Cli) -> Self {
        Self {
            capture: cli.capture,
            config_file: cli.config,
            ruleset: cli.ruleset,
            custom_rulesets: cli.custom_rulesets,
            cdn_hostnames: cli.cdn_hostnames,
            allow_negative_score: cli.allow_negative_score,
            log_level: cli.log_level,
            log_format: cli.log_format,
            output: cli.format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["pagegrade", "page.json"]).unwrap();
        let options = GradeOptions::from(cli);
        assert_eq!(options.capture, PathBuf::from("page.json"));
        assert!(options.ruleset.is_none());
        assert_eq!(options.output, OutputFormat::Plain);
        assert!(!options.allow_negative_score);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "pagegrade",
            "page.json",
            "--ruleset",
            "yblog",
            "--format",
            "json",
            "--cdn-hostnames",
            "a.net,b.net",
            "--allow-negative-score",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.ruleset.as_deref(), Some("yblog"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.allow_negative_score);
        assert_eq!(cli.cdn_hostnames.as_deref(), Some("a.net,b.net"));
    }

    #[test]
    fn test_cli_requires_capture() {
        assert!(Cli::try_parse_from(["pagegrade"]).is_err());
        assert!(Cli::try_parse_from(["pagegrade", "p.json", "--format", "xml"]).is_err());
    }
}
