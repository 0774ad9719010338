//! Component classification types.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Kind of page resource.
///
/// Serialized (and parsed) in lowercase: `doc`, `js`, `css`, `iframe`,
/// `flash`, `cssimage`, `image`, `favicon`, `xhr`, `redirect`, `font`,
/// `unknown`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Doc,
    Js,
    Css,
    Iframe,
    Flash,
    CssImage,
    Image,
    Favicon,
    Xhr,
    Redirect,
    Font,
    #[default]
    Unknown,
}

impl ComponentType {
    /// Classifies a `Content-Type` value.
    ///
    /// `text/html` and `text/plain` are documents, `text/css` is a stylesheet,
    /// and anything mentioning `javascript`, `flash`, `image` or `font` maps to
    /// that kind. Everything else is `unknown`.
    pub fn from_mime(content_type: &str) -> Self {
        let mime = content_type.to_ascii_lowercase();
        if mime.starts_with("text/html") || mime.starts_with("text/plain") {
            ComponentType::Doc
        } else if mime.starts_with("text/css") {
            ComponentType::Css
        } else if mime.contains("javascript") {
            ComponentType::Js
        } else if mime.contains("flash") {
            ComponentType::Flash
        } else if mime.contains("image") {
            ComponentType::Image
        } else if mime.contains("font") {
            ComponentType::Font
        } else {
            ComponentType::Unknown
        }
    }

    /// Whether the fetcher should treat the resource as an image.
    pub fn is_image(&self) -> bool {
        self.as_ref().contains("image")
    }
}

/// Transfer compression reported by `Content-Encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Deflate,
}

impl Compression {
    /// Parses a `Content-Encoding` value; unknown encodings count as none.
    pub fn from_header(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("gzip") {
            Compression::Gzip
        } else if value.eq_ignore_ascii_case("deflate") {
            Compression::Deflate
        } else {
            Compression::None
        }
    }

    pub fn is_compressed(&self) -> bool {
        *self != Compression::None
    }
}

/// Size declared by the markup for an element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHint {
    pub width: u32,
    pub height: u32,
}

/// Declared versus decoded dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectProps {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub actual_width: Option<u32>,
    pub actual_height: Option<u32>,
}

impl ObjectProps {
    /// True when the image is rendered smaller than it was delivered.
    pub fn is_scaled_down(&self) -> bool {
        let narrower = matches!((self.width, self.actual_width), (Some(w), Some(aw)) if w < aw);
        let shorter = matches!((self.height, self.actual_height), (Some(h), Some(ah)) if h < ah);
        narrower || shorter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_from_mime() {
        assert_eq!(ComponentType::from_mime("text/html; charset=utf-8"), ComponentType::Doc);
        assert_eq!(ComponentType::from_mime("text/plain"), ComponentType::Doc);
        assert_eq!(ComponentType::from_mime("text/css"), ComponentType::Css);
        assert_eq!(ComponentType::from_mime("application/x-javascript"), ComponentType::Js);
        assert_eq!(ComponentType::from_mime("application/x-shockwave-flash"), ComponentType::Flash);
        assert_eq!(ComponentType::from_mime("image/png"), ComponentType::Image);
        assert_eq!(ComponentType::from_mime("font/woff2"), ComponentType::Font);
        assert_eq!(ComponentType::from_mime("application/json"), ComponentType::Unknown);
    }

    #[test]
    fn test_type_names_round_trip() {
        assert_eq!(ComponentType::CssImage.to_string(), "cssimage");
        assert_eq!(ComponentType::from_str("cssimage"), Ok(ComponentType::CssImage));
        assert_eq!(ComponentType::from_str("JS"), Ok(ComponentType::Js));
        assert!(ComponentType::from_str("stylesheet").is_err());
        assert_eq!(
            serde_json::to_string(&ComponentType::Favicon).expect("serializable"),
            "\"favicon\""
        );
    }

    #[test]
    fn test_is_image() {
        assert!(ComponentType::Image.is_image());
        assert!(ComponentType::CssImage.is_image());
        assert!(!ComponentType::Favicon.is_image());
    }

    #[test]
    fn test_compression_from_header() {
        assert_eq!(Compression::from_header("gzip"), Compression::Gzip);
        assert_eq!(Compression::from_header(" Deflate "), Compression::Deflate);
        assert_eq!(Compression::from_header("br"), Compression::None);
    }

    #[test]
    fn test_scaled_down() {
        let props = ObjectProps {
            width: Some(100),
            height: Some(100),
            actual_width: Some(200),
            actual_height: Some(100),
        };
        assert!(props.is_scaled_down());
        let props = ObjectProps {
            width: Some(200),
            ..props
        };
        assert!(!props.is_scaled_down());
        assert!(!ObjectProps::default().is_scaled_down());
    }
}
