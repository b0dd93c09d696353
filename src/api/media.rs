//! Accept header negotiation.
//!
//! Runs once per request and reduces the client's Accept header to a
//! [`Negotiated`] value. Everything downstream branches on its `format` and
//! `hypermedia` fields instead of re-reading media type strings.

use thiserror::Error;

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml";
pub const TEXT_XML: &str = "text/xml";
pub const TEXT_CSV: &str = "text/csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Xml,
    Csv,
}

/// Result of content negotiation for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    /// Media type echoed back in the Content-Type header
    pub media_type: String,
    pub format: OutputFormat,
    pub hypermedia: bool,
}

impl Negotiated {
    pub fn new(media_type: impl Into<String>, format: OutputFormat, hypermedia: bool) -> Self {
        Self {
            media_type: media_type.into(),
            format,
            hypermedia,
        }
    }

    pub fn json() -> Self {
        Self::new(APPLICATION_JSON, OutputFormat::Json, false)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("Media type not present. Please add Accept header with the required media type.")]
    Missing,

    #[error("Accept header contains an invalid media type: {0}")]
    Malformed(String),

    #[error("None of the accepted media types are supported: {0}")]
    NotAcceptable(String),
}

/// Output media types a route can produce.
#[derive(Debug, Clone)]
pub struct SupportedMedia {
    hateoas: String,
    hateoas_xml: String,
    csv: bool,
}

impl SupportedMedia {
    /// JSON and XML, each with its vendor hypermedia variant.
    ///
    /// The XML vendor type is the JSON one with its `+json` suffix swapped
    /// for `+xml`.
    pub fn new(hateoas_media_type: impl Into<String>) -> Self {
        let hateoas = hateoas_media_type.into().to_ascii_lowercase();
        let hateoas_xml = match hateoas.strip_suffix("+json") {
            Some(stem) => format!("{}+xml", stem),
            None => format!("{}+xml", hateoas),
        };
        Self {
            hateoas,
            hateoas_xml,
            csv: false,
        }
    }

    pub fn with_csv(mut self) -> Self {
        self.csv = true;
        self
    }

    fn resolve(&self, media: &MediaRange) -> Option<Negotiated> {
        let essence = media.essence();
        if essence == self.hateoas {
            return Some(Negotiated::new(self.hateoas.clone(), OutputFormat::Json, true));
        }
        if essence == self.hateoas_xml {
            return Some(Negotiated::new(self.hateoas_xml.clone(), OutputFormat::Xml, true));
        }
        match (media.kind.as_str(), media.subtype.as_str()) {
            ("application", "json") | ("application", "*") | ("*", "*") => Some(Negotiated::json()),
            ("application", "xml") => Some(Negotiated::new(APPLICATION_XML, OutputFormat::Xml, false)),
            ("text", "xml") => Some(Negotiated::new(TEXT_XML, OutputFormat::Xml, false)),
            ("text", "csv") if self.csv => Some(Negotiated::new(TEXT_CSV, OutputFormat::Csv, false)),
            ("text", "*") if self.csv => Some(Negotiated::new(TEXT_CSV, OutputFormat::Csv, false)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MediaRange {
    kind: String,
    subtype: String,
    quality: f32,
}

impl MediaRange {
    fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(';').map(str::trim);
        let (kind, subtype) = parts.next()?.split_once('/')?;
        let (kind, subtype) = (kind.trim(), subtype.trim());
        if !is_token(kind) || !is_token(subtype) || (kind == "*" && subtype != "*") {
            return None;
        }

        let mut quality = 1.0;
        for param in parts {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("q") {
                quality = value.trim().parse::<f32>().ok().filter(|q| (0.0..=1.0).contains(q))?;
            }
        }

        Some(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            quality,
        })
    }

    fn essence(&self) -> String {
        format!("{}/{}", self.kind, self.subtype)
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+*".contains(c))
}

/// Pick the best supported media type from an Accept header value.
///
/// Entries are tried in descending quality order (ties keep header order);
/// `q=0` entries are never chosen.
pub fn negotiate(accept: Option<&str>, supported: &SupportedMedia) -> Result<Negotiated, NegotiationError> {
    let accept = accept
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or(NegotiationError::Missing)?;

    let mut ranges = Vec::new();
    for raw in accept.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        let range = MediaRange::parse(raw)
            .ok_or_else(|| NegotiationError::Malformed(raw.to_string()))?;
        ranges.push(range);
    }
    if ranges.is_empty() {
        return Err(NegotiationError::Malformed(accept.to_string()));
    }

    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
        .iter()
        .filter(|range| range.quality > 0.0)
        .find_map(|range| supported.resolve(range))
        .ok_or_else(|| NegotiationError::NotAcceptable(accept.to_string()))
}

/// Like [`negotiate`], but a missing header means JSON.
pub fn negotiate_or_json(accept: Option<&str>, supported: &SupportedMedia) -> Result<Negotiated, NegotiationError> {
    match negotiate(accept, supported) {
        Err(NegotiationError::Missing) => Ok(Negotiated::json()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HATEOAS: &str = "application/vnd.tnguyen.hateoas+json";

    fn employees() -> SupportedMedia {
        SupportedMedia::new(HATEOAS)
    }

    #[test]
    fn vendor_type_enables_hypermedia() {
        let n = negotiate(Some(HATEOAS), &employees()).unwrap();
        assert!(n.hypermedia);
        assert_eq!(n.format, OutputFormat::Json);
        assert_eq!(n.media_type, HATEOAS);
    }

    #[test]
    fn vendor_type_match_ignores_case() {
        let n = negotiate(Some("Application/Vnd.TNguyen.HATEOAS+json"), &employees()).unwrap();
        assert!(n.hypermedia);
    }

    #[test]
    fn plain_json_and_wildcards_are_not_hypermedia() {
        for accept in ["application/json", "*/*", "application/*", "text/html, */*;q=0.8"] {
            let n = negotiate(Some(accept), &employees()).unwrap();
            assert!(!n.hypermedia, "{}", accept);
            assert_eq!(n.media_type, APPLICATION_JSON);
        }
    }

    #[test]
    fn quality_values_order_preferences() {
        let accept = format!("application/json;q=0.5, {};q=0.9", HATEOAS);
        assert!(negotiate(Some(&accept), &employees()).unwrap().hypermedia);

        let accept = format!("application/json, {};q=0", HATEOAS);
        assert!(!negotiate(Some(&accept), &employees()).unwrap().hypermedia);
    }

    #[test]
    fn missing_and_malformed_headers_are_rejected() {
        assert_eq!(negotiate(None, &employees()), Err(NegotiationError::Missing));
        assert_eq!(negotiate(Some("  "), &employees()), Err(NegotiationError::Missing));
        assert!(matches!(
            negotiate(Some("json"), &employees()),
            Err(NegotiationError::Malformed(_))
        ));
        assert!(matches!(
            negotiate(Some("application/json;q=abc"), &employees()),
            Err(NegotiationError::Malformed(_))
        ));
    }

    #[test]
    fn xml_types_select_xml_output() {
        let n = negotiate(Some("application/xml"), &employees()).unwrap();
        assert_eq!(n.format, OutputFormat::Xml);
        assert!(!n.hypermedia);
        assert_eq!(n.media_type, APPLICATION_XML);

        assert_eq!(negotiate(Some("text/xml"), &employees()).unwrap().media_type, TEXT_XML);

        let n = negotiate(Some("application/vnd.tnguyen.hateoas+xml"), &employees()).unwrap();
        assert_eq!(n.format, OutputFormat::Xml);
        assert!(n.hypermedia);
        assert_eq!(n.media_type, "application/vnd.tnguyen.hateoas+xml");
    }

    #[test]
    fn unsupported_types_are_not_acceptable() {
        assert!(matches!(
            negotiate(Some("image/png"), &employees()),
            Err(NegotiationError::NotAcceptable(_))
        ));
        assert!(matches!(
            negotiate(Some("text/csv"), &employees()),
            Err(NegotiationError::NotAcceptable(_))
        ));
    }

    #[test]
    fn csv_is_offered_only_when_enabled() {
        let companies = SupportedMedia::new(HATEOAS).with_csv();
        let n = negotiate(Some("text/csv"), &companies).unwrap();
        assert_eq!(n.format, OutputFormat::Csv);
        assert_eq!(n.media_type, TEXT_CSV);
    }

    #[test]
    fn lenient_negotiation_defaults_to_json() {
        assert_eq!(negotiate_or_json(None, &employees()).unwrap(), Negotiated::json());
    }
}
