//! # Content Negotiation
//!
//! Picks an [`Output`] for a request from its `Accept` header.
//!
//! Each offered media type takes the quality of the most specific range
//! that matches it (`text/html` before `text/*` before `*/*`). A quality of
//! zero rules the offer out. The highest quality wins and ties go to the
//! offer registered first.
//!
//! ```rust
//! use trellis_std::output::Accept;
//!
//! let accept = Accept::parse("text/*;q=0.5, application/json");
//! assert_eq!(
//!     accept.best_match(["text/html", "application/json"]),
//!     Some("application/json")
//! );
//! ```

use super::Output;
use serde::Deserialize;
use trellis_core::DispatchError;

/// What to do when a request has no `Accept` header, or an empty one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentAccept {
    /// Nothing is acceptable; negotiation fails.
    #[default]
    Reject,
    /// Anything is acceptable; the first offered type is used.
    AcceptAny,
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    kind: String,
    subtype: String,
    quality: f32,
}

impl MediaRange {
    /// Parse a single range such as `text/html;level=1;q=0.7`.
    ///
    /// Parameters other than `q` are ignored; a `q` that is not a number
    /// between 0 and 1 counts as 1. A bare `*` is read as `*/*`.
    pub fn parse(entry: &str) -> Option<Self> {
        let mut parts = entry.split(';');
        let essence = parts.next()?.trim().to_ascii_lowercase();
        let (kind, subtype) = match essence.split_once('/') {
            Some((kind, subtype)) => (kind.trim().to_string(), subtype.trim().to_string()),
            None if essence == "*" => ("*".to_string(), "*".to_string()),
            None => return None,
        };
        if kind.is_empty() || subtype.is_empty() || (kind == "*" && subtype != "*") {
            return None;
        }

        let quality = parts
            .filter_map(|param| param.split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
            .and_then(|(_, value)| value.trim().parse::<f32>().ok())
            .filter(|q| (0.0..=1.0).contains(q))
            .unwrap_or(1.0);

        Some(Self {
            kind,
            subtype,
            quality,
        })
    }

    /// The range's quality weight.
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// How specific the range is: 2 for `type/subtype`, 1 for `type/*`, 0 for `*/*`.
    pub fn specificity(&self) -> u8 {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }

    /// Returns true when `media_type` falls within this range.
    pub fn matches(&self, media_type: &str) -> bool {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        let Some((kind, subtype)) = essence.split_once('/') else {
            return false;
        };
        (self.kind == "*" || self.kind.eq_ignore_ascii_case(kind))
            && (self.subtype == "*" || self.subtype.eq_ignore_ascii_case(subtype))
    }
}

/// A parsed `Accept` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accept {
    ranges: Vec<MediaRange>,
}

impl Accept {
    /// Parse a header value, skipping malformed entries.
    pub fn parse(header: &str) -> Self {
        Self {
            ranges: header.split(',').filter_map(MediaRange::parse).collect(),
        }
    }

    /// The parsed ranges in header order.
    pub fn ranges(&self) -> &[MediaRange] {
        &self.ranges
    }

    /// The quality of `media_type`, or `None` when no range covers it.
    pub fn quality_of(&self, media_type: &str) -> Option<f32> {
        self.weight_of(media_type).map(|(quality, _)| quality)
    }

    /// The quality of `media_type` and the specificity of the range that set it.
    fn weight_of(&self, media_type: &str) -> Option<(f32, u8)> {
        let matching = self.ranges.iter().filter(|range| range.matches(media_type));
        let specificity = matching.clone().map(MediaRange::specificity).max()?;
        matching
            .filter(|range| range.specificity() == specificity)
            .map(MediaRange::quality)
            .reduce(f32::max)
            .map(|quality| (quality, specificity))
    }

    /// The acceptable offer with the highest quality.
    ///
    /// Equal qualities go to the offer named by the more specific range, so
    /// `application/json` beats an offer that only `*/*` covers. Full ties go
    /// to the earliest offer.
    pub fn best_match<'o, I>(&self, offers: I) -> Option<&'o str>
    where
        I: IntoIterator<Item = &'o str>,
    {
        let mut best: Option<(&'o str, f32, u8)> = None;
        for offer in offers {
            let Some((quality, specificity)) = self.weight_of(offer).filter(|(q, _)| *q > 0.0)
            else {
                continue;
            };
            let better = best.is_none_or(|(_, top, top_specificity)| {
                quality > top || (quality == top && specificity > top_specificity)
            });
            if better {
                best = Some((offer, quality, specificity));
            }
        }
        best.map(|(offer, _, _)| offer)
    }
}

/// The negotiated output and media type.
#[derive(Debug, Clone)]
pub struct Selected<'a> {
    /// The first output declaring the negotiated media type.
    pub output: &'a Output,
    /// The negotiated media type.
    pub media_type: String,
}

/// Selects outputs for requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Negotiator {
    absent: AbsentAccept,
}

impl Negotiator {
    /// A negotiator with the given policy for missing headers.
    pub fn new(absent: AbsentAccept) -> Self {
        Self { absent }
    }

    /// The policy for missing headers.
    pub fn absent_policy(&self) -> AbsentAccept {
        self.absent
    }

    /// Pick the output for `accept` among `outputs`.
    pub fn select<'a>(
        &self,
        accept: Option<&str>,
        outputs: &'a [Output],
    ) -> Result<Selected<'a>, DispatchError> {
        let mut offered: Vec<&'a str> = Vec::new();
        for media_type in outputs.iter().flat_map(Output::media_types) {
            if !offered.iter().any(|seen| seen.eq_ignore_ascii_case(media_type)) {
                offered.push(media_type);
            }
        }

        let header = accept.map(str::trim).filter(|header| !header.is_empty());
        let chosen = match (header, self.absent) {
            (Some(header), _) => Accept::parse(header).best_match(offered.iter().copied()),
            (None, AbsentAccept::AcceptAny) => offered.first().copied(),
            (None, AbsentAccept::Reject) => None,
        };

        let no_output = || DispatchError::NoOutputHandler {
            accept: header.unwrap_or_default().to_string(),
            offered: offered.iter().map(|m| m.to_string()).collect(),
        };

        let media_type = chosen.ok_or_else(no_output)?;
        let output = outputs
            .iter()
            .find(|output| output.responds_to(media_type))
            .ok_or_else(no_output)?;

        Ok(Selected {
            output,
            media_type: media_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{json, template};

    #[test]
    fn test_parse_ranges() {
        let accept = Accept::parse("text/html;level=1;q=0.7, application/*, */*;q=0.1, garbage");
        assert_eq!(accept.ranges().len(), 3);
        assert_eq!(accept.ranges()[0].quality(), 0.7);
        assert_eq!(accept.ranges()[1].specificity(), 1);
        assert_eq!(accept.ranges()[2].specificity(), 0);
    }

    #[test]
    fn test_invalid_quality_counts_as_one() {
        let range = MediaRange::parse("text/html;q=abc").unwrap();
        assert_eq!(range.quality(), 1.0);
        let range = MediaRange::parse("text/html;q=7").unwrap();
        assert_eq!(range.quality(), 1.0);
    }

    #[test]
    fn test_most_specific_range_sets_quality() {
        let accept = Accept::parse("text/*;q=0.3, text/html;q=0.7, */*;q=0.5");
        assert_eq!(accept.quality_of("text/html"), Some(0.7));
        assert_eq!(accept.quality_of("text/plain"), Some(0.3));
        assert_eq!(accept.quality_of("image/png"), Some(0.5));
        assert_eq!(Accept::parse("text/html").quality_of("image/png"), None);
    }

    #[test]
    fn test_higher_quality_wins() {
        let accept = Accept::parse("application/json;q=0.4, text/html;q=0.9");
        assert_eq!(
            accept.best_match(["application/json", "text/html"]),
            Some("text/html")
        );
    }

    #[test]
    fn test_tie_goes_to_first_offer() {
        let accept = Accept::parse("*/*");
        assert_eq!(
            accept.best_match(["application/json", "text/html"]),
            Some("application/json")
        );
    }

    #[test]
    fn test_named_type_beats_wildcard_at_equal_quality() {
        let accept = Accept::parse("application/json, text/plain, */*");
        assert_eq!(
            accept.best_match(["text/html", "application/json"]),
            Some("application/json")
        );

        // A higher quality still outranks specificity.
        let accept = Accept::parse("application/json;q=0.5, */*");
        assert_eq!(
            accept.best_match(["application/json", "text/html"]),
            Some("text/html")
        );
    }

    #[test]
    fn test_zero_quality_excludes() {
        let accept = Accept::parse("application/json;q=0, */*");
        assert_eq!(
            accept.best_match(["application/json", "text/html"]),
            Some("text/html")
        );
        assert_eq!(accept.best_match(["application/json"]), None);
    }

    #[test]
    fn test_select_json() {
        let outputs = [template(), json()];
        let selected = Negotiator::default()
            .select(Some("application/json"), &outputs)
            .unwrap();
        assert_eq!(selected.output.name(), "json");
        assert_eq!(selected.media_type, "application/json");

        let selected = Negotiator::default()
            .select(Some("application/javascript"), &outputs)
            .unwrap();
        assert_eq!(selected.output.name(), "json");
    }

    #[test]
    fn test_select_unregistered_type() {
        let outputs = [json()];
        let err = Negotiator::default()
            .select(Some("image/png"), &outputs)
            .unwrap_err();
        match err {
            DispatchError::NoOutputHandler { accept, offered } => {
                assert_eq!(accept, "image/png");
                assert_eq!(offered, vec!["application/json", "application/javascript"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_absent_header_policy() {
        let outputs = [json(), template()];
        for header in [None, Some(""), Some("   ")] {
            let err = Negotiator::new(AbsentAccept::Reject)
                .select(header, &outputs)
                .unwrap_err();
            assert!(matches!(err, DispatchError::NoOutputHandler { .. }));

            let selected = Negotiator::new(AbsentAccept::AcceptAny)
                .select(header, &outputs)
                .unwrap();
            assert_eq!(selected.media_type, "application/json");
        }
    }

    #[test]
    fn test_no_outputs() {
        let err = Negotiator::new(AbsentAccept::AcceptAny)
            .select(Some("*/*"), &[])
            .unwrap_err();
        assert!(err.is_output_error());
    }

    #[test]
    fn test_absent_accept_from_config_text() {
        #[derive(Deserialize)]
        struct Holder {
            absent: AbsentAccept,
        }
        let holder: Holder = serde_json::from_str(r#"{"absent": "accept_any"}"#).unwrap();
        assert_eq!(holder.absent, AbsentAccept::AcceptAny);
    }
}
