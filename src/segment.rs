//! Route template segments
//!
//! A route template like `/posts/:post_id/files/*path` breaks into segments
//! at `/` boundaries. Each segment knows which characters it consumes in the
//! recognition automaton, which extraction-regex fragment it contributes, and
//! how to render itself back into a concrete path during URL generation.

use crate::automaton::{CharClass, CharSpec};
use crate::params::RouteParams;
use std::fmt;

/// One syntactic unit of a route template.
///
/// Immutable once parsed. Concatenating a template's segments positionally
/// reproduces the template, modulo leading/trailing slash normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text that must match exactly
    Static { literal: String },
    /// `:name` - captures a single path component into `name`
    Dynamic { name: String },
    /// `*name` - captures the remainder of the path, including `/`, into `name`
    Star { name: String },
    /// An empty or `/`-only template; consumes nothing
    Epsilon,
}

impl Segment {
    /// Parse a full route template into segments.
    ///
    /// A template with no non-empty pieces (`""` or `"/"`) parses to the
    /// single [`Segment::Epsilon`].
    ///
    /// # Example
    ///
    /// ```
    /// use waymark::segment::Segment;
    ///
    /// let segments = Segment::parse_template("/posts/:post_id");
    /// assert_eq!(segments.len(), 2);
    /// assert_eq!(segments[1], Segment::Dynamic { name: "post_id".to_string() });
    /// ```
    pub fn parse_template(template: &str) -> Vec<Segment> {
        let segments: Vec<Segment> = template
            .split('/')
            .filter(|piece| !piece.is_empty())
            .map(Segment::parse_piece)
            .collect();

        if segments.is_empty() {
            vec![Segment::Epsilon]
        } else {
            segments
        }
    }

    /// Classify a single between-slashes piece
    fn parse_piece(piece: &str) -> Segment {
        if let Some(name) = piece.strip_prefix(':') {
            Segment::Dynamic {
                name: name.to_string(),
            }
        } else if let Some(name) = piece.strip_prefix('*') {
            Segment::Star {
                name: name.to_string(),
            }
        } else {
            Segment::Static {
                literal: piece.to_string(),
            }
        }
    }

    /// Name of the captured parameter, if this segment captures one
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Dynamic { name } | Segment::Star { name } => Some(name),
            _ => None,
        }
    }

    /// Whether this segment contributes a capture group
    pub fn is_capturing(&self) -> bool {
        self.param_name().is_some()
    }

    /// Automaton states this segment contributes, in consumption order.
    ///
    /// Static segments contribute one single-character state per character.
    /// Dynamic and star segments contribute a single repeating state that
    /// consumes a run of characters (everything but `/` for dynamic,
    /// everything for star). Epsilon contributes nothing.
    pub fn char_specs(&self) -> Vec<CharSpec> {
        match self {
            Segment::Static { literal } => literal
                .chars()
                .map(|ch| CharSpec {
                    class: CharClass::OneOf(ch.to_string()),
                    repeat: false,
                })
                .collect(),
            Segment::Dynamic { .. } => vec![CharSpec {
                class: CharClass::AnyExcept("/".to_string()),
                repeat: true,
            }],
            Segment::Star { .. } => vec![CharSpec {
                class: CharClass::AnyExcept(String::new()),
                repeat: true,
            }],
            Segment::Epsilon => Vec::new(),
        }
    }

    /// Extraction-regex fragment for this segment.
    ///
    /// Capture groups align 1:1 with capturing segments along a route, so
    /// dynamic and star segments emit capturing groups and static segments
    /// emit their escaped literal.
    pub fn regex_fragment(&self) -> String {
        match self {
            Segment::Static { literal } => regex::escape(literal),
            Segment::Dynamic { .. } => "([^/]+)".to_string(),
            Segment::Star { .. } => "(.+)".to_string(),
            Segment::Epsilon => String::new(),
        }
    }

    /// Render this segment into a generated path.
    ///
    /// Returns `None` when a required parameter is absent; the caller maps
    /// that to the missing-param error with route context attached.
    pub fn generate(&self, params: &RouteParams) -> Option<String> {
        match self {
            Segment::Static { literal } => Some(literal.clone()),
            Segment::Dynamic { name } | Segment::Star { name } => {
                params.get(name).map(|v| v.to_string())
            }
            Segment::Epsilon => Some(String::new()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Static { literal } => write!(f, "{}", literal),
            Segment::Dynamic { name } => write!(f, ":{}", name),
            Segment::Star { name } => write!(f, "*{}", name),
            Segment::Epsilon => Ok(()),
        }
    }
}

/// Segment-kind counts of one composed route chain.
///
/// Recognition prefers the accepting state whose chain relies least on
/// wildcard-like segments: fewest stars first, then fewest dynamics, with
/// more statics winning otherwise. Counts compare across the full chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Specificity {
    pub statics: usize,
    pub dynamics: usize,
    pub stars: usize,
}

impl Specificity {
    /// Tally counts over a segment list, accumulating into `self`
    pub fn tally(&mut self, segments: &[Segment]) {
        for segment in segments {
            match segment {
                Segment::Static { .. } => self.statics += 1,
                Segment::Dynamic { .. } => self.dynamics += 1,
                Segment::Star { .. } => self.stars += 1,
                Segment::Epsilon => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_static() {
        let segments = Segment::parse_template("/posts");
        assert_eq!(
            segments,
            vec![Segment::Static {
                literal: "posts".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_dynamic_and_star() {
        let segments = Segment::parse_template("/posts/:post_id/files/*path");
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[1].param_name(), Some("post_id"));
        assert_eq!(segments[3].param_name(), Some("path"));
        assert!(matches!(segments[3], Segment::Star { .. }));
    }

    #[test]
    fn test_parse_epsilon() {
        assert_eq!(Segment::parse_template(""), vec![Segment::Epsilon]);
        assert_eq!(Segment::parse_template("/"), vec![Segment::Epsilon]);
    }

    #[test]
    fn test_template_round_trip() {
        let template = "posts/:post_id/files/*path";
        let segments = Segment::parse_template(template);
        let rebuilt: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        assert_eq!(rebuilt.join("/"), template);
    }

    #[test]
    fn test_regex_fragments() {
        let segments = Segment::parse_template("/a.b/:id/*rest");
        assert_eq!(segments[0].regex_fragment(), "a\\.b");
        assert_eq!(segments[1].regex_fragment(), "([^/]+)");
        assert_eq!(segments[2].regex_fragment(), "(.+)");
    }

    #[test]
    fn test_char_specs() {
        let statics = Segment::parse_template("/ab")[0].char_specs();
        assert_eq!(statics.len(), 2);
        assert!(!statics[0].repeat);

        let dynamic = Segment::parse_template("/:id")[0].char_specs();
        assert_eq!(dynamic.len(), 1);
        assert!(dynamic[0].repeat);
        assert_eq!(dynamic[0].class, CharClass::AnyExcept("/".to_string()));

        let star = Segment::parse_template("/*rest")[0].char_specs();
        assert_eq!(star[0].class, CharClass::AnyExcept(String::new()));

        assert!(Segment::Epsilon.char_specs().is_empty());
    }

    #[test]
    fn test_generate() {
        let params = RouteParams::from_pairs([("id", "42")]);
        let segments = Segment::parse_template("/posts/:id");

        assert_eq!(segments[0].generate(&params), Some("posts".to_string()));
        assert_eq!(segments[1].generate(&params), Some("42".to_string()));

        let missing = RouteParams::new();
        assert_eq!(segments[1].generate(&missing), None);
    }

    #[test]
    fn test_specificity_tally() {
        let mut spec = Specificity::default();
        spec.tally(&Segment::parse_template("/posts/:id"));
        spec.tally(&Segment::parse_template("/files/*rest"));

        assert_eq!(spec.statics, 2);
        assert_eq!(spec.dynamics, 1);
        assert_eq!(spec.stars, 1);
    }
}
