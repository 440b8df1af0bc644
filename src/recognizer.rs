//! Path pattern compiler and matcher
//!
//! [`RouteRecognizer`] is the public surface over the recognition automaton:
//! composed route chains go in via [`RouteRecognizer::add`], concrete paths
//! are recognized into ordered handler matches, and named routes generate
//! concrete paths back out of a parameter bag.

use crate::automaton::{Accept, Automaton, CharSpec, HandlerEntry, StateId};
use crate::error::RouterError;
use crate::params::{QueryParams, RouteParams};
use crate::segment::{Segment, Specificity};
use crate::{debug_log, trace_log, HandlerMatch, Recognition};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One route of a composed chain: a path template and its handler name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    /// Path template (`/posts`, `:post_id`, `*path`, or empty for index)
    pub path: String,
    /// Name of the handler activated when this route matches
    pub handler: String,
}

impl RouteDef {
    /// Create a route definition
    pub fn new(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            handler: handler.into(),
        }
    }
}

/// Segment list and handler chain stored for URL generation
#[derive(Debug, Clone)]
struct NamedRoute {
    segments: Vec<Segment>,
    handlers: Vec<HandlerEntry>,
}

/// Compiles route templates into a recognition automaton and supports both
/// recognition (path string to handler matches) and generation (name plus
/// params to path string).
///
/// Both the automaton and the named-route map are built up front by `add`
/// calls and never change during recognition.
///
/// # Example
///
/// ```
/// use waymark::recognizer::{RouteDef, RouteRecognizer};
/// use waymark::RouteParams;
///
/// let mut recognizer = RouteRecognizer::new();
/// recognizer.add(
///     &[
///         RouteDef::new("/posts", "posts"),
///         RouteDef::new("/:post_id", "post"),
///     ],
///     Some("post"),
/// );
///
/// let recognition = recognizer.recognize("/posts/42").unwrap();
/// assert_eq!(recognition.matches[1].params.get("post_id"), Some("42"));
///
/// let params = RouteParams::from_pairs([("post_id", "42")]);
/// assert_eq!(recognizer.generate("post", &params).unwrap(), "/posts/42");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteRecognizer {
    automaton: Automaton,
    names: HashMap<String, NamedRoute>,
}

impl RouteRecognizer {
    /// Create an empty recognizer
    pub fn new() -> Self {
        Self {
            automaton: Automaton::new(),
            names: HashMap::new(),
        }
    }

    /// Register a composed route chain, ancestors first.
    ///
    /// Each path parses into segments; the automaton is walked/extended with
    /// a literal `/` boundary before every non-epsilon segment. The terminal
    /// state receives the chain's handler stack and an anchored extraction
    /// regex spanning the whole chain. With `name` given, the segment list
    /// and handler chain are also stored for [`Self::generate`] and
    /// [`Self::handlers_for`].
    pub fn add(&mut self, chain: &[RouteDef], name: Option<&str>) {
        let mut state = self.automaton.root();
        let mut pattern = String::from("^");
        let mut specificity = Specificity::default();
        let mut handlers: Vec<HandlerEntry> = Vec::with_capacity(chain.len());
        let mut all_segments: Vec<Segment> = Vec::new();
        let mut is_empty = true;

        for route in chain {
            let segments = Segment::parse_template(&route.path);
            let param_names: Vec<String> = segments
                .iter()
                .filter_map(|s| s.param_name().map(str::to_string))
                .collect();
            specificity.tally(&segments);

            for segment in &segments {
                if matches!(segment, Segment::Epsilon) {
                    continue;
                }
                is_empty = false;

                // Every segment is preceded by a '/' boundary transition.
                state = self.automaton.put(state, &CharSpec::literal('/'));
                pattern.push('/');

                for spec in segment.char_specs() {
                    state = self.automaton.put(state, &spec);
                }
                pattern.push_str(&segment.regex_fragment());
            }

            handlers.push(HandlerEntry {
                name: route.handler.clone(),
                param_names,
            });
            all_segments.extend(segments);
        }

        // A chain of nothing but epsilon segments is the root path.
        if is_empty {
            state = self.automaton.put(state, &CharSpec::literal('/'));
            pattern.push('/');
        }
        pattern.push('$');

        let regex =
            Regex::new(&pattern).expect("segment fragments always form a valid pattern");

        debug_log!(
            "registered chain of {} handlers, pattern '{}', {} automaton states",
            handlers.len(),
            pattern,
            self.automaton.len()
        );

        if let Some(name) = name {
            self.names.insert(
                name.to_string(),
                NamedRoute {
                    segments: all_segments,
                    handlers: handlers.clone(),
                },
            );
        }

        self.automaton.set_accept(
            state,
            Accept {
                regex,
                handlers,
                specificity,
            },
        );
    }

    /// Recognize a concrete path into ordered handler matches.
    ///
    /// The path is normalized to a single leading `/` with no trailing `/`
    /// (except root); a `?query` tail is split off and parsed. Returns
    /// `None` when no accepting state is reached - never a panic.
    pub fn recognize(&self, path: &str) -> Option<Recognition> {
        let (path, query) = match path.find('?') {
            Some(at) => (&path[..at], QueryParams::parse(&path[at + 1..])),
            None => (path, QueryParams::new()),
        };

        let mut normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let mut slash_dropped = false;
        if normalized.len() > 1 && normalized.ends_with('/') {
            normalized.pop();
            slash_dropped = true;
        }

        let mut states: Vec<StateId> = vec![self.automaton.root()];
        for ch in normalized.chars() {
            states = self.automaton.advance(&states, ch);
            trace_log!("'{}' leaves {} live states", ch, states.len());
            if states.is_empty() {
                break;
            }
        }

        let mut solutions: Vec<&Accept> = states
            .iter()
            .filter_map(|&id| self.automaton.accept(id))
            .collect();
        // Stable sort: equally-specific competitors keep their existing order.
        solutions.sort_by(|a, b| compare_specificity(&a.specificity, &b.specificity));
        let accept = solutions.first()?;

        // A dropped trailing slash belongs to a star capture.
        let mut extract_from = normalized;
        if slash_dropped && accept.regex.as_str().ends_with("(.+)$") {
            extract_from.push('/');
        }

        let captures = accept.regex.captures(&extract_from)?;
        let mut matches = Vec::with_capacity(accept.handlers.len());
        let mut capture_index = 1;
        for entry in &accept.handlers {
            let mut values = Vec::with_capacity(entry.param_names.len());
            for _ in &entry.param_names {
                values.push(captures.get(capture_index).map_or("", |m| m.as_str()));
                capture_index += 1;
            }
            matches.push(HandlerMatch {
                handler: entry.name.clone(),
                params: RouteParams::from_captures(&entry.param_names, values),
                is_dynamic: !entry.param_names.is_empty(),
            });
        }

        debug_log!("recognized '{}' as {} handlers", extract_from, matches.len());
        Some(Recognition { matches, query })
    }

    /// Generate a concrete path for a named route from a parameter bag.
    ///
    /// The inverse of [`Self::recognize`] for every registered named route.
    pub fn generate(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
        let route = self
            .names
            .get(name)
            .ok_or_else(|| RouterError::UnknownRouteName {
                name: name.to_string(),
            })?;

        let mut output = String::new();
        for segment in &route.segments {
            if matches!(segment, Segment::Epsilon) {
                continue;
            }
            output.push('/');
            let piece = segment
                .generate(params)
                .ok_or_else(|| RouterError::MissingParam {
                    name: segment.param_name().unwrap_or_default().to_string(),
                    route: name.to_string(),
                })?;
            output.push_str(&piece);
        }

        if output.is_empty() {
            output.push('/');
        }
        Ok(output)
    }

    /// The stored ancestor chain of a named route.
    ///
    /// Lets the transition engine know which handlers a named transition
    /// will touch before any path string exists.
    pub fn handlers_for(&self, name: &str) -> Result<&[HandlerEntry], RouterError> {
        self.names
            .get(name)
            .map(|route| route.handlers.as_slice())
            .ok_or_else(|| RouterError::UnknownRouteName {
                name: name.to_string(),
            })
    }

    /// Whether a named route is registered
    pub fn has_route(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Number of automaton states.
    ///
    /// Stays proportional to distinct segment alternatives because state
    /// construction is idempotent; shared prefixes reuse their states.
    pub fn node_count(&self) -> usize {
        self.automaton.len()
    }
}

/// Order accepting states most-specific first.
///
/// Fewest stars wins; among star routes, more statics then more dynamics
/// win; then fewest dynamics; then most statics. Equal counts compare equal,
/// so a stable sort keeps the existing order of equally-specific routes.
fn compare_specificity(a: &Specificity, b: &Specificity) -> Ordering {
    if a.stars != b.stars {
        return a.stars.cmp(&b.stars);
    }
    if a.stars > 0 {
        if a.statics != b.statics {
            return b.statics.cmp(&a.statics);
        }
        if a.dynamics != b.dynamics {
            return b.dynamics.cmp(&a.dynamics);
        }
    }
    if a.dynamics != b.dynamics {
        return a.dynamics.cmp(&b.dynamics);
    }
    if a.statics != b.statics {
        return b.statics.cmp(&a.statics);
    }
    Ordering::Equal
}

// ============================================================================
// Tests
// ============================================================================
