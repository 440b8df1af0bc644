//! # Waymark
//!
//! A routing core in two tightly coupled pieces:
//!
//! - **Path pattern compiler/matcher** - compiles route templates (static
//!   segments, `:name` dynamic segments, `*name` star segments) into a
//!   character-driven recognition automaton, and supports both recognition
//!   (path string to ordered handler matches) and generation (route name
//!   plus params to path string).
//! - **Transition engine** - consumes recognition results, resolves each
//!   handler's context (synchronously or by awaiting a deferred value), and
//!   computes the minimal exit/update/enter set against the previously
//!   active handler chain, invoking lifecycle hooks in order.
//!
//! # Quick Start
//!
//! ```
//! use waymark::route::RouteConfig;
//! use waymark::recognizer::RouteRecognizer;
//! use waymark::handler::HandlerMap;
//! use waymark::transition::TransitionEngine;
//!
//! let mut recognizer = RouteRecognizer::new();
//! RouteConfig::new("/", "index").mount(&mut recognizer);
//! RouteConfig::new("/posts", "posts")
//!     .child(RouteConfig::new("/:post_id", "post"))
//!     .mount(&mut recognizer);
//!
//! let mut engine = TransitionEngine::new(recognizer, HandlerMap::new());
//!
//! let outcome = pollster::block_on(engine.handle_url("/posts/42")).unwrap();
//! assert!(outcome.is_completed());
//! assert!(engine.is_active("post", &[]));
//! ```
//!
//! # Handlers
//!
//! Handlers are duck-typed through the [`handler::Handler`] trait; every
//! hook has a default no-op body. A handler whose data comes from genuinely
//! asynchronous work returns [`handler::Resolution::deferred`], which
//! suspends the in-flight transition until the future settles while the
//! previously active chain stays published.
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually
//!   exclusive with `log`)
//! - `cache` (default) - LRU cache for recognition results

#![doc(html_root_url = "https://docs.rs/waymark/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Path pattern compiler/matcher
pub mod automaton;
pub mod params;
pub mod recognizer;
pub mod route;
pub mod segment;

// Transition engine
pub mod handler;
pub mod location;
pub mod transition;

// Error handling
pub mod error;

// Re-export main types for convenient access
pub use automaton::{CharClass, CharSpec, HandlerEntry};
#[cfg(feature = "cache")]
pub use cache::{CacheStats, RecognitionCache};
pub use error::{RouterError, TransitionOutcome};
pub use handler::{
    same_context, ContextFuture, Handler, HandlerMap, HandlerResolver, PassthroughHandler,
    Resolution, SetupResult, SharedContext,
};
pub use location::{LocationUpdater, MemoryLocation};
pub use params::{QueryParams, RouteParams};
pub use recognizer::{RouteDef, RouteRecognizer};
pub use route::{validate_route_path, RouteConfig};
pub use segment::{Segment, Specificity};
pub use transition::{EnginePhase, HandlerInfo, TransitionEngine};

/// One matched handler of a recognized path.
///
/// # Example
///
/// ```
/// use waymark::{HandlerMatch, RouteParams};
///
/// let matched = HandlerMatch {
///     handler: "post".to_string(),
///     params: RouteParams::from_pairs([("post_id", "42")]),
///     is_dynamic: true,
/// };
///
/// assert_eq!(matched.params.get("post_id"), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct HandlerMatch {
    /// Name of the matched handler
    pub handler: String,
    /// Parameters captured by this handler's own segments
    pub params: RouteParams,
    /// True iff this handler's segments captured at least one parameter
    pub is_dynamic: bool,
}

/// Result of recognizing one concrete path.
///
/// Matches are ordered outermost ancestor first - the vertical stack of
/// composed routes terminating at the recognized path.
#[derive(Debug, Clone)]
pub struct Recognition {
    /// Ordered handler matches, outermost first
    pub matches: Vec<HandlerMatch>,
    /// Parameters parsed from the `?query` tail, if any
    pub query: QueryParams,
}

impl Recognition {
    /// The match for a specific handler name, if present
    pub fn handler(&self, name: &str) -> Option<&HandlerMatch> {
        self.matches.iter().find(|m| m.handler == name)
    }

    /// The innermost (leaf) match
    pub fn leaf(&self) -> Option<&HandlerMatch> {
        self.matches.last()
    }
}
