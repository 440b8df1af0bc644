//! Route map builder
//!
//! A thin nesting helper that accumulates path fragments and handler names,
//! then hands ordered ancestor-first chains to the
//! [`RouteRecognizer`](crate::recognizer::RouteRecognizer). Each node in the
//! tree is registered as a recognizable, generate-able route of its own;
//! children extend their parent's chain.

use crate::recognizer::{RouteDef, RouteRecognizer};

// ============================================================================
// Route Validation
// ============================================================================

/// Validate a route path template.
///
/// # Validation Rules
///
/// - Path can be empty (for index routes)
/// - No consecutive slashes (`//`)
/// - Dynamic (`:name`) and star (`*name`) parameter names must be non-empty,
///   alphanumeric/underscore only
/// - No duplicate parameter names within one template
pub fn validate_route_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Ok(());
    }

    if path.contains("//") {
        return Err("Route path cannot contain consecutive slashes".to_string());
    }

    let mut param_names = std::collections::HashSet::new();
    for piece in path.split('/') {
        let param = piece
            .strip_prefix(':')
            .or_else(|| piece.strip_prefix('*'));
        if let Some(param) = param {
            if param.is_empty() {
                return Err("Route parameter name cannot be empty".to_string());
            }
            if !param.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(format!(
                    "Route parameter '{}' must contain only alphanumeric characters and underscores",
                    param
                ));
            }
            if !param_names.insert(param.to_string()) {
                return Err(format!("Duplicate route parameter: '{}'", param));
            }
        }
    }

    Ok(())
}

// ============================================================================
// RouteConfig
// ============================================================================

/// One node of the route map: a path fragment, the handler it activates,
/// and any nested children.
///
/// # Example
///
/// ```
/// use waymark::route::RouteConfig;
/// use waymark::recognizer::RouteRecognizer;
///
/// let mut recognizer = RouteRecognizer::new();
/// RouteConfig::new("/", "index").mount(&mut recognizer);
/// RouteConfig::new("/posts", "posts")
///     .child(RouteConfig::new("/:post_id", "post"))
///     .mount(&mut recognizer);
///
/// let recognition = recognizer.recognize("/posts/42").unwrap();
/// assert_eq!(recognition.matches[0].handler, "posts");
/// assert_eq!(recognition.matches[1].handler, "post");
/// ```
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Path fragment for this node (relative to the parent)
    pub path: String,
    /// Handler activated when this node matches; also the name the chain is
    /// registered under for generation
    pub handler: String,
    /// Nested child routes
    pub children: Vec<RouteConfig>,
}

impl RouteConfig {
    /// Create a route node with path validation.
    ///
    /// # Panics
    ///
    /// Panics if the path is invalid. Use [`Self::try_new`] for non-panicking
    /// validation.
    pub fn new(path: impl Into<String>, handler: impl Into<String>) -> Self {
        let path = path.into();
        if let Err(e) = validate_route_path(&path) {
            panic!("Invalid route path '{}': {}", path, e);
        }
        Self {
            path,
            handler: handler.into(),
            children: Vec::new(),
        }
    }

    /// Create a route node, returning validation errors instead of panicking
    pub fn try_new(
        path: impl Into<String>,
        handler: impl Into<String>,
    ) -> Result<Self, String> {
        let path = path.into();
        validate_route_path(&path)?;
        Ok(Self {
            path,
            handler: handler.into(),
            children: Vec::new(),
        })
    }

    /// Add a child route
    pub fn child(mut self, child: RouteConfig) -> Self {
        self.children.push(child);
        self
    }

    /// Add several child routes
    pub fn children(mut self, children: Vec<RouteConfig>) -> Self {
        self.children.extend(children);
        self
    }

    /// Flatten this subtree into ancestor-first chains, one per node
    pub fn chains(&self) -> Vec<Vec<RouteDef>> {
        let mut chains = Vec::new();
        self.collect_chains(&[], &mut chains);
        chains
    }

    fn collect_chains(&self, ancestors: &[RouteDef], chains: &mut Vec<Vec<RouteDef>>) {
        let mut chain = ancestors.to_vec();
        chain.push(RouteDef::new(self.path.clone(), self.handler.clone()));
        chains.push(chain.clone());

        for child in &self.children {
            child.collect_chains(&chain, chains);
        }
    }

    /// Register this subtree with a recognizer.
    ///
    /// Every node's chain is added under its handler name, so each level of
    /// the tree can be recognized and generated independently.
    pub fn mount(&self, recognizer: &mut RouteRecognizer) {
        for chain in self.chains() {
            let name = chain
                .last()
                .map(|def| def.handler.clone())
                .unwrap_or_default();
            recognizer.add(&chain, Some(&name));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_accepts_common_templates() {
        assert!(validate_route_path("").is_ok());
        assert!(validate_route_path("/").is_ok());
        assert!(validate_route_path("/posts/:post_id").is_ok());
        assert!(validate_route_path("/files/*path").is_ok());
    }

    #[test]
    fn test_validation_rejects_consecutive_slashes() {
        assert!(validate_route_path("/posts//new").is_err());
    }

    #[test]
    fn test_validation_rejects_bad_param_names() {
        assert!(validate_route_path("/posts/:").is_err());
        assert!(validate_route_path("/posts/:id-x").is_err());
        assert!(validate_route_path("/files/*").is_err());
    }

    #[test]
    fn test_validation_rejects_duplicate_params() {
        assert!(validate_route_path("/a/:id/b/:id").is_err());
    }

    #[test]
    #[should_panic(expected = "Invalid route path")]
    fn test_new_panics_on_invalid_path() {
        let _ = RouteConfig::new("/posts//new", "posts");
    }

    #[test]
    fn test_chains_ancestors_first() {
        let config = RouteConfig::new("/posts", "posts")
            .child(RouteConfig::new("/:post_id", "post").child(RouteConfig::new(
                "/comments",
                "comments",
            )));

        let chains = config.chains();
        assert_eq!(chains.len(), 3);
        assert_eq!(chains[0], vec![RouteDef::new("/posts", "posts")]);
        assert_eq!(
            chains[2],
            vec![
                RouteDef::new("/posts", "posts"),
                RouteDef::new("/:post_id", "post"),
                RouteDef::new("/comments", "comments"),
            ]
        );
    }

    #[test]
    fn test_mount_registers_every_level() {
        let mut recognizer = RouteRecognizer::new();
        RouteConfig::new("/posts", "posts")
            .child(RouteConfig::new("/:post_id", "post"))
            .mount(&mut recognizer);

        assert!(recognizer.has_route("posts"));
        assert!(recognizer.has_route("post"));
        assert_eq!(recognizer.recognize("/posts").unwrap().matches.len(), 1);
        assert_eq!(recognizer.recognize("/posts/42").unwrap().matches.len(), 2);
    }

    #[test]
    fn test_index_child() {
        let mut recognizer = RouteRecognizer::new();
        RouteConfig::new("/posts", "posts")
            .child(RouteConfig::new("", "posts.index"))
            .mount(&mut recognizer);

        // The epsilon child shares its parent's literal path; the deeper
        // chain is registered later and wins the accepting state.
        let recognition = recognizer.recognize("/posts").unwrap();
        assert_eq!(recognition.matches.len(), 2);
        assert_eq!(recognition.matches[1].handler, "posts.index");
    }
}
