//! Route parameters and query strings
//!
//! Parameters are the values captured by dynamic (`:id`) and star (`*path`)
//! segments during recognition, and the values substituted back into a
//! template during URL generation. Query parameters are the multi-valued
//! `?key=value` tail of a recognized path.

use std::collections::HashMap;

/// Parameters captured from a recognized path, or supplied to `generate`.
///
/// # Example
///
/// ```
/// use waymark::RouteParams;
///
/// // Route template: /posts/:post_id
/// // Recognized path: /posts/42
/// let params = RouteParams::from_pairs([("post_id", "42")]);
///
/// assert_eq!(params.get("post_id"), Some("42"));
/// assert_eq!(params.get_as::<u32>("post_id"), Some(42));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: HashMap<String, String>,
}

impl RouteParams {
    /// Create new empty route params
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any iterator of key/value pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Zip capture-group values to their segment names.
    ///
    /// Used by recognition to pair the extraction regex's captures with the
    /// param names recorded for one handler entry. Name and value counts are
    /// expected to line up; extra names are skipped.
    pub fn from_captures<'a, I>(names: &[String], values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            params: names
                .iter()
                .zip(values)
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect(),
        }
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|s| s.as_str())
    }

    /// Get a parameter and parse it as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Check if a parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Iterate over all parameters
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.params.iter()
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters parsed from the `?key=value` tail of a path.
///
/// Supports multiple values for the same key.
///
/// # Example
///
/// ```
/// use waymark::QueryParams;
///
/// let query = QueryParams::parse("page=1&tag=intro&tag=rust");
///
/// assert_eq!(query.get("page"), Some("1"));
/// assert_eq!(query.get_as::<u32>("page"), Some(1));
/// assert_eq!(query.get_all("tag").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

impl QueryParams {
    /// Create new empty query params
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a query string (the part after `?`, without the `?`)
    pub fn parse(query: &str) -> Self {
        let mut params: HashMap<String, Vec<String>> = HashMap::new();

        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                let key = percent_decode(key);
                let value = percent_decode(value);
                params.entry(key).or_default().push(value);
            }
        }

        Self { params }
    }

    /// Get the first value for a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.first().map(|s| s.as_str())
    }

    /// Get all values for a parameter
    ///
    /// Useful for parameters that repeat, like `?tag=a&tag=b`.
    pub fn get_all(&self, key: &str) -> Option<&Vec<String>> {
        self.params.get(key)
    }

    /// Get the first value parsed as a specific type
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Append a value for a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.entry(key.into()).or_default().push(value.into());
    }

    /// Check if a parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Render back to a query string
    pub fn to_query_string(&self) -> String {
        let pairs: Vec<String> = self
            .params
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", percent_encode(key), percent_encode(value)))
            })
            .collect();

        pairs.join("&")
    }

    /// Check if there are no query parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of unique parameter keys
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// Percent-encode a query component
fn percent_encode(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => c.to_string(),
            ' ' => "%20".to_string(),
            _ => format!("%{:02X}", c as u8),
        })
        .collect()
}

/// Percent-decode a query component
fn percent_decode(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                result.push(byte as char);
            } else {
                result.push('%');
                result.push_str(&hex);
            }
        } else if c == '+' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
