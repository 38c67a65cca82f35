//! URL glob patterns for endpoint matching

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

/// Glob pattern matched against request URLs.
///
/// `*` matches within a single path segment, `**` matches across
/// segments. Patterns starting with `/` are matched against the path
/// portion of the URL; anything else is matched against the full URL.
/// A pattern that fails to compile matches nothing.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    raw: String,
    regex: Option<Regex>,
}

impl UrlPattern {
    /// Compile a glob pattern
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let regex = Regex::new(&glob_to_regex(&raw)).ok();
        Self { raw, regex }
    }

    /// The original glob string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the given URL (or bare path) matches this pattern
    pub fn matches(&self, url: &str) -> bool {
        let Some(regex) = &self.regex else {
            return false;
        };

        if self.raw.starts_with('/') {
            // Match against the path only; bare paths are taken as-is
            // with any query string stripped.
            let target = match Url::parse(url) {
                Ok(parsed) => parsed.path().to_string(),
                Err(_) => url.split('?').next().unwrap_or(url).to_string(),
            };
            regex.is_match(&target)
        } else {
            regex.is_match(url)
        }
    }
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for UrlPattern {}

impl std::hash::Hash for UrlPattern {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.raw, state);
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl From<&str> for UrlPattern {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for UrlPattern {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl Serialize for UrlPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for UrlPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

/// Translate a glob into an anchored regex, escaping everything else
fn glob_to_regex(glob: &str) -> String {
    let mut pattern = String::with_capacity(glob.len() * 2 + 2);
    pattern.push('^');

    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    pattern.push_str(".*");
                } else {
                    pattern.push_str("[^/]*");
                }
            }
            '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '?' | '\\' => {
                pattern.push('\\');
                pattern.push(c);
            }
            c => pattern.push(c),
        }
    }

    pattern.push('$');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_path_match() {
        let pattern = UrlPattern::new("/api/courses");
        assert!(pattern.matches("/api/courses"));
        assert!(pattern.matches("http://localhost:3000/api/courses"));
        assert!(pattern.matches("http://localhost:3000/api/courses?page=2"));
        assert!(!pattern.matches("/api/courses/42"));
    }

    #[test]
    fn test_single_segment_wildcard() {
        let pattern = UrlPattern::new("/api/courses/*/lessons");
        assert!(pattern.matches("/api/courses/42/lessons"));
        assert!(pattern.matches("http://localhost/api/courses/rust-101/lessons"));
        assert!(!pattern.matches("/api/courses/42/extra/lessons"));
    }

    #[test]
    fn test_multi_segment_wildcard() {
        let pattern = UrlPattern::new("/api/**");
        assert!(pattern.matches("/api/courses"));
        assert!(pattern.matches("/api/courses/42/lessons"));
        assert!(!pattern.matches("/auth/login"));
    }

    #[test]
    fn test_full_url_pattern() {
        let pattern = UrlPattern::new("http://localhost:*/api/health");
        assert!(pattern.matches("http://localhost:3000/api/health"));
        assert!(!pattern.matches("http://example.com/api/health"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = UrlPattern::new("/api/search?q=a+b");
        assert!(!pattern.matches("/api/searchXq=aab"));
    }

    #[test]
    fn test_serde_round_trip() {
        let pattern = UrlPattern::new("/api/*/detail");
        let json = serde_json::to_string(&pattern).unwrap();
        assert_eq!(json, "\"/api/*/detail\"");
        let back: UrlPattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pattern);
        assert!(back.matches("/api/42/detail"));
    }
}
