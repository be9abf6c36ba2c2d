//! Path pattern compilation.
//!
//! A pattern is a literal path with `{name}` placeholders, e.g.
//! `/files/{filename}`. Compilation escapes every literal character,
//! turns each placeholder into a `([^/]+)` capture group and anchors the
//! result, so a placeholder captures one or more non-slash bytes and the
//! whole path must match.

use regex::Regex;
use thiserror::Error;

/// Errors raised while compiling a route pattern at registration.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    NotAbsolute(String),

    #[error("pattern {0:?} has an unclosed '{{'")]
    Unclosed(String),

    #[error("pattern {0:?} has an unmatched '}}'")]
    Unmatched(String),

    #[error("pattern {0:?} has an empty placeholder")]
    EmptyName(String),

    #[error("pattern {pattern:?} declares placeholder {name:?} twice")]
    DuplicateName { pattern: String, name: String },

    #[error("pattern {pattern:?} did not compile: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled route pattern. Built once, then only read.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    params: Vec<String>,
}

impl PathPattern {
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::NotAbsolute(pattern.to_string()));
        }

        let mut expr = String::from("^");
        let mut params: Vec<String> = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();

                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | Some('/') | None => {
                                return Err(PatternError::Unclosed(pattern.to_string()));
                            }
                            Some(ch) => name.push(ch),
                        }
                    }
                    if name.is_empty() {
                        return Err(PatternError::EmptyName(pattern.to_string()));
                    }
                    if params.contains(&name) {
                        return Err(PatternError::DuplicateName {
                            pattern: pattern.to_string(),
                            name,
                        });
                    }
                    params.push(name);
                    expr.push_str("([^/]+)");
                }
                '}' => return Err(PatternError::Unmatched(pattern.to_string())),
                other => literal.push(other),
            }
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source| PatternError::Regex {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            params,
        })
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names, left to right.
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    /// Captured values in placeholder order, or `None` if `path` does not match.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_patterns_match_exactly() {
        let pattern = PathPattern::compile("/user-agent").unwrap();
        assert!(pattern.param_names().is_empty());
        assert!(pattern.is_match("/user-agent"));
        assert!(!pattern.is_match("/user-agent/"));
        assert!(!pattern.is_match("/x/user-agent"));
        assert_eq!(pattern.captures("/user-agent"), Some(vec![]));
    }

    #[test]
    fn root_only_matches_root() {
        let pattern = PathPattern::compile("/").unwrap();
        assert!(pattern.is_match("/"));
        assert!(!pattern.is_match("/echo"));
    }

    #[test]
    fn literal_regex_metacharacters_are_escaped() {
        let pattern = PathPattern::compile("/v1.0/{id}+").unwrap();
        assert_eq!(pattern.captures("/v1.0/7+"), Some(vec!["7".to_string()]));
        assert!(!pattern.is_match("/v1x0/7+"));
        assert!(!pattern.is_match("/v1.0/77"));
    }

    #[test]
    fn placeholders_capture_non_slash_segments() {
        let pattern = PathPattern::compile("/echo/{message}").unwrap();
        assert_eq!(pattern.param_names(), ["message"]);
        assert_eq!(
            pattern.captures("/echo/abc123"),
            Some(vec!["abc123".to_string()])
        );
        assert_eq!(pattern.captures("/echo/"), None);
        assert_eq!(pattern.captures("/echo/a/b"), None);
    }

    #[test]
    fn multiple_placeholders_keep_declaration_order() {
        let pattern = PathPattern::compile("/{second}/mid/{first}.{ext}").unwrap();
        assert_eq!(pattern.param_names(), ["second", "first", "ext"]);
        assert_eq!(
            pattern.captures("/zzz/mid/aaa.txt"),
            Some(vec!["zzz".to_string(), "aaa".to_string(), "txt".to_string()])
        );
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert!(matches!(
            PathPattern::compile("echo/{m}"),
            Err(PatternError::NotAbsolute(_))
        ));
        assert!(matches!(
            PathPattern::compile("/echo/{m"),
            Err(PatternError::Unclosed(_))
        ));
        assert!(matches!(
            PathPattern::compile("/echo/{a/b}"),
            Err(PatternError::Unclosed(_))
        ));
        assert!(matches!(
            PathPattern::compile("/echo/m}"),
            Err(PatternError::Unmatched(_))
        ));
        assert!(matches!(
            PathPattern::compile("/echo/{}"),
            Err(PatternError::EmptyName(_))
        ));
        assert!(matches!(
            PathPattern::compile("/{a}/{a}"),
            Err(PatternError::DuplicateName { name, .. }) if name == "a"
        ));
    }
}
