// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use regex::Regex;

use crate::core::config::Pattern;

#[derive(Debug)]
pub enum PatternParseError {
    Empty,
    InvalidRegex(String),
}

impl fmt::Display for PatternParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternParseError::Empty => write!(f, "Empty entry in public_routes"),
            PatternParseError::InvalidRegex(msg) => {
                write!(f, "Invalid regex in public_routes: {}", msg)
            }
        }
    }
}

impl std::error::Error for PatternParseError {}

/// Parses a public-route entry. Anything carrying regex syntax is compiled,
/// everything else is a literal path.
pub fn parse_route_pattern(s: &str) -> Result<Pattern, PatternParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(PatternParseError::Empty);
    }

    let regex_meta = ['*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '\\', '^', '$'];

    if s.chars().any(|c| regex_meta.contains(&c)) {
        Ok(Pattern::Regex(
            Regex::new(s).map_err(|e| PatternParseError::InvalidRegex(e.to_string()))?,
        ))
    } else {
        Ok(Pattern::Literal(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_literals() {
        match parse_route_pattern(" /reset.password ").unwrap() {
            Pattern::Literal(s) => assert_eq!(s, "/reset.password"),
            other => panic!("expected literal, got {other}"),
        }
    }

    #[test]
    fn meta_characters_make_a_regex() {
        let p = parse_route_pattern("^/share/[a-z0-9]+$").unwrap();
        assert!(matches!(p, Pattern::Regex(_)));
        assert!(p.matches_route("/share/ab12"));
        assert!(!p.matches_route("/share/AB12/x"));
    }

    #[test]
    fn broken_regex_and_empty_are_rejected() {
        assert!(matches!(
            parse_route_pattern("^/share/(oops"),
            Err(PatternParseError::InvalidRegex(_))
        ));
        assert!(matches!(parse_route_pattern("   "), Err(PatternParseError::Empty)));
    }
}
