//! Name patterns with PowerShell `-like` semantics.
//!
//! `*` matches any run of characters, `?` exactly one, `[abc]` / `[a-c]` one
//! character from a set. Matching is case-insensitive and anchored.

use regex::Regex;

use crate::error::{Error, Result};

/// A compiled wildcard pattern.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&translate(pattern)?)
            .map_err(|e| Error::invalid("name pattern", e.to_string()))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern can match more than one literal name.
    pub fn has_wildcards(&self) -> bool {
        has_wildcards(&self.source)
    }
}

pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn translate(pattern: &str) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?is)^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    class.push(c);
                }
                if !closed || class.is_empty() {
                    return Err(Error::invalid(
                        "name pattern",
                        format!("unterminated character set in '{pattern}'"),
                    ));
                }
                out.push('[');
                for (i, c) in class.chars().enumerate() {
                    if c == '-' && i > 0 {
                        out.push('-');
                    } else {
                        out.push_str(&regex::escape(&c.to_string()));
                    }
                }
                out.push(']');
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn pattern(p: &str) -> WildcardPattern {
        WildcardPattern::new(p).expect("valid pattern")
    }

    #[test]
    fn star_matches_prefix() {
        let p = pattern("Test*");
        assert!(p.is_match("Test"));
        assert!(p.is_match("TestSecurity"));
        assert!(p.is_match("testsecurity"));
        assert!(!p.is_match("MyTest"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        let p = pattern("DC?");
        assert!(p.is_match("DC1"));
        assert!(!p.is_match("DC"));
        assert!(!p.is_match("DC12"));
    }

    #[test]
    fn character_sets_and_ranges() {
        let p = pattern("Srv[0-2]");
        assert!(p.is_match("Srv0"));
        assert!(p.is_match("srv2"));
        assert!(!p.is_match("Srv3"));
        assert!(pattern("[ab]x").is_match("Bx"));
    }

    #[test]
    fn literal_regex_characters_are_escaped() {
        let p = pattern("Sub.(1)+");
        assert!(p.is_match("Sub.(1)+"));
        assert!(!p.is_match("SubX(1)+"));
    }

    #[test]
    fn unterminated_set_is_rejected() {
        assert!(WildcardPattern::new("abc[").is_err());
    }

    #[test]
    fn detects_wildcards() {
        assert!(pattern("Test*").has_wildcards());
        assert!(!pattern("Test").has_wildcards());
    }
}
