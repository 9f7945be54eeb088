use crate::graph::{abbreviate_id, PATH_DELIMITER};
use std::fmt;

/// Trailing wildcard of a selection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard {
    /// `>*`: leaves directly under the prefix, without crossing a property.
    Direct,
    /// `>**`: every reachable leaf.
    Deep,
}

impl Wildcard {
    pub fn as_str(&self) -> &'static str {
        match self {
            Wildcard::Direct => "*",
            Wildcard::Deep => "**",
        }
    }
}

/// A parsed selection path: node ids from an operation root, optionally
/// ending in a wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPath {
    pub segments: Vec<String>,
    pub wildcard: Option<Wildcard>,
}

impl SelectionPath {
    pub fn parse(text: &str) -> Self {
        let mut segments: Vec<String> = text
            .trim()
            .split(PATH_DELIMITER)
            .map(|s| abbreviate_id(s.trim()))
            .filter(|s| !s.is_empty())
            .collect();
        let wildcard = match segments.last().map(String::as_str) {
            Some("**") => Some(Wildcard::Deep),
            Some("*") => Some(Wildcard::Direct),
            _ => None,
        };
        if wildcard.is_some() {
            segments.pop();
        }
        Self { segments, wildcard }
    }

    /// The path without its wildcard.
    pub fn prefix(&self) -> String {
        self.segments.join(&PATH_DELIMITER.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for SelectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())?;
        if let Some(wildcard) = self.wildcard {
            write!(f, "{}{}", PATH_DELIMITER, wildcard.as_str())?;
        }
        Ok(())
    }
}
