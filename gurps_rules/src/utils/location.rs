//! Source locations for declarations and the errors raised against them

use std::fmt;
use std::sync::Arc;

/// A 1-based line inside a named source
///
/// The path is shared, so cloning a location per declaration stays cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    path: Arc<str>,
    line: usize,
}

impl Location {
    pub fn new(path: impl Into<Arc<str>>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// Location on another line of the same source
    pub fn with_line(&self, line: usize) -> Self {
        Self {
            path: Arc::clone(&self.path),
            line,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.path, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_path_and_line() {
        let location = Location::new("core.gurpenator_data", 12);
        assert_eq!(location.to_string(), "(core.gurpenator_data:12)");
    }

    #[test]
    fn test_with_line_shares_path() {
        let first = Location::new("skills.txt", 1);
        let later = first.with_line(40);
        assert_eq!(later.path(), "skills.txt");
        assert_eq!(later.line(), 40);
        assert_ne!(first, later);
    }
}
