use std::collections::HashSet;

/// The editor's own session-state file. Its local copy is authoritative, so
/// remote writes to it are swallowed.
pub const SESSION_STATE_PATH: &str = "/var/brackets-ide/src/state.json";

/// Literal paths whose writes are acknowledged but never performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedPaths {
    paths: HashSet<String>,
}

impl ProtectedPaths {
    pub fn none() -> Self {
        Self {
            paths: HashSet::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.insert(path.into());
        self
    }

    /// Exact string match; no normalization is applied.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }
}

impl Default for ProtectedPaths {
    fn default() -> Self {
        Self::none().with_path(SESSION_STATE_PATH)
    }
}

impl<S: Into<String>> FromIterator<S> for ProtectedPaths {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_protects_session_state() {
        let paths = ProtectedPaths::default();
        assert!(paths.contains(SESSION_STATE_PATH));
        assert!(!paths.contains("/var/www/index.html"));
    }

    #[test]
    fn test_literal_match_only() {
        let paths: ProtectedPaths = ["/a/b.json"].into_iter().collect();
        assert!(paths.contains("/a/b.json"));
        assert!(!paths.contains("/a//b.json"));
        assert!(!paths.contains("/a/./b.json"));
        assert!(!ProtectedPaths::none().contains(SESSION_STATE_PATH));
    }
}
