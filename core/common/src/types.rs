//! Common types used throughout gitvault.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// A file path within the vault, relative to the vault root.
///
/// Slash-separated regardless of platform; the same string addresses the
/// file in the remote repository tree. Always names a file, never the
/// vault root, so it has at least one component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VaultPath {
    components: Vec<String>,
}

impl VaultPath {
    /// Create a path from string components.
    ///
    /// # Preconditions
    /// - At least one component
    /// - Components must not be empty, contain separators, or be `.`/`..`
    ///
    /// # Errors
    /// - Returns error if any component is invalid
    pub fn from_components(components: Vec<String>) -> crate::Result<Self> {
        if components.is_empty() {
            return Err(crate::Error::InvalidInput(
                "Path must have at least one component".to_string(),
            ));
        }
        for comp in &components {
            if comp.is_empty() {
                return Err(crate::Error::InvalidInput(
                    "Path component cannot be empty".to_string(),
                ));
            }
            if comp.contains('/') || comp.contains('\\') {
                return Err(crate::Error::InvalidInput(
                    "Path component cannot contain separators".to_string(),
                ));
            }
            if comp == "." || comp == ".." {
                return Err(crate::Error::InvalidInput(
                    "Path component cannot be a dot segment".to_string(),
                ));
            }
        }
        Ok(Self { components })
    }

    /// Parse a slash-separated path string.
    ///
    /// Leading and trailing slashes are ignored.
    pub fn parse(path: &str) -> crate::Result<Self> {
        let trimmed = path.trim_start_matches('/').trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(crate::Error::InvalidInput(
                "Path cannot be empty".to_string(),
            ));
        }
        let components: Vec<String> = trimmed.split('/').map(String::from).collect();
        Self::from_components(components)
    }

    /// Get the file name (last component).
    pub fn name(&self) -> &str {
        self.components
            .last()
            .expect("VaultPath has at least one component")
    }

    /// Get the path components.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Join this path with a child component.
    pub fn join(&self, child: &str) -> crate::Result<Self> {
        let mut components = self.components.clone();
        components.push(child.to_string());
        Self::from_components(components)
    }
}

impl fmt::Display for VaultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("/"))
    }
}

/// Personal access token wrapper that zeroizes on drop.
#[derive(Clone, Zeroize, Serialize, Deserialize)]
#[zeroize(drop)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if no token is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_path_parse() {
        let path = VaultPath::parse("notes/daily/todo.md").unwrap();
        assert_eq!(path.components(), &["notes", "daily", "todo.md"]);
        assert_eq!(path.to_string(), "notes/daily/todo.md");
    }

    #[test]
    fn test_vault_path_strips_slashes() {
        let path = VaultPath::parse("/notes/todo.md/").unwrap();
        assert_eq!(path.to_string(), "notes/todo.md");
    }

    #[test]
    fn test_vault_path_empty_fails() {
        assert!(VaultPath::parse("").is_err());
        assert!(VaultPath::parse("/").is_err());
    }

    #[test]
    fn test_vault_path_rejects_dot_segments() {
        assert!(VaultPath::parse("notes/../secret").is_err());
        assert!(VaultPath::parse("./notes").is_err());
    }

    #[test]
    fn test_vault_path_name() {
        let path = VaultPath::parse("notes/todo.md").unwrap();
        assert_eq!(path.name(), "todo.md");
    }

    #[test]
    fn test_vault_path_join() {
        let path = VaultPath::parse("notes").unwrap().join("todo.md").unwrap();
        assert_eq!(path.to_string(), "notes/todo.md");
        assert!(VaultPath::parse("notes").unwrap().join("a/b").is_err());
    }

    #[test]
    fn test_access_token_debug_redacted() {
        let token = AccessToken::new("ghp_secret");
        assert_eq!(format!("{:?}", token), "AccessToken([REDACTED])");
    }

    #[test]
    fn test_access_token_serde_roundtrip() {
        let token = AccessToken::new("ghp_secret");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"ghp_secret\"");
        let restored: AccessToken = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.as_str(), "ghp_secret");
    }
}
