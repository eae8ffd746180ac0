//! Provider registry for dynamic forge-client resolution.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use gitvault_common::{AccessToken, Error, Result};

use crate::github::GitHubClient;
use crate::repository::RemoteRepository;

/// Factory function type for creating remote clients.
pub type RemoteFactory = Box<dyn Fn(Value) -> Result<Arc<dyn RemoteRepository>> + Send + Sync>;

/// Registry of forge-client factories, keyed by provider id.
pub struct RemoteRegistry {
    factories: HashMap<String, RemoteFactory>,
}

impl RemoteRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a client factory.
    ///
    /// # Errors
    /// - Returns error if the provider id is already registered
    pub fn register(&mut self, provider: impl Into<String>, factory: RemoteFactory) -> Result<()> {
        let provider = provider.into();
        if self.factories.contains_key(&provider) {
            return Err(Error::InvalidInput(format!(
                "Provider '{}' is already registered",
                provider
            )));
        }
        self.factories.insert(provider, factory);
        Ok(())
    }

    /// Resolve a client by provider id and configuration.
    ///
    /// # Errors
    /// - Provider not registered
    /// - Configuration invalid for the provider
    pub fn resolve(&self, provider: &str, config: Value) -> Result<Arc<dyn RemoteRepository>> {
        let factory = self.factories.get(provider).ok_or_else(|| {
            Error::NotFound(format!("Provider '{}' is not registered", provider))
        })?;
        factory(config)
    }

    /// Get the list of registered provider ids.
    pub fn providers(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Check if a provider is registered.
    pub fn has_provider(&self, provider: &str) -> bool {
        self.factories.contains_key(provider)
    }
}

impl Default for RemoteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the built-in providers registered.
pub fn create_default_registry() -> RemoteRegistry {
    let mut registry = RemoteRegistry::new();
    registry
        .register(
            "github",
            Box::new(|config| {
                let token = config
                    .get("token")
                    .and_then(Value::as_str)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        Error::InvalidInput(
                            "github provider requires a non-empty token".to_string(),
                        )
                    })?;
                Ok(Arc::new(GitHubClient::new(AccessToken::new(token))))
            }),
        )
        .expect("empty registry cannot collide");
    registry
}
