//! Credential resolution.
//!
//! A request-supplied `apiKey` always wins. Otherwise the server-side secret
//! for the selected provider is used; GROQ holds a pool of keys and one is
//! picked per request through a [`KeySelector`].

use std::collections::HashMap;
use std::fmt;

use rand::seq::IndexedRandom;

use super::error::GatewayError;
use super::provider::{Provider, ProviderSelection};

/// Picks one key out of a pool.
pub trait KeySelector: Send + Sync {
    fn select<'a>(&self, keys: &'a [String]) -> Option<&'a str>;
}

/// Uniformly random pick, using the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomKeySelector;

impl KeySelector for RandomKeySelector {
    fn select<'a>(&self, keys: &'a [String]) -> Option<&'a str> {
        keys.choose(&mut rand::rng()).map(String::as_str)
    }
}

/// A resolved secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Server-side secrets, loaded once per process.
#[derive(Clone, Default)]
pub struct CredentialStore {
    keys: HashMap<Provider, Vec<String>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every provider's credential variable from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// GROQ's variable is a comma-separated pool; the others hold one secret.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut store = Self::new();
        for provider in Provider::ALL {
            let Some(raw) = lookup(provider.credential_env()) else {
                continue;
            };
            let keys = match provider {
                Provider::Groq => parse_pool(&raw),
                _ => vec![raw.trim().to_string()],
            };
            store = store.with_keys(provider, keys);
        }
        store
    }

    /// Replace the keys held for `provider`. Blank entries are dropped.
    pub fn with_keys<I, S>(mut self, provider: Provider, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys
            .into_iter()
            .map(Into::into)
            .filter(|k| !k.trim().is_empty())
            .collect();
        if keys.is_empty() {
            self.keys.remove(&provider);
        } else {
            self.keys.insert(provider, keys);
        }
        self
    }

    /// Number of server-side keys configured for `provider`.
    pub fn key_count(&self, provider: Provider) -> usize {
        self.keys.get(&provider).map_or(0, Vec::len)
    }

    fn server_side(&self, provider: Provider, selector: &dyn KeySelector) -> Option<&str> {
        selector.select(self.keys.get(&provider)?)
    }

    /// Resolve the credential for one request.
    ///
    /// Unknown provider names routed through the GROQ path only accept a
    /// request-supplied key.
    pub fn resolve(
        &self,
        request_key: Option<&str>,
        selection: &ProviderSelection,
        selector: &dyn KeySelector,
    ) -> Result<Credential, GatewayError> {
        if let Some(key) = request_key.filter(|k| !k.is_empty()) {
            return Ok(Credential(key.to_string()));
        }

        let fallback = if selection.known {
            self.server_side(selection.provider, selector)
        } else {
            None
        };

        fallback
            .map(|key| Credential(key.to_string()))
            .ok_or_else(|| GatewayError::CredentialMissing {
                provider: selection.name.clone(),
            })
    }
}

/// Split a comma-separated key list, trimming entries and dropping empties.
pub fn parse_pool(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
