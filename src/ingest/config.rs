// src/ingest/config.rs
use std::collections::BTreeMap;

/// Every environment variable an adapter may read credentials from.
pub const CREDENTIAL_VARS: &[&str] = &[
    "AMAZON_ACCESS_KEY",
    "AMAZON_SECRET_KEY",
    "AMAZON_PARTNER_TAG",
    "BESTBUY_API_KEY",
    "WALMART_API_KEY",
    "NIMBLE_API_KEY",
    "NIMBLE_BASE_URL",
];

/// Credential store handed to adapter constructors.
///
/// Built from the environment (or any lookup) and overridable with explicit
/// values, which take precedence. Empty values count as absent.
#[derive(Clone, Default)]
pub struct Credentials {
    values: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // keys only; values are secrets
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = BTreeMap::new();
        for var in CREDENTIAL_VARS {
            if let Some(v) = lookup(var) {
                let v = v.trim().to_string();
                if !v.is_empty() {
                    values.insert(var.to_string(), v);
                }
            }
        }
        Self { values }
    }

    /// Explicit value; overrides anything read from the environment.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        let v: String = value.into();
        if v.trim().is_empty() {
            self.values.remove(key);
        } else {
            self.values.insert(key.to_string(), v.trim().to_string());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn has_all(&self, keys: &[&str]) -> bool {
        keys.iter().all(|k| self.get(k).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_blank_and_unknown_vars() {
        let creds = Credentials::from_lookup(|k| match k {
            "BESTBUY_API_KEY" => Some(" bb-key ".into()),
            "WALMART_API_KEY" => Some("   ".into()),
            "SOMETHING_ELSE" => Some("x".into()),
            _ => None,
        });
        assert_eq!(creds.get("BESTBUY_API_KEY"), Some("bb-key"));
        assert_eq!(creds.get("WALMART_API_KEY"), None);
        assert_eq!(creds.get("SOMETHING_ELSE"), None);
    }

    #[test]
    fn explicit_values_take_precedence() {
        let creds = Credentials::from_lookup(|k| (k == "NIMBLE_API_KEY").then(|| "env".to_string()))
            .with("NIMBLE_API_KEY", "explicit");
        assert_eq!(creds.get("NIMBLE_API_KEY"), Some("explicit"));
        assert!(creds.has_all(&["NIMBLE_API_KEY"]));
        assert!(!creds.has_all(&["NIMBLE_API_KEY", "BESTBUY_API_KEY"]));
    }

    #[test]
    fn debug_output_hides_values() {
        let creds = Credentials::default().with("BESTBUY_API_KEY", "secret-value");
        let dbg = format!("{creds:?}");
        assert!(dbg.contains("BESTBUY_API_KEY"));
        assert!(!dbg.contains("secret-value"));
    }
}
