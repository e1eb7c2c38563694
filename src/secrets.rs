/// Fetch-by-name source for deployment secrets such as TLS material.
///
/// The default implementation reads process environment variables; tests
/// inject a static provider instead of mutating process-wide state.
pub trait SecretProvider: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads secrets from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretProvider for EnvSecrets {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::SecretProvider;
    use std::collections::HashMap;

    /// In-memory provider for tests.
    #[derive(Debug, Clone, Default)]
    pub struct StaticSecrets {
        values: HashMap<String, String>,
    }

    impl StaticSecrets {
        pub fn with(entries: &[(&str, &str)]) -> Self {
            Self {
                values: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl SecretProvider for StaticSecrets {
        fn get(&self, name: &str) -> Option<String> {
            self.values.get(name).cloned()
        }
    }
}
