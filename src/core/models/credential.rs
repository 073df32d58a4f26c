use serde::{Deserialize, Serialize};

/// Opaque API key authorizing calls to the vision model. At most one is
/// active per process; installing a new one replaces the previous.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The key never appears in logs or debug output.
        write!(f, "Credential(***)")
    }
}

/// Outcome of resolving the startup credential sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialResolution {
    /// The environment supplied a key and the store had none; the caller
    /// should persist the key so later runs work without the variable set.
    FromEnvironment { persist: bool },
    FromStore,
    Absent,
}

/// Environment-provided keys take priority over previously stored ones.
pub fn resolve_credential(
    env_value: Option<&str>,
    stored_value: Option<&str>,
) -> (Option<Credential>, CredentialResolution) {
    let env_credential = env_value.and_then(Credential::new);
    let stored_credential = stored_value.and_then(Credential::new);

    match (env_credential, stored_credential) {
        (Some(env), stored) => {
            let persist = stored.is_none();
            (
                Some(env),
                CredentialResolution::FromEnvironment { persist },
            )
        }
        (None, Some(stored)) => (Some(stored), CredentialResolution::FromStore),
        (None, None) => (None, CredentialResolution::Absent),
    }
}
