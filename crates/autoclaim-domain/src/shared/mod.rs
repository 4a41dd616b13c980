use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(AccountId);

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Missing credentials: no password and no usable session")]
    MissingCredentials,

    #[error("Unknown auth method code: {0}")]
    UnknownAuthMethod(i64),

    #[error("Provider login failed: {0}")]
    ProviderLogin(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_roundtrip() {
        let id = AccountId::from_string("acc-42");
        assert_eq!(id.as_str(), "acc-42");
        assert_eq!(id.to_string(), "acc-42");
        assert!(!id.is_empty());
        assert!(AccountId::from_string("").is_empty());
    }
}
