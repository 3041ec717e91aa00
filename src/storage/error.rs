/// Errors returned by a [`ContractStore`](super::ContractStore) or an
/// [`ObjectStore`](super::ObjectStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No contract at the requested triple, or no versions for the pair when
    /// the latest was requested (`version` is then empty).
    #[error("contract not found: {consumer}/{provider}@{version}")]
    NotFound {
        consumer: String,
        provider: String,
        version: String,
    },

    /// No object under this key in the backing object store.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// A contract without a version cannot be stored.
    #[error("contract {consumer}/{provider} has no version")]
    MissingVersion { consumer: String, provider: String },

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend I/O failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(consumer: &str, provider: &str, version: &str) -> Self {
        StoreError::NotFound {
            consumer: consumer.to_string(),
            provider: provider.to_string(),
            version: version.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. } | StoreError::ObjectNotFound(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
