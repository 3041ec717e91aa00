use std::path::PathBuf;

/// Failures while reading, writing or validating a contract document.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("failed to parse contract JSON: {0}")]
    Parse(String),

    #[error("failed to read contract file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write contract file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize contract: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A malformed field, attributed to an interaction where one is involved.
    #[error("{}", render_validation(.interaction, .message))]
    Validation {
        interaction: Option<usize>,
        field: &'static str,
        message: String,
    },
}

impl ContractError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ContractError::Validation {
            interaction: None,
            field,
            message: message.into(),
        }
    }

    /// Attaches an interaction index to a validation error.
    pub(crate) fn at_interaction(self, index: usize) -> Self {
        match self {
            ContractError::Validation { field, message, .. } => ContractError::Validation {
                interaction: Some(index),
                field,
                message,
            },
            other => other,
        }
    }
}

fn render_validation(interaction: &Option<usize>, message: &str) -> String {
    match interaction {
        Some(index) => format!("interaction {}: {}", index, message),
        None => message.to_string(),
    }
}
