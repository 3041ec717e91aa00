//! Structural validation of contract documents.

use super::{Contract, ContractError, Interaction, Pacticipant, Request, Response};

/// Methods a contract request may use (compared case-insensitively).
pub const ALLOWED_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

const MAX_NAME_LEN: usize = 255;

impl Contract {
    /// Checks the whole document, stopping at the first problem found.
    pub fn validate(&self) -> Result<(), ContractError> {
        validate_pacticipant(&self.consumer, "consumer")?;
        validate_pacticipant(&self.provider, "provider")?;
        if self.interactions.is_empty() {
            return Err(ContractError::invalid(
                "interactions",
                "at least one interaction is required",
            ));
        }
        for (index, interaction) in self.interactions.iter().enumerate() {
            interaction
                .validate()
                .map_err(|e| e.at_interaction(index))?;
        }
        Ok(())
    }
}

impl Interaction {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.description.is_empty() {
            return Err(ContractError::invalid("description", "description is required"));
        }
        self.request.validate()?;
        self.response.validate()
    }
}

impl Request {
    pub fn validate(&self) -> Result<(), ContractError> {
        let method = self.normalized_method();
        if !ALLOWED_METHODS.contains(&method.as_str()) {
            return Err(ContractError::invalid(
                "request.method",
                format!("invalid HTTP method: {}", self.method),
            ));
        }
        if self.path.is_empty() {
            return Err(ContractError::invalid("request.path", "request path is required"));
        }
        if !self.path.starts_with('/') {
            return Err(ContractError::invalid(
                "request.path",
                "request path must start with /",
            ));
        }
        Ok(())
    }
}

impl Response {
    pub fn validate(&self) -> Result<(), ContractError> {
        if !(100..=599).contains(&self.status) {
            return Err(ContractError::invalid(
                "response.status",
                format!("invalid HTTP status code: {} (must be 100-599)", self.status),
            ));
        }
        Ok(())
    }
}

fn validate_pacticipant(p: &Pacticipant, role: &'static str) -> Result<(), ContractError> {
    if p.name.is_empty() {
        return Err(ContractError::invalid(role, format!("{} name is required", role)));
    }
    if p.name.chars().count() > MAX_NAME_LEN {
        return Err(ContractError::invalid(
            role,
            format!("{} name must be {} characters or less", role, MAX_NAME_LEN),
        ));
    }
    Ok(())
}
