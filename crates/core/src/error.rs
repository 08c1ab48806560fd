use std::collections::BTreeMap;

use thiserror::Error;
use uuid::Uuid;

pub type CampaignResult<T> = Result<T, CampaignError>;

/// Field name → every message raised against that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {} field(s) failed validation", .0.len())]
    InvalidInput(FieldErrors),

    #[error("Customer population unavailable: {0}")]
    PopulationUnavailable(String),

    #[error("Campaign not found: {0}")]
    NotFound(Uuid),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CampaignError {
    /// Field errors carried by an `InvalidInput`, if this is one.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            CampaignError::InvalidInput(errors) => Some(errors),
            _ => None,
        }
    }
}
