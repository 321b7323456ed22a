use stepforge_asl::AslError;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("resource not found: {resource} ({id})")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("invalid state machine definition: {0}")]
    Definition(#[from] AslError),
}

pub type DeployResult<T> = Result<T, DeployError>;

impl DeployError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
