use crate::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AslError {
    /// Builder cursor misuse or id bookkeeping violation, raised at the offending call.
    #[error("graph construction error: {message}")]
    GraphConstruction { message: String },
    /// Structural defect of a whole graph, found at serialize time.
    #[error("graph validation error: {message}")]
    GraphValidation { message: String },
    #[error("'{entity}' failed validation: {message}")]
    StateValidation { entity: String, message: String },
    #[error("'{path}' is not a reference path (expected '$' or a '$.' prefix)")]
    PathFormat { path: String },
    #[error(transparent)]
    Lint(#[from] ValidationError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type AslResult<T> = Result<T, AslError>;

impl AslError {
    pub fn construction(message: impl Into<String>) -> Self {
        Self::GraphConstruction {
            message: message.into(),
        }
    }

    pub fn graph(message: impl Into<String>) -> Self {
        Self::GraphValidation {
            message: message.into(),
        }
    }

    pub fn state(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StateValidation {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Prefixes the failing entity with the enclosing state, e.g. `para[0]/b`.
    pub fn scoped(self, scope: &str) -> Self {
        match self {
            Self::StateValidation { entity, message } => Self::StateValidation {
                entity: format!("{scope}/{entity}"),
                message,
            },
            Self::GraphValidation { message } => Self::GraphValidation {
                message: format!("{scope}: {message}"),
            },
            other => other,
        }
    }
}

#[derive(Debug, Error, Clone)]
#[error("lint failed with {errors_count} error(s)")]
pub struct ValidationError {
    pub diagnostics: Vec<Diagnostic>,
    pub errors_count: usize,
}

impl ValidationError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        let errors_count = diagnostics.iter().filter(|d| d.is_error()).count();
        Self {
            diagnostics,
            errors_count,
        }
    }
}
