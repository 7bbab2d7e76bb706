//! Errors raised while decoding or translating a filter.

use crate::ast::OperatorKind;
use thiserror::Error;

/// Every failure is terminal: a translation either fully succeeds or yields one of these.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("`fields` and `include` cannot be used together in the same filter")]
    ConflictingProjection,

    #[error("invalid order direction `{direction}` for field `{field}`, expected ASC or DESC")]
    InvalidOrderDirection { field: String, direction: String },

    #[error("operator `{operator}` on field `{field}` has no equivalent in the target dialect")]
    UnsupportedOperator { field: String, operator: OperatorKind },

    #[error("unrecognized operator on field `{field}`: {value}")]
    UnrecognizedOperator { field: String, value: String },

    #[error("filter nesting exceeds the maximum depth of {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("malformed filter at `{path}`: {reason}")]
    MalformedFilter { path: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TranslationError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedFilter {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Short stable name of the error kind, for callers that surface it to users.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConflictingProjection => "ConflictingProjectionError",
            Self::InvalidOrderDirection { .. } => "InvalidOrderDirectionError",
            Self::UnsupportedOperator { .. } => "UnsupportedOperatorError",
            Self::UnrecognizedOperator { .. } => "UnrecognizedOperatorError",
            Self::DepthLimitExceeded { .. } => "DepthLimitExceededError",
            Self::MalformedFilter { .. } => "MalformedFilterError",
            Self::Json(_) => "JsonError",
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslationError>;
