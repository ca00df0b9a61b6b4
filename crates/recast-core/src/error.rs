//! Error types and handling for tree transformation runs

use std::path::PathBuf;
use thiserror::Error;

use crate::tree::JKind;

/// Main error type for the transformation engine
#[derive(Debug, Error)]
pub enum RecastError {
    /// Front end could not parse a source unit or snippet
    #[error("Parse error in '{path}': {message} at offset {offset}")]
    ParseError {
        path: PathBuf,
        message: String,
        offset: usize,
    },

    /// A template snippet does not parse in any scaffold
    #[error("Template definition error for `{code}`: {message}")]
    TemplateDefinition { code: String, message: String },

    /// A method or type pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Recipe validation failed before the run touched any tree
    #[error("Recipe '{recipe}' is invalid: {failures}")]
    InvalidRecipe { recipe: String, failures: String },

    /// Placeholder and argument counts disagree
    #[error("Template `{code}` expects {expected} argument(s) but {actual} were supplied")]
    TemplateParameterCount {
        code: String,
        expected: usize,
        actual: usize,
    },

    /// A fragment cannot be spliced at the requested site
    #[error("Cannot apply {fragment} at {site} of {anchor}: {message}")]
    IncompatibleCoordinates {
        anchor: JKind,
        site: String,
        fragment: String,
        message: String,
    },

    /// Coordinates reference a node that is not inside the scope
    #[error("Anchor {anchor} not found in the supplied scope")]
    AnchorNotFound { anchor: String },

    /// A visitor returned a node of the wrong kind for a typed slot
    #[error("Expected {expected} but visitor returned {actual}")]
    UnexpectedKind { expected: JKind, actual: JKind },

    /// A visitor pass failed for one source unit
    #[error("Recipe '{recipe}' failed on '{path}': {message}")]
    UnitFailure {
        recipe: String,
        path: PathBuf,
        message: String,
    },

    /// Run was cancelled or its deadline elapsed
    #[error("Run cancelled: {reason}")]
    Cancelled { reason: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    Parse,
    Definition,
    Usage,
    Unit,
    Cancelled,
    Config,
    Io,
    Internal,
}

impl RecastError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecastError::ParseError { .. } => ErrorKind::Parse,
            RecastError::TemplateDefinition { .. }
            | RecastError::InvalidPattern { .. }
            | RecastError::InvalidRecipe { .. } => ErrorKind::Definition,
            RecastError::TemplateParameterCount { .. }
            | RecastError::IncompatibleCoordinates { .. }
            | RecastError::AnchorNotFound { .. } => ErrorKind::Usage,
            RecastError::UnexpectedKind { .. } | RecastError::UnitFailure { .. } => ErrorKind::Unit,
            RecastError::Cancelled { .. } => ErrorKind::Cancelled,
            RecastError::ConfigError { .. } => ErrorKind::Config,
            RecastError::IoError { .. } => ErrorKind::Io,
            RecastError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (the run can continue with other units)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Parse | ErrorKind::Usage | ErrorKind::Unit
        )
    }

    /// Create a parse error
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>, offset: usize) -> Self {
        Self::ParseError {
            path: path.into(),
            message: message.into(),
            offset,
        }
    }

    /// Create a template definition error
    pub fn template_definition(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateDefinition {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an invalid coordinates error
    pub fn incompatible_coordinates(
        anchor: JKind,
        site: impl Into<String>,
        fragment: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::IncompatibleCoordinates {
            anchor,
            site: site.into(),
            fragment: fragment.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for RecastError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for RecastError {
    fn from(err: serde_json::Error) -> Self {
        Self::InternalError {
            message: format!("JSON error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = RecastError::TemplateParameterCount {
            code: "#{any()}".to_string(),
            expected: 1,
            actual: 0,
        };
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.is_recoverable());

        let err = RecastError::invalid_pattern("Foo bar(", "unbalanced parentheses");
        assert_eq!(err.kind(), ErrorKind::Definition);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_unexpected_kind_message() {
        let err = RecastError::UnexpectedKind {
            expected: JKind::Identifier,
            actual: JKind::Literal,
        };
        assert_eq!(err.to_string(), "Expected Identifier but visitor returned Literal");
        assert_eq!(err.kind(), ErrorKind::Unit);
    }
}
