use crate::graph::NodeId;
use std::fmt;
use thiserror::Error;

/// Errors that abort a conversion. No partial flowchart is ever returned alongside one.
///
/// Every variant names the function and the statement index (position in that function's
/// flat input sequence) that triggered it. Failures detected after the last statement was
/// walked report an index equal to the length of the sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Malformed input in function '{function}' at statement {index}: {reason}")]
    MalformedInput {
        function: String,
        index: usize,
        reason: String,
    },

    #[error("Unsupported construct in function '{function}' at statement {index}: {construct}")]
    UnsupportedConstruct {
        function: String,
        index: usize,
        construct: String,
    },

    #[error(
        "Internal invariant violated in function '{function}' near statement {index}: {detail}"
    )]
    InternalInvariant {
        function: String,
        index: usize,
        detail: String,
    },
}

/// The taxonomy bucket of a `ConvertError`, for callers that only need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedInput,
    UnsupportedConstruct,
    InternalInvariant,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MalformedInput => write!(f, "malformed input"),
            ErrorKind::UnsupportedConstruct => write!(f, "unsupported construct"),
            ErrorKind::InternalInvariant => write!(f, "internal invariant violation"),
        }
    }
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::MalformedInput { .. } => ErrorKind::MalformedInput,
            ConvertError::UnsupportedConstruct { .. } => ErrorKind::UnsupportedConstruct,
            ConvertError::InternalInvariant { .. } => ErrorKind::InternalInvariant,
        }
    }

    pub fn statement_index(&self) -> usize {
        match self {
            ConvertError::MalformedInput { index, .. }
            | ConvertError::UnsupportedConstruct { index, .. }
            | ConvertError::InternalInvariant { index, .. } => *index,
        }
    }

    pub fn function(&self) -> &str {
        match self {
            ConvertError::MalformedInput { function, .. }
            | ConvertError::UnsupportedConstruct { function, .. }
            | ConvertError::InternalInvariant { function, .. } => function,
        }
    }
}

/// Errors raised by the node and connection registries.
///
/// A correct conversion never produces one; the engine reports them as
/// `ConvertError::InternalInvariant`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Node '{0}' was never created in this conversion")]
    NotFound(NodeId),

    #[error("Connection '{start}' -> '{end}' references missing node '{missing}'")]
    InvalidEndpoint {
        start: NodeId,
        end: NodeId,
        missing: NodeId,
    },
}

/// Misuse of the conversion context's scope stack or pending table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("No scope is open")]
    EmptyScopeStack,

    #[error("{count} pending reconnect(s) still await scope {scope} at its exit")]
    UnresolvedPending { scope: usize, count: usize },

    #[error("Scope {0} is not an open loop body")]
    NotALoop(usize),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors that can occur while reading statements from an external format.
#[derive(Error, Debug, Clone)]
pub enum InputError {
    #[error("Failed to parse statement JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid statement data: {0}")]
    ValidationError(String),
}

/// Errors from the flowchart configuration layer.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Failed to parse configuration JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid configuration value '{field}': {message}")]
    InvalidValue { field: String, message: String },
}
