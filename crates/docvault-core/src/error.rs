//! Unified application error types for DocVault.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The [`ErrorKind`] taxonomy lets
//! calling workflows tell terminal failures apart from retryable ones.

use std::fmt;
use thiserror::Error;

/// Which uniqueness rule a conflicting write violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// `(document_id, version)` already exists.
    VersionNumber,
    /// The content checksum is already recorded somewhere in the system.
    Checksum,
    /// The download token string is already taken.
    Token,
    /// Any other duplicate.
    Other,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionNumber => write!(f, "version_number"),
            Self::Checksum => write!(f, "checksum"),
            Self::Token => write!(f, "token"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input validation failed.
    Validation,
    /// The referenced document, version, policy, or token was not found.
    NotFound,
    /// A uniqueness rule was violated.
    Conflict(ConflictKind),
    /// A download token was already consumed.
    AlreadyUsed,
    /// A download token was presented after its expiry.
    Expired,
    /// The caller is not the subject a grant was issued to, or lacks access.
    Authorization,
    /// A business rule forbids the operation.
    BusinessRule,
    /// The persistence backend failed.
    Storage,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict(_) => write!(f, "CONFLICT"),
            Self::AlreadyUsed => write!(f, "ALREADY_USED"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Authorization => write!(f, "NOT_AUTHORIZED"),
            Self::BusinessRule => write!(f, "BUSINESS_RULE_VIOLATION"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout DocVault.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error for the given uniqueness rule.
    pub fn conflict(kind: ConflictKind, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict(kind), message)
    }

    /// Create an already-used error.
    pub fn already_used(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyUsed, message)
    }

    /// Create an expired error.
    pub fn expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Expired, message)
    }

    /// Create a not-authorized error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a business-rule violation.
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BusinessRule, message)
    }

    /// Create a storage (transient backend) error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error is a conflict of the given kind.
    pub fn is_conflict(&self, kind: ConflictKind) -> bool {
        self.kind == ErrorKind::Conflict(kind)
    }

    /// Whether a caller may retry the operation that produced this error.
    ///
    /// Only backend failures are retryable. Callers should only retry reads;
    /// writes are surfaced as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Storage)
    }

    /// Whether this error reports a violated business rule
    /// (expired grant, access denied, privileged action by a non-owner).
    pub fn is_business_rule_violation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::BusinessRule | ErrorKind::Expired | ErrorKind::Authorization
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
