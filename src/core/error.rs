//! Typed error handling for the friendly engine
//!
//! Errors are grouped by category so callers can match on the failure they
//! care about instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`ConfigError`]: declaration-time failures (malformed type paths,
//!   conflicting options, manifest parsing)
//! - [`FriendshipError`]: misuse of a friendship operation (self-friendship)
//! - [`StorageError`]: failures reported by a [`Repository`](crate::core::Repository)
//!
//! Soft conditions (confirming or ending a friendship that does not exist)
//! are not errors: those operations return `Ok(None)` / `Ok(false)`.
//!
//! # Example
//!
//! ```rust,ignore
//! match users.request_friendship(&joe, &joe).await {
//!     Err(FriendlyError::Friendship(FriendshipError::SelfFriendship { .. })) => {
//!         println!("cannot befriend yourself");
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//!     Ok(row) => println!("requested: {}", row.id),
//! }
//! ```

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the friendly engine
#[derive(Debug, Error)]
pub enum FriendlyError {
    /// Configuration errors, raised while declaring an owner type
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid friendship operations
    #[error(transparent)]
    Friendship(#[from] FriendshipError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FriendlyError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            FriendlyError::Config(e) => e.error_code(),
            FriendlyError::Friendship(e) => e.error_code(),
            FriendlyError::Storage(e) => e.error_code(),
        }
    }

    /// Whether this error indicates caller misuse rather than a system failure
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, FriendlyError::Friendship(_))
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to declaring friendship on an owner type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The owner (or join) type path cannot be split into namespace + simple name
    #[error("Malformed type path '{path}': {message}")]
    MalformedTypePath { path: String, message: String },

    /// An option value is unusable
    #[error("Invalid value for '{option}' on '{owner_type}': {message}")]
    InvalidOption {
        owner_type: String,
        option: String,
        message: String,
    },

    /// The owner type was already declared with different options
    #[error("'{owner_type}' is already friendly with different options")]
    ConflictingOptions { owner_type: String },

    /// The join type is already materialized for another owner type
    #[error("Join type '{join_type}' already belongs to '{existing_owner}', cannot attach '{owner_type}'")]
    JoinTypeConflict {
        join_type: String,
        existing_owner: String,
        owner_type: String,
    },

    /// The owner type has not been declared friendly
    #[error("'{owner_type}' has not been declared friendly")]
    Undeclared { owner_type: String },

    /// Failed to parse a manifest
    #[error("Failed to parse manifest{}: {message}", .file.as_ref().map(|f| format!(" '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Manifest file not found
    #[error("Manifest file not found: {path}")]
    FileNotFound { path: String },
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::MalformedTypePath { .. } => "MALFORMED_TYPE_PATH",
            ConfigError::InvalidOption { .. } => "INVALID_OPTION",
            ConfigError::ConflictingOptions { .. } => "CONFLICTING_OPTIONS",
            ConfigError::JoinTypeConflict { .. } => "JOIN_TYPE_CONFLICT",
            ConfigError::Undeclared { .. } => "UNDECLARED_OWNER_TYPE",
            ConfigError::ParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND",
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Friendship Errors
// =============================================================================

/// Errors raised when a friendship operation is misused
#[derive(Debug, Error)]
pub enum FriendshipError {
    /// An entity tried to befriend itself
    #[error("'{owner_type}' {id} cannot request friendship with itself")]
    SelfFriendship { owner_type: String, id: Uuid },
}

impl FriendshipError {
    pub fn error_code(&self) -> &'static str {
        match self {
            FriendshipError::SelfFriendship { .. } => "SELF_FRIENDSHIP",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors reported by a repository backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// A row already exists for the unordered pair
    #[error("{join_type} already links '{first}' and '{second}'")]
    Conflict {
        join_type: String,
        first: Uuid,
        second: Uuid,
    },

    /// The record to update no longer exists
    #[error("{join_type} with id '{id}' not found")]
    NotFound { join_type: String, id: Uuid },

    /// The pair kept conflicting while its row kept disappearing
    #[error("{join_type} row for '{first}' and '{second}' still contended after {attempts} attempts")]
    Contended {
        join_type: String,
        first: Uuid,
        second: Uuid,
        attempts: usize,
    },

    /// A lock guarding in-process storage was poisoned
    #[error("Storage lock poisoned: {message}")]
    LockPoisoned { message: String },

    /// Any other backend failure
    #[error("{backend} error: {message}")]
    Backend { backend: String, message: String },
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Conflict { .. } => "STORAGE_CONFLICT",
            StorageError::NotFound { .. } => "STORAGE_NOT_FOUND",
            StorageError::Contended { .. } => "STORAGE_CONTENDED",
            StorageError::LockPoisoned { .. } => "STORAGE_LOCK_POISONED",
            StorageError::Backend { .. } => "STORAGE_ERROR",
        }
    }

    /// Whether this is a uniqueness violation on the unordered pair
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = FriendlyError> = std::result::Result<T, E>;
