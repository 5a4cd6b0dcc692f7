//! # Friendly
//!
//! Self-referential friendship relationships for any entity type.
//!
//! Two records of the same owner type can request, confirm, and end a
//! friendship. The engine keeps one join row per pair and derives every
//! name it needs (join type, foreign keys, table) from a single declaration.
//!
//! ## Features
//!
//! - **One declaration**: `enable_friendly::<User>(options)` resolves the
//!   config, materializes the join type, and returns the operations
//! - **Namespace aware**: `Social::User` gets `Social::Friendship` unless told otherwise
//! - **Acceptance policy**: requests either wait for confirmation or are
//!   friends immediately
//! - **Idempotent requests**: at most one row per unordered pair
//! - **Pluggable storage**: any [`Repository`](core::Repository); an
//!   in-memory one ships by default
//! - **Events**: optional broadcast of requested/confirmed/ended events
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use friendly::prelude::*;
//!
//! struct User {
//!     id: Uuid,
//! }
//!
//! impl Entity for User {
//!     fn type_path() -> &'static str {
//!         "Social::User"
//!     }
//!
//!     fn id(&self) -> Uuid {
//!         self.id
//!     }
//! }
//!
//! let registry = FriendlyRegistry::new(Arc::new(InMemoryRepository::new()));
//! let users = registry.enable_friendly::<User>(FriendlyOptions::default())?;
//!
//! users.request_friendship(&joe, &quentin).await?;
//! users.confirm_friendship_with(&quentin, &joe).await?;
//! assert_eq!(users.friends(&joe).await?, vec![quentin.id]);
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        entity::Entity,
        error::{ConfigError, FriendlyError, FriendshipError, StorageError},
        events::{EventBus, EventEnvelope, FriendshipEvent},
        friendship::{Friendship, FriendshipDefinition, RelationDirection, RelationInfo},
        naming::TypePath,
        repository::{FriendshipFilter, Repository},
    };

    // === Config ===
    pub use crate::config::{FriendlyConfig, FriendlyDeclaration, FriendlyManifest, FriendlyOptions};

    // === Engine ===
    pub use crate::engine::{Friendly, FriendlyRegistry, FriendshipStatus};

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryRepository;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
