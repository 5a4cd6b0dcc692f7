//! Core module containing the fundamental types of the friendship engine

pub mod entity;
pub mod error;
pub mod events;
pub mod friendship;
pub mod naming;
pub mod repository;

pub use entity::Entity;
pub use error::{ConfigError, FriendlyError, FriendshipError, StorageError};
pub use events::{EventBus, EventEnvelope, FriendshipEvent};
pub use friendship::{
    Friendship, FriendshipChanges, FriendshipDefinition, NewFriendship, RelationDirection,
    RelationInfo,
};
pub use naming::{Inflector, Pluralizer, TypePath};
pub use repository::{FriendshipFilter, Repository};
