//! Friendship engine
//!
//! [`FriendlyRegistry`] turns a declaration into a [`Friendly`] handle: it
//! resolves and caches the owner's config, materializes the join type once,
//! and binds the operations to a repository.

pub mod friendly;
pub mod registry;

pub use friendly::{Friendly, FriendshipStatus};
pub use registry::FriendlyRegistry;
