//! Entity trait identifying the owner types that can befriend each other

use uuid::Uuid;

/// Base trait for any type that can take part in friendships.
///
/// The engine only needs two things from an owner type:
/// - a type path (e.g. `"Social::User"`), used to derive every name
/// - a stable primary key per instance
///
/// The default type path is the Rust type name (`my_app::models::User`),
/// so most owner types only implement [`Entity::id`].
pub trait Entity: Send + Sync + 'static {
    /// The namespace-qualified type path of this owner type
    fn type_path() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;
}
