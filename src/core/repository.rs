//! Repository trait consumed by the friendship engine

use crate::core::error::StorageError;
use crate::core::friendship::{Friendship, FriendshipChanges, NewFriendship, ordered_pair};
use async_trait::async_trait;
use uuid::Uuid;

/// Predicate over join rows
///
/// Every field that is set must match; an empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendshipFilter {
    pub requester_id: Option<Uuid>,
    pub target_id: Option<Uuid>,
    /// Either party
    pub involving: Option<Uuid>,
    /// Unordered pair, stored smallest id first
    pub pair: Option<(Uuid, Uuid)>,
    pub accepted: Option<bool>,
}

impl FriendshipFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requester(mut self, id: Uuid) -> Self {
        self.requester_id = Some(id);
        self
    }

    pub fn target(mut self, id: Uuid) -> Self {
        self.target_id = Some(id);
        self
    }

    pub fn involving(mut self, id: Uuid) -> Self {
        self.involving = Some(id);
        self
    }

    /// Rows linking `a` and `b`, in either direction
    pub fn between(mut self, a: Uuid, b: Uuid) -> Self {
        self.pair = Some(ordered_pair(a, b));
        self
    }

    pub fn accepted(mut self, accepted: bool) -> Self {
        self.accepted = Some(accepted);
        self
    }

    /// Check a row against the predicate
    pub fn matches(&self, row: &Friendship) -> bool {
        self.requester_id.is_none_or(|id| row.requester_id == id)
            && self.target_id.is_none_or(|id| row.target_id == id)
            && self.involving.is_none_or(|id| row.involves(id))
            && self.pair.is_none_or(|pair| row.pair() == pair)
            && self.accepted.is_none_or(|accepted| row.accepted == accepted)
    }
}

/// Storage collaborator for join rows
///
/// Rows are partitioned by join type name, so one repository can back
/// several owner types. Implementations must reject a second row for the
/// same unordered pair within a join type with [`StorageError::Conflict`],
/// either through a uniqueness constraint or by running the check and the
/// insert atomically.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Insert a new join row
    async fn create(
        &self,
        join_type: &str,
        attributes: NewFriendship,
    ) -> Result<Friendship, StorageError>;

    /// First row matching the filter
    async fn find_one(
        &self,
        join_type: &str,
        filter: &FriendshipFilter,
    ) -> Result<Option<Friendship>, StorageError>;

    /// All rows matching the filter
    async fn find_all(
        &self,
        join_type: &str,
        filter: &FriendshipFilter,
    ) -> Result<Vec<Friendship>, StorageError>;

    /// Apply changes to an existing row
    async fn update(
        &self,
        join_type: &str,
        record: &Friendship,
        changes: FriendshipChanges,
    ) -> Result<Friendship, StorageError>;

    /// Delete all rows matching the filter, returning how many were removed
    async fn delete_all(
        &self,
        join_type: &str,
        filter: &FriendshipFilter,
    ) -> Result<u64, StorageError>;
}
