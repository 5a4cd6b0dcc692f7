//! In-memory implementation of Repository for testing and development

use crate::core::error::StorageError;
use crate::core::friendship::{Friendship, FriendshipChanges, NewFriendship};
use crate::core::repository::{FriendshipFilter, Repository};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

type Tables = HashMap<String, HashMap<Uuid, Friendship>>;

/// In-memory repository implementation
///
/// Rows are kept per join type. The pair-uniqueness check and the insert run
/// under the same write lock, so concurrent opposite-direction requests
/// cannot both succeed.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows stored for a join type
    pub fn count(&self, join_type: &str) -> Result<usize, StorageError> {
        Ok(self.read()?.get(join_type).map_or(0, HashMap::len))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables.read().map_err(|e| StorageError::LockPoisoned {
            message: format!("Failed to acquire read lock: {}", e),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables.write().map_err(|e| StorageError::LockPoisoned {
            message: format!("Failed to acquire write lock: {}", e),
        })
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create(
        &self,
        join_type: &str,
        attributes: NewFriendship,
    ) -> Result<Friendship, StorageError> {
        let mut tables = self.write()?;
        let rows = tables.entry(join_type.to_string()).or_default();

        let pair = FriendshipFilter::new().between(attributes.requester_id, attributes.target_id);
        if rows.values().any(|row| pair.matches(row)) {
            return Err(StorageError::Conflict {
                join_type: join_type.to_string(),
                first: attributes.requester_id,
                second: attributes.target_id,
            });
        }

        let row = attributes.into_record();
        rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn find_one(
        &self,
        join_type: &str,
        filter: &FriendshipFilter,
    ) -> Result<Option<Friendship>, StorageError> {
        let tables = self.read()?;

        Ok(tables
            .get(join_type)
            .and_then(|rows| rows.values().find(|row| filter.matches(row)).cloned()))
    }

    async fn find_all(
        &self,
        join_type: &str,
        filter: &FriendshipFilter,
    ) -> Result<Vec<Friendship>, StorageError> {
        let tables = self.read()?;

        let mut found: Vec<Friendship> = tables
            .get(join_type)
            .map(|rows| {
                rows.values()
                    .filter(|row| filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by_key(|row| row.created_at);

        Ok(found)
    }

    async fn update(
        &self,
        join_type: &str,
        record: &Friendship,
        changes: FriendshipChanges,
    ) -> Result<Friendship, StorageError> {
        let mut tables = self.write()?;

        let row = tables
            .get_mut(join_type)
            .and_then(|rows| rows.get_mut(&record.id))
            .ok_or_else(|| StorageError::NotFound {
                join_type: join_type.to_string(),
                id: record.id,
            })?;
        row.apply(&changes);

        Ok(row.clone())
    }

    async fn delete_all(
        &self,
        join_type: &str,
        filter: &FriendshipFilter,
    ) -> Result<u64, StorageError> {
        let mut tables = self.write()?;

        let Some(rows) = tables.get_mut(join_type) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|_, row| !filter.matches(row));

        Ok((before - rows.len()) as u64)
    }
}
