//! Friendship operations bound to one owner type

use crate::config::FriendlyConfig;
use crate::core::entity::Entity;
use crate::core::error::{FriendshipError, Result, StorageError};
use crate::core::events::{EventBus, FriendshipEvent};
use crate::core::friendship::{Friendship, FriendshipChanges, FriendshipDefinition, NewFriendship};
use crate::core::repository::{FriendshipFilter, Repository};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// Insert attempts `request_friendship` makes while the pair keeps conflicting
const MAX_REQUEST_ATTEMPTS: usize = 3;

/// Where a pair of entities stands, seen from the first one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    /// No row links the two
    None,
    /// The entity asked and is waiting for the other to confirm
    Requested,
    /// The other asked and is waiting for this entity to confirm
    ToAccept,
    /// Both see each other as friends
    Accepted,
}

/// Friendship operations for owner type `T`
///
/// Obtained from [`FriendlyRegistry::enable_friendly`](crate::engine::FriendlyRegistry::enable_friendly).
/// Holds the resolved config and join type by reference, so clones are cheap.
pub struct Friendly<T: Entity> {
    config: Arc<FriendlyConfig>,
    definition: Arc<FriendshipDefinition>,
    repository: Arc<dyn Repository>,
    events: Option<EventBus>,
    _owner: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Friendly<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            definition: Arc::clone(&self.definition),
            repository: Arc::clone(&self.repository),
            events: self.events.clone(),
            _owner: PhantomData,
        }
    }
}

impl<T: Entity> std::fmt::Debug for Friendly<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Friendly")
            .field("config", &self.config)
            .field("definition", &self.definition)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl<T: Entity> Friendly<T> {
    pub(crate) fn new(
        config: Arc<FriendlyConfig>,
        definition: Arc<FriendshipDefinition>,
        repository: Arc<dyn Repository>,
        events: Option<EventBus>,
    ) -> Self {
        Self {
            config,
            definition,
            repository,
            events,
            _owner: PhantomData,
        }
    }

    pub fn config(&self) -> &Arc<FriendlyConfig> {
        &self.config
    }

    pub fn definition(&self) -> &Arc<FriendshipDefinition> {
        &self.definition
    }

    fn join_type(&self) -> String {
        self.definition.join_type.to_string()
    }

    /// Whether an accepted flag makes a row visible as a friendship
    fn visible(&self, row: &Friendship) -> bool {
        row.accepted || !self.config.require_acceptance
    }

    fn publish(&self, event: FriendshipEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    // === Mutations ===

    /// Ask `other` to become friends with `actor`
    ///
    /// Returns the new row, or the existing row if the pair is already linked
    /// in either direction. The row is accepted immediately when the owner
    /// type does not require acceptance.
    pub async fn request_friendship(&self, actor: &T, other: &T) -> Result<Friendship> {
        let (actor_id, other_id) = (actor.id(), other.id());
        if actor_id == other_id {
            return Err(FriendshipError::SelfFriendship {
                owner_type: self.config.owner_type.to_string(),
                id: actor_id,
            }
            .into());
        }

        let join_type = self.join_type();
        let pair = FriendshipFilter::new().between(actor_id, other_id);

        // A conflict means another request for the pair won the insert; the
        // next pass reads that row back, or inserts again if it was ended.
        for attempt in 1..=MAX_REQUEST_ATTEMPTS {
            if let Some(existing) = self.repository.find_one(&join_type, &pair).await? {
                tracing::debug!(
                    join_type = %join_type,
                    requester = %actor_id,
                    target = %other_id,
                    friendship = %existing.id,
                    "Friendship already exists"
                );
                return Ok(existing);
            }

            let attributes = NewFriendship {
                requester_id: actor_id,
                target_id: other_id,
                accepted: !self.config.require_acceptance,
            };

            match self.repository.create(&join_type, attributes).await {
                Ok(created) => {
                    tracing::debug!(
                        join_type = %join_type,
                        requester = %actor_id,
                        target = %other_id,
                        accepted = created.accepted,
                        "Friendship requested"
                    );
                    self.publish(FriendshipEvent::Requested {
                        join_type,
                        friendship: created.clone(),
                    });
                    return Ok(created);
                }
                Err(err) if err.is_conflict() => {
                    tracing::warn!(
                        join_type = %join_type,
                        requester = %actor_id,
                        target = %other_id,
                        attempt,
                        "Concurrent friendship request, rereading the pair"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(StorageError::Contended {
            join_type,
            first: actor_id,
            second: other_id,
            attempts: MAX_REQUEST_ATTEMPTS,
        }
        .into())
    }

    /// Accept the pending request `other` sent to `actor`
    ///
    /// Returns `Ok(None)` when there is no such pending request: the call
    /// is safe to make speculatively.
    pub async fn confirm_friendship_with(&self, actor: &T, other: &T) -> Result<Option<Friendship>> {
        let join_type = self.join_type();
        let filter = FriendshipFilter::new()
            .requester(other.id())
            .target(actor.id())
            .accepted(false);

        let Some(pending) = self.repository.find_one(&join_type, &filter).await? else {
            tracing::warn!(
                join_type = %join_type,
                actor = %actor.id(),
                other = %other.id(),
                "No pending friendship to confirm"
            );
            return Ok(None);
        };

        let confirmed = self
            .repository
            .update(&join_type, &pending, FriendshipChanges::accept())
            .await?;

        tracing::debug!(
            join_type = %join_type,
            requester = %confirmed.requester_id,
            target = %confirmed.target_id,
            "Friendship confirmed"
        );
        self.publish(FriendshipEvent::Confirmed {
            join_type,
            friendship: confirmed.clone(),
        });

        Ok(Some(confirmed))
    }

    /// Remove whatever links `actor` and `other`: pending, accepted, either direction
    ///
    /// Returns `Ok(false)` when nothing linked them. Also serves to deny a
    /// request or withdraw one.
    pub async fn end_friendship_with(&self, actor: &T, other: &T) -> Result<bool> {
        let join_type = self.join_type();
        let filter = FriendshipFilter::new().between(actor.id(), other.id());

        let removed = self.repository.delete_all(&join_type, &filter).await?;
        if removed == 0 {
            tracing::warn!(
                join_type = %join_type,
                actor = %actor.id(),
                other = %other.id(),
                "No friendship to end"
            );
            return Ok(false);
        }

        tracing::debug!(
            join_type = %join_type,
            actor = %actor.id(),
            other = %other.id(),
            removed,
            "Friendship ended"
        );
        self.publish(FriendshipEvent::Ended {
            join_type,
            actor_id: actor.id(),
            other_id: other.id(),
            removed,
        });

        Ok(true)
    }

    // === Traversals ===

    /// Join rows where `entity` is the requester
    pub async fn requested_friendships(&self, entity: &T) -> Result<Vec<Friendship>> {
        let filter = FriendshipFilter::new().requester(entity.id());
        Ok(self.repository.find_all(&self.join_type(), &filter).await?)
    }

    /// Join rows where `entity` is the target
    pub async fn received_friendships(&self, entity: &T) -> Result<Vec<Friendship>> {
        let filter = FriendshipFilter::new().target(entity.id());
        Ok(self.repository.find_all(&self.join_type(), &filter).await?)
    }

    // === Queries ===

    /// Ids of everyone `entity` is friends with, in either direction
    pub async fn friends(&self, entity: &T) -> Result<Vec<Uuid>> {
        let id = entity.id();
        let mut filter = FriendshipFilter::new().involving(id);
        if self.config.require_acceptance {
            filter = filter.accepted(true);
        }

        let rows = self.repository.find_all(&self.join_type(), &filter).await?;
        let friends: BTreeSet<Uuid> = rows
            .iter()
            .filter(|row| self.visible(row))
            .filter_map(|row| row.other_party(id))
            .collect();

        Ok(friends.into_iter().collect())
    }

    /// Ids of everyone `entity` asked and who has not confirmed yet
    pub async fn friendship_requests(&self, entity: &T) -> Result<Vec<Uuid>> {
        if !self.config.require_acceptance {
            return Ok(Vec::new());
        }

        let filter = FriendshipFilter::new()
            .requester(entity.id())
            .accepted(false);
        let rows = self.repository.find_all(&self.join_type(), &filter).await?;

        Ok(rows.iter().map(|row| row.target_id).collect::<BTreeSet<_>>().into_iter().collect())
    }

    /// Ids of everyone who asked `entity` and awaits its confirmation
    pub async fn friendships_to_accept(&self, entity: &T) -> Result<Vec<Uuid>> {
        if !self.config.require_acceptance {
            return Ok(Vec::new());
        }

        let filter = FriendshipFilter::new().target(entity.id()).accepted(false);
        let rows = self.repository.find_all(&self.join_type(), &filter).await?;

        Ok(rows.iter().map(|row| row.requester_id).collect::<BTreeSet<_>>().into_iter().collect())
    }

    /// The row linking the two, whichever side asked
    pub async fn friendship_with(&self, entity: &T, other: &T) -> Result<Option<Friendship>> {
        let filter = FriendshipFilter::new().between(entity.id(), other.id());
        Ok(self.repository.find_one(&self.join_type(), &filter).await?)
    }

    // === Predicates ===

    /// Whether `entity` asked `other`, accepted or not
    pub async fn is_friendship_requested(&self, entity: &T, other: &T) -> Result<bool> {
        let filter = FriendshipFilter::new()
            .requester(entity.id())
            .target(other.id());
        Ok(self
            .repository
            .find_one(&self.join_type(), &filter)
            .await?
            .is_some())
    }

    /// Whether `other` asked `entity` and the request is still pending
    pub async fn is_friendship_to_accept(&self, entity: &T, other: &T) -> Result<bool> {
        if !self.config.require_acceptance {
            return Ok(false);
        }

        let filter = FriendshipFilter::new()
            .requester(other.id())
            .target(entity.id())
            .accepted(false);
        Ok(self
            .repository
            .find_one(&self.join_type(), &filter)
            .await?
            .is_some())
    }

    /// Whether the two are friends
    pub async fn is_friends_with(&self, entity: &T, other: &T) -> Result<bool> {
        Ok(self
            .friendship_with(entity, other)
            .await?
            .is_some_and(|row| self.visible(&row)))
    }

    /// Where `entity` stands with `other`
    pub async fn friendship_status(&self, entity: &T, other: &T) -> Result<FriendshipStatus> {
        let status = match self.friendship_with(entity, other).await? {
            None => FriendshipStatus::None,
            Some(row) if self.visible(&row) => FriendshipStatus::Accepted,
            Some(row) if row.requester_id == entity.id() => FriendshipStatus::Requested,
            Some(_) => FriendshipStatus::ToAccept,
        };
        Ok(status)
    }
}
