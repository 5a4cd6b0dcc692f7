//! The friendship join record and the definition of its join type

use crate::core::naming::{Inflector, Pluralizer, TypePath};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One relationship edge between two entities of the same owner type
///
/// The row is directional (`requester_id` asked, `target_id` was asked) but
/// at most one row exists per unordered pair, so it also stands for the
/// mutual friendship once `accepted` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    /// Primary key of the join row
    pub id: Uuid,

    /// The entity that initiated the request
    pub requester_id: Uuid,

    /// The entity the request is addressed to
    pub target_id: Uuid,

    /// Whether the target accepted the request
    pub accepted: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Create a new join row
    pub fn new(requester_id: Uuid, target_id: Uuid, accepted: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            requester_id,
            target_id,
            accepted,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `entity_id` is one of the two parties
    pub fn involves(&self, entity_id: Uuid) -> bool {
        self.requester_id == entity_id || self.target_id == entity_id
    }

    /// Whether this row links `a` and `b`, in either direction
    pub fn connects(&self, a: Uuid, b: Uuid) -> bool {
        (self.requester_id == a && self.target_id == b)
            || (self.requester_id == b && self.target_id == a)
    }

    /// The party on the other side of `entity_id`
    pub fn other_party(&self, entity_id: Uuid) -> Option<Uuid> {
        if self.requester_id == entity_id {
            Some(self.target_id)
        } else if self.target_id == entity_id {
            Some(self.requester_id)
        } else {
            None
        }
    }

    /// The unordered pair, smallest id first
    pub fn pair(&self) -> (Uuid, Uuid) {
        ordered_pair(self.requester_id, self.target_id)
    }

    /// Apply changes and bump `updated_at`
    pub fn apply(&mut self, changes: &FriendshipChanges) {
        if let Some(accepted) = changes.accepted {
            self.accepted = accepted;
        }
        self.updated_at = Utc::now();
    }

    /// Render the row keyed by the column names of its join type
    ///
    /// ```
    /// use friendly::core::friendship::{Friendship, FriendshipDefinition};
    /// use friendly::core::naming::TypePath;
    /// use uuid::Uuid;
    ///
    /// let definition = FriendshipDefinition::new(
    ///     TypePath::parse("Friendship").unwrap(),
    ///     TypePath::parse("User").unwrap(),
    ///     "user_id",
    ///     "friendship_id",
    /// );
    /// let row = Friendship::new(Uuid::new_v4(), Uuid::new_v4(), false);
    /// let attributes = row.to_attributes(&definition);
    /// assert_eq!(attributes["user_id"], row.requester_id.to_string());
    /// ```
    pub fn to_attributes(&self, definition: &FriendshipDefinition) -> serde_json::Value {
        let mut attributes = serde_json::Map::new();
        attributes.insert("id".to_string(), serde_json::json!(self.id));
        attributes.insert(
            definition.requester_key.clone(),
            serde_json::json!(self.requester_id),
        );
        attributes.insert(
            definition.target_key.clone(),
            serde_json::json!(self.target_id),
        );
        attributes.insert("accepted".to_string(), serde_json::json!(self.accepted));
        attributes.insert("created_at".to_string(), serde_json::json!(self.created_at));
        attributes.insert("updated_at".to_string(), serde_json::json!(self.updated_at));
        serde_json::Value::Object(attributes)
    }
}

/// Order two ids so the pair can be compared regardless of direction
pub fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Attributes for creating a join row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewFriendship {
    pub requester_id: Uuid,
    pub target_id: Uuid,
    pub accepted: bool,
}

impl NewFriendship {
    pub fn into_record(self) -> Friendship {
        Friendship::new(self.requester_id, self.target_id, self.accepted)
    }
}

/// Attributes that may change on an existing join row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendshipChanges {
    pub accepted: Option<bool>,
}

impl FriendshipChanges {
    pub fn accept() -> Self {
        Self {
            accepted: Some(true),
        }
    }
}

/// Direction of a traversal from the owner into its join rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationDirection {
    /// Rows where the owner is the requester
    Requested,
    /// Rows where the owner is the target
    Received,
}

/// A relationship traversal registered on an owner type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationInfo {
    /// Traversal name (e.g. "requested_friendships")
    pub name: String,

    /// The join type the traversal walks into
    pub join_type: String,

    /// Foreign key on the join type that points back at the owner
    pub foreign_key: String,

    pub direction: RelationDirection,
}

/// Shape of a materialized join type
///
/// One definition exists per join type name. Both foreign keys reference the
/// owner type's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendshipDefinition {
    /// Fully qualified join type name (e.g. "Social::Friendship")
    pub join_type: TypePath,

    /// The owner type both foreign keys reference
    pub owner_type: TypePath,

    /// Storage table for SQL backends
    pub table_name: String,

    /// Foreign key pointing at the requester
    pub requester_key: String,

    /// Foreign key pointing at the target
    pub target_key: String,
}

impl FriendshipDefinition {
    pub fn new(
        join_type: TypePath,
        owner_type: TypePath,
        requester_key: impl Into<String>,
        target_key: impl Into<String>,
    ) -> Self {
        Self {
            table_name: Inflector::tableize(&join_type),
            join_type,
            owner_type,
            requester_key: requester_key.into(),
            target_key: target_key.into(),
        }
    }

    /// The two traversals an owner gets: requests it initiated and received
    pub fn relations(&self) -> Vec<RelationInfo> {
        let plural = Pluralizer::pluralize(&Inflector::underscore(self.join_type.simple_name()));
        vec![
            RelationInfo {
                name: format!("requested_{}", plural),
                join_type: self.join_type.to_string(),
                foreign_key: self.requester_key.clone(),
                direction: RelationDirection::Requested,
            },
            RelationInfo {
                name: format!("received_{}", plural),
                join_type: self.join_type.to_string(),
                foreign_key: self.target_key.clone(),
                direction: RelationDirection::Received,
            },
        ]
    }

    /// DDL for SQL backends
    ///
    /// The expression index over the ordered pair is the storage-level
    /// uniqueness constraint `request_friendship` relies on under
    /// concurrent requests.
    pub fn create_table_sql(&self) -> String {
        let table = &self.table_name;
        let owner_table = Inflector::tableize(&self.owner_type);
        let requester = &self.requester_key;
        let target = &self.target_key;

        format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n\
             \x20   id UUID PRIMARY KEY,\n\
             \x20   {requester} UUID NOT NULL REFERENCES {owner_table} (id) ON DELETE CASCADE,\n\
             \x20   {target} UUID NOT NULL REFERENCES {owner_table} (id) ON DELETE CASCADE,\n\
             \x20   accepted BOOLEAN NOT NULL DEFAULT FALSE,\n\
             \x20   created_at TIMESTAMPTZ NOT NULL,\n\
             \x20   updated_at TIMESTAMPTZ NOT NULL,\n\
             \x20   CHECK ({requester} <> {target})\n\
             );\n\
             CREATE INDEX IF NOT EXISTS {table}_{requester}_idx ON {table} ({requester});\n\
             CREATE INDEX IF NOT EXISTS {table}_{target}_idx ON {table} ({target});\n\
             CREATE UNIQUE INDEX IF NOT EXISTS {table}_pair_idx ON {table} \
             (LEAST({requester}, {target}), GREATEST({requester}, {target}));\n"
        )
    }
}
