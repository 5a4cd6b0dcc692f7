//! End-to-end friendship scenarios through the public API
//!
//! These tests verify that:
//! - Requests are idempotent and never link an entity to itself
//! - Acceptance gates visibility, and confirmed friendships are symmetric
//! - Directional queries report the right side of a pending request
//! - Ending a friendship restores mutual exclusion

use friendly::prelude::*;

#[derive(Debug)]
struct User {
    id: Uuid,
    name: &'static str,
}

impl User {
    fn new(name: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

impl Entity for User {
    fn type_path() -> &'static str {
        "Social::User"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

const JOIN_TYPE: &str = "Social::Friendship";

fn setup(options: FriendlyOptions) -> (Friendly<User>, InMemoryRepository) {
    let repository = InMemoryRepository::new();
    let registry = FriendlyRegistry::new(Arc::new(repository.clone()));
    let users = registry.enable_friendly::<User>(options).unwrap();
    (users, repository)
}

// =============================================================================
// Concrete scenario
// =============================================================================

#[tokio::test]
async fn test_joe_quentin_aaron_scenario() {
    let (users, repository) = setup(FriendlyOptions::default());
    let joe = User::new("Joe");
    let quentin = User::new("Quentin");
    let aaron = User::new("Aaron");

    // Joe asks Quentin
    let before = repository.count(JOIN_TYPE).unwrap();
    users.request_friendship(&joe, &quentin).await.unwrap();
    assert_eq!(repository.count(JOIN_TYPE).unwrap(), before + 1);
    assert!(!users.friends(&quentin).await.unwrap().contains(&joe.id));

    // Quentin confirms
    users.confirm_friendship_with(&quentin, &joe).await.unwrap();
    assert!(users.friends(&joe).await.unwrap().contains(&quentin.id));
    assert!(users.friends(&quentin).await.unwrap().contains(&joe.id));

    // Joe asks Aaron: a second, independent row
    users.request_friendship(&joe, &aaron).await.unwrap();
    assert_eq!(repository.count(JOIN_TYPE).unwrap(), 2);
    assert!(users.is_friendship_to_accept(&aaron, &joe).await.unwrap());
    assert!(users.friends(&joe).await.unwrap().contains(&quentin.id));
    assert!(!users.friends(&joe).await.unwrap().contains(&aaron.id));

    // Quentin ends it
    assert!(users.end_friendship_with(&quentin, &joe).await.unwrap());
    assert!(!users.friends(&joe).await.unwrap().contains(&quentin.id));
    assert!(!users.friends(&quentin).await.unwrap().contains(&joe.id));
    assert_eq!(repository.count(JOIN_TYPE).unwrap(), 1);

    // Aaron's pending request is untouched
    assert_eq!(
        users.friendships_to_accept(&aaron).await.unwrap(),
        vec![joe.id],
        "{} should still await {}",
        aaron.name,
        joe.name
    );
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn test_request_twice_creates_one_row() {
    let (users, repository) = setup(FriendlyOptions::default());
    let (a, b) = (User::new("A"), User::new("B"));

    let first = users.request_friendship(&a, &b).await.unwrap();
    let second = users.request_friendship(&a, &b).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(repository.count(JOIN_TYPE).unwrap(), 1);
}

#[tokio::test]
async fn test_self_friendship_fails_and_writes_nothing() {
    let (users, repository) = setup(FriendlyOptions::default());
    let a = User::new("A");

    let err = users.request_friendship(&a, &a).await.unwrap_err();

    assert!(err.is_invalid_operation());
    assert_eq!(err.error_code(), "SELF_FRIENDSHIP");
    assert_eq!(repository.count(JOIN_TYPE).unwrap(), 0);
}

#[tokio::test]
async fn test_acceptance_gating() {
    let (gated, _) = setup(FriendlyOptions::default());
    let (a, b) = (User::new("A"), User::new("B"));
    gated.request_friendship(&a, &b).await.unwrap();
    assert!(!gated.friends(&a).await.unwrap().contains(&b.id));

    let (open, _) = setup(FriendlyOptions::new().require_acceptance(false));
    open.request_friendship(&a, &b).await.unwrap();
    assert!(open.friends(&a).await.unwrap().contains(&b.id));
    assert!(open.friends(&b).await.unwrap().contains(&a.id));
}

#[tokio::test]
async fn test_directional_query_correctness() {
    let (users, _) = setup(FriendlyOptions::default());
    let (a, b) = (User::new("A"), User::new("B"));
    users.request_friendship(&a, &b).await.unwrap();

    assert!(users.friendship_requests(&a).await.unwrap().contains(&b.id));
    assert!(!users.friendship_requests(&b).await.unwrap().contains(&a.id));
    assert!(users.friendships_to_accept(&b).await.unwrap().contains(&a.id));
    assert!(!users.friendships_to_accept(&a).await.unwrap().contains(&b.id));
}

#[tokio::test]
async fn test_end_on_nothing_is_a_no_op() {
    let (users, _) = setup(FriendlyOptions::default());
    let (a, b) = (User::new("A"), User::new("B"));

    assert!(!users.end_friendship_with(&a, &b).await.unwrap());
    assert!(users.confirm_friendship_with(&a, &b).await.unwrap().is_none());
}

#[tokio::test]
async fn test_friends_have_no_duplicates_across_many_links() {
    let (users, _) = setup(FriendlyOptions::new().require_acceptance(false));
    let hub = User::new("Hub");
    let spokes: Vec<User> = (0..5).map(|_| User::new("Spoke")).collect();

    for (i, spoke) in spokes.iter().enumerate() {
        // Alternate who asks, plus a redundant request from the other side
        if i % 2 == 0 {
            users.request_friendship(&hub, spoke).await.unwrap();
        } else {
            users.request_friendship(spoke, &hub).await.unwrap();
        }
        users.request_friendship(spoke, &hub).await.unwrap();
    }

    let friends = users.friends(&hub).await.unwrap();
    assert_eq!(friends.len(), spokes.len());
    for spoke in &spokes {
        assert!(friends.contains(&spoke.id));
        assert_eq!(users.friends(spoke).await.unwrap(), vec![hub.id]);
    }
}

// =============================================================================
// Declaration
// =============================================================================

#[test]
fn test_namespace_qualified_naming() {
    let (users, _) = setup(FriendlyOptions::default());
    let config = users.config();

    assert_eq!(config.friendship_type_name.to_string(), "Social::Friendship");
    assert_eq!(config.reference_model_name, "User");
    assert_eq!(config.requester_key, "user_id");
    assert_eq!(config.target_key, "friendship_id");
    assert!(config.require_acceptance);

    let definition = users.definition();
    assert_eq!(definition.table_name, "social_friendships");
}

#[test]
fn test_row_attributes_use_declared_keys() {
    let (users, _) = setup(
        FriendlyOptions::new()
            .requester_key("sender_id")
            .target_key("recipient_id"),
    );
    let row = Friendship::new(Uuid::new_v4(), Uuid::new_v4(), false);
    let attributes = row.to_attributes(users.definition());

    assert_eq!(attributes["sender_id"], serde_json::json!(row.requester_id));
    assert_eq!(attributes["recipient_id"], serde_json::json!(row.target_id));
}
