//! Integration tests for declaring owner types from a YAML manifest

use friendly::prelude::*;
use std::io::Write;

struct Member {
    id: Uuid,
}

impl Entity for Member {
    fn type_path() -> &'static str {
        "Club::Member"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

struct Guest {
    id: Uuid,
}

impl Entity for Guest {
    fn type_path() -> &'static str {
        "Club::Guest"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

const MANIFEST: &str = r#"
owners:
  - type: Club::Member
    friendship_class: Buddy
    require_acceptance: false
  - type: Club::Guest
"#;

fn write_manifest(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_manifest_from_file() {
    let file = write_manifest(MANIFEST);
    let manifest = FriendlyManifest::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(manifest.owners.len(), 2);
    assert_eq!(manifest.owners[0].owner_type, "Club::Member");
    assert_eq!(manifest.owners[0].options.friendship_class, "Buddy");
    assert!(!manifest.owners[0].options.require_acceptance);
    assert_eq!(manifest.owners[1].options, FriendlyOptions::default());
}

#[test]
fn test_invalid_manifest_file_reports_path() {
    let file = write_manifest("owners: {not: [a list");
    let path = file.path().to_str().unwrap().to_string();

    let err = FriendlyManifest::from_yaml_file(&path).unwrap_err();
    match err {
        ConfigError::ParseError { file, .. } => assert_eq!(file, Some(path)),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_manifest_declarations_drive_operations() {
    let registry = FriendlyRegistry::new(Arc::new(InMemoryRepository::new()));
    let manifest = FriendlyManifest::from_yaml_str(MANIFEST).unwrap();
    registry.load_manifest(&manifest).unwrap();

    let members = registry.friendly::<Member>().unwrap();
    assert_eq!(members.definition().join_type.to_string(), "Club::Buddy");
    assert_eq!(members.config().target_key, "buddy_id");

    let (a, b) = (Member { id: Uuid::new_v4() }, Member { id: Uuid::new_v4() });
    members.request_friendship(&a, &b).await.unwrap();
    assert_eq!(members.friends(&b).await.unwrap(), vec![a.id]);

    let guests = registry.friendly::<Guest>().unwrap();
    let (x, y) = (Guest { id: Uuid::new_v4() }, Guest { id: Uuid::new_v4() });
    guests.request_friendship(&x, &y).await.unwrap();
    assert!(guests.friends(&y).await.unwrap().is_empty());
    assert_eq!(guests.friendships_to_accept(&y).await.unwrap(), vec![x.id]);
}

#[test]
fn test_manifest_then_conflicting_declaration_fails_fast() {
    let registry = FriendlyRegistry::new(Arc::new(InMemoryRepository::new()));
    registry
        .load_manifest(&FriendlyManifest::from_yaml_str(MANIFEST).unwrap())
        .unwrap();

    // The manifest said Buddy without acceptance; defaults now conflict
    let err = registry
        .enable_friendly::<Member>(FriendlyOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConfigError::ConflictingOptions { .. }));

    // Same options as the manifest are accepted
    let same = FriendlyOptions::new()
        .friendship_class("Buddy")
        .require_acceptance(false);
    assert!(registry.enable_friendly::<Member>(same).is_ok());
}

#[test]
fn test_relations_listed_per_owner() {
    let registry = FriendlyRegistry::new(Arc::new(InMemoryRepository::new()));
    registry
        .load_manifest(&FriendlyManifest::from_yaml_str(MANIFEST).unwrap())
        .unwrap();

    let relations = registry.relations_for("Club::Member");
    assert_eq!(relations.len(), 2);
    assert_eq!(relations[0].name, "requested_buddies");
    assert_eq!(relations[0].foreign_key, "member_id");
    assert_eq!(relations[0].direction, RelationDirection::Requested);
    assert_eq!(relations[1].name, "received_buddies");
    assert_eq!(relations[1].foreign_key, "buddy_id");

    assert!(registry.relations_for("Club::Unknown").is_empty());
}

#[test]
fn test_declaration_does_not_block_on_runtime() {
    // Declaration is synchronous; only operations are async
    let registry = FriendlyRegistry::new(Arc::new(InMemoryRepository::new()));
    let members = registry
        .enable_friendly::<Member>(FriendlyOptions::default())
        .unwrap();

    let (a, b) = (Member { id: Uuid::new_v4() }, Member { id: Uuid::new_v4() });
    let status = tokio_test::block_on(members.friendship_status(&a, &b)).unwrap();
    assert_eq!(status, FriendshipStatus::None);
}

#[test]
fn test_failed_manifest_declaration_leaves_no_trace() {
    let registry = FriendlyRegistry::new(Arc::new(InMemoryRepository::new()));
    let manifest = FriendlyManifest::from_yaml_str(
        r#"
owners:
  - type: Club::Member
    friendship_class: Club::Pairing
  - type: Club::Guest
    friendship_class: Club::Pairing
"#,
    )
    .unwrap();

    let err = registry.load_manifest(&manifest).unwrap_err();
    assert!(matches!(err, ConfigError::JoinTypeConflict { ref owner_type, .. } if owner_type == "Club::Guest"));

    // Member was declared before the failure; Guest was not
    assert!(registry.friendly::<Member>().is_ok());
    assert_eq!(
        registry.friendly::<Guest>().unwrap_err().error_code(),
        "UNDECLARED_OWNER_TYPE"
    );

    let guests = registry
        .enable_friendly::<Guest>(FriendlyOptions::default())
        .unwrap();
    assert_eq!(guests.definition().join_type.to_string(), "Club::Friendship");
}
