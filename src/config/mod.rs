//! Friendship configuration: options, resolution, and manifest loading

use crate::core::error::ConfigError;
use crate::core::naming::{Inflector, NAMESPACE_SEPARATOR, TypePath, is_identifier};
use serde::{Deserialize, Serialize};

/// Default simple name of the join type
pub const DEFAULT_FRIENDSHIP_CLASS: &str = "Friendship";

fn default_friendship_class() -> String {
    DEFAULT_FRIENDSHIP_CLASS.to_string()
}

fn default_require_acceptance() -> bool {
    true
}

/// Options accepted when declaring an owner type friendly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendlyOptions {
    /// Join type name. A bare name is placed in the owner's namespace, a
    /// name containing `::` is used as-is, and a leading `::` pins it to
    /// the root namespace.
    #[serde(default = "default_friendship_class")]
    pub friendship_class: String,

    /// Whether a request must be confirmed before both sides see the friendship
    #[serde(default = "default_require_acceptance")]
    pub require_acceptance: bool,

    /// Override for the requester foreign key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_key: Option<String>,

    /// Override for the target foreign key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_key: Option<String>,
}

impl Default for FriendlyOptions {
    fn default() -> Self {
        Self {
            friendship_class: default_friendship_class(),
            require_acceptance: default_require_acceptance(),
            requester_key: None,
            target_key: None,
        }
    }
}

impl FriendlyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn friendship_class(mut self, name: impl Into<String>) -> Self {
        self.friendship_class = name.into();
        self
    }

    pub fn require_acceptance(mut self, required: bool) -> Self {
        self.require_acceptance = required;
        self
    }

    pub fn requester_key(mut self, key: impl Into<String>) -> Self {
        self.requester_key = Some(key.into());
        self
    }

    pub fn target_key(mut self, key: impl Into<String>) -> Self {
        self.target_key = Some(key.into());
        self
    }
}

/// Resolved friendship configuration for one owner type
///
/// Immutable once resolved. The registry keeps exactly one per owner type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FriendlyConfig {
    /// The type that declared the relationship
    pub owner_type: TypePath,

    /// Fully qualified name of the join type
    pub friendship_type_name: TypePath,

    /// Simple name of the owner type
    pub reference_model_name: String,

    /// Join-type foreign key pointing at the initiator
    pub requester_key: String,

    /// Join-type foreign key pointing at the recipient
    pub target_key: String,

    pub require_acceptance: bool,

    /// Options the config was resolved from
    #[serde(skip)]
    options: FriendlyOptions,
}

impl FriendlyConfig {
    /// Resolve the configuration of `owner_type` from `options`
    ///
    /// Pure: nothing is cached and no join type is materialized here.
    ///
    /// ```
    /// use friendly::config::{FriendlyConfig, FriendlyOptions};
    ///
    /// let config = FriendlyConfig::resolve("Social::User", &FriendlyOptions::default()).unwrap();
    /// assert_eq!(config.friendship_type_name.to_string(), "Social::Friendship");
    /// assert_eq!(config.reference_model_name, "User");
    /// assert_eq!(config.requester_key, "user_id");
    /// assert_eq!(config.target_key, "friendship_id");
    /// assert!(config.require_acceptance);
    /// ```
    pub fn resolve(owner_type: &str, options: &FriendlyOptions) -> Result<Self, ConfigError> {
        let owner = TypePath::parse(owner_type)?;
        let reference_model_name = owner.simple_name().to_string();
        let friendship_type_name = Self::qualify_join_type(&owner, &options.friendship_class)?;

        let requester_key = match &options.requester_key {
            Some(key) => Self::validate_key(&owner, "requester_key", key)?,
            None => Inflector::foreign_key(&reference_model_name),
        };
        let target_key = match &options.target_key {
            Some(key) => Self::validate_key(&owner, "target_key", key)?,
            None => Inflector::foreign_key(friendship_type_name.simple_name()),
        };

        if requester_key == target_key {
            return Err(ConfigError::InvalidOption {
                owner_type: owner.to_string(),
                option: "target_key".to_string(),
                message: format!(
                    "requester and target keys are both '{}'; pass an explicit target_key",
                    target_key
                ),
            });
        }

        Ok(Self {
            owner_type: owner,
            friendship_type_name,
            reference_model_name,
            requester_key,
            target_key,
            require_acceptance: options.require_acceptance,
            options: options.clone(),
        })
    }

    /// The options this config was resolved from
    pub fn options(&self) -> &FriendlyOptions {
        &self.options
    }

    fn qualify_join_type(owner: &TypePath, friendship_class: &str) -> Result<TypePath, ConfigError> {
        let class = friendship_class.trim();
        if let Some(rooted) = class.strip_prefix(NAMESPACE_SEPARATOR) {
            TypePath::parse(rooted)
        } else if class.contains(NAMESPACE_SEPARATOR) {
            TypePath::parse(class)
        } else {
            owner.sibling(class)
        }
    }

    fn validate_key(owner: &TypePath, option: &str, key: &str) -> Result<String, ConfigError> {
        if is_identifier(key) {
            Ok(key.to_string())
        } else {
            Err(ConfigError::InvalidOption {
                owner_type: owner.to_string(),
                option: option.to_string(),
                message: format!("'{}' is not a valid column name", key),
            })
        }
    }
}

/// One owner type declared in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendlyDeclaration {
    /// Owner type path (e.g. "Social::User")
    #[serde(rename = "type")]
    pub owner_type: String,

    #[serde(flatten)]
    pub options: FriendlyOptions,
}

/// A set of friendly declarations loaded from YAML
///
/// ```yaml
/// owners:
///   - type: Social::User
///   - type: Game::Player
///     friendship_class: Buddy
///     require_acceptance: false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendlyManifest {
    #[serde(default)]
    pub owners: Vec<FriendlyDeclaration>,
}

impl FriendlyManifest {
    /// Load a manifest from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            },
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })
    }

    /// Load a manifest from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Resolve every declaration, failing on the first bad one
    pub fn resolve_all(&self) -> Result<Vec<FriendlyConfig>, ConfigError> {
        self.owners
            .iter()
            .map(|declaration| FriendlyConfig::resolve(&declaration.owner_type, &declaration.options))
            .collect()
    }
}
