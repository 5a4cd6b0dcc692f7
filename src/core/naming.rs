//! Type paths and naming inflections
//!
//! Everything the engine names (join types, foreign keys, tables, traversals)
//! is derived from an owner's type path such as `"Social::User"`.

use crate::core::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Separator between namespace segments in a type path
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Suffix appended to foreign key names
pub const KEY_SUFFIX: &str = "_id";

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"))
}

/// Whether `name` is usable as a type segment or column name
pub fn is_identifier(name: &str) -> bool {
    identifier_regex().is_match(name)
}

/// A namespace-qualified type name
///
/// `"Social::Admin::User"` has namespace `["Social", "Admin"]` and simple
/// name `"User"`. A bare `"User"` lives in the root namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypePath {
    namespace: Vec<String>,
    name: String,
}

impl TypePath {
    /// Parse a type path, rejecting empty or non-identifier segments
    ///
    /// # Examples
    ///
    /// ```
    /// use friendly::core::naming::TypePath;
    ///
    /// let path = TypePath::parse("Social::User").unwrap();
    /// assert_eq!(path.simple_name(), "User");
    /// assert_eq!(path.namespace(), &["Social".to_string()]);
    ///
    /// assert!(TypePath::parse("Social::").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self, ConfigError> {
        let malformed = |message: &str| ConfigError::MalformedTypePath {
            path: path.to_string(),
            message: message.to_string(),
        };

        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(malformed("type path is empty"));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split(NAMESPACE_SEPARATOR) {
            if segment.is_empty() {
                return Err(malformed("empty namespace segment"));
            }
            if !is_identifier(segment) {
                return Err(malformed(&format!("'{}' is not an identifier", segment)));
            }
            segments.push(segment.to_string());
        }

        let name = segments
            .pop()
            .ok_or_else(|| malformed("no simple name"))?;

        Ok(Self {
            namespace: segments,
            name,
        })
    }

    /// The simple (non-namespaced) name
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Namespace segments, outermost first
    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    pub fn is_qualified(&self) -> bool {
        !self.namespace.is_empty()
    }

    /// Build a sibling path: `name` inside this path's namespace
    pub fn sibling(&self, name: &str) -> Result<Self, ConfigError> {
        let mut qualified = self.namespace.join(NAMESPACE_SEPARATOR);
        if !qualified.is_empty() {
            qualified.push_str(NAMESPACE_SEPARATOR);
        }
        qualified.push_str(name);
        Self::parse(&qualified)
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.namespace {
            write!(f, "{}{}", segment, NAMESPACE_SEPARATOR)?;
        }
        write!(f, "{}", self.name)
    }
}

impl TryFrom<String> for TypePath {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypePath> for String {
    fn from(value: TypePath) -> Self {
        value.to_string()
    }
}

/// String inflections used to derive keys and table names
pub struct Inflector;

impl Inflector {
    /// Convert a CamelCase name to snake_case
    ///
    /// # Examples
    ///
    /// ```
    /// use friendly::core::naming::Inflector;
    ///
    /// assert_eq!(Inflector::underscore("User"), "user");
    /// assert_eq!(Inflector::underscore("SocialUser"), "social_user");
    /// assert_eq!(Inflector::underscore("HTTPClient"), "http_client");
    /// ```
    pub fn underscore(name: &str) -> String {
        let chars: Vec<char> = name.chars().collect();
        let mut out = String::with_capacity(name.len() + 4);

        for (i, &c) in chars.iter().enumerate() {
            if c.is_uppercase() {
                let prev = i.checked_sub(1).map(|p| chars[p]);
                let next = chars.get(i + 1).copied();
                let boundary = match prev {
                    Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                    Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                    _ => false,
                };
                if boundary && !out.ends_with('_') {
                    out.push('_');
                }
                out.extend(c.to_lowercase());
            } else {
                out.push(c);
            }
        }

        out
    }

    /// Strip the namespace from a type path string
    pub fn demodulize(path: &str) -> &str {
        path.rsplit(NAMESPACE_SEPARATOR).next().unwrap_or(path)
    }

    /// Derive the foreign key name for a simple type name (`User` → `user_id`)
    pub fn foreign_key(simple_name: &str) -> String {
        format!("{}{}", Self::underscore(simple_name), KEY_SUFFIX)
    }

    /// Derive a table name for a type path (`Social::Friendship` → `social_friendships`)
    pub fn tableize(path: &TypePath) -> String {
        let mut parts: Vec<String> = path
            .namespace()
            .iter()
            .map(|segment| Self::underscore(segment))
            .collect();
        parts.push(Pluralizer::pluralize(&Self::underscore(path.simple_name())));
        parts.join("_")
    }
}

/// Utility for converting singular English nouns to their plural form
pub struct Pluralizer;

impl Pluralizer {
    /// Convert a singular noun to its plural form
    ///
    /// # Examples
    ///
    /// ```
    /// use friendly::core::naming::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("friendship"), "friendships");
    /// assert_eq!(Pluralizer::pluralize("company"), "companies");
    /// assert_eq!(Pluralizer::pluralize("address"), "addresses");
    /// ```
    pub fn pluralize(singular: &str) -> String {
        if singular.is_empty() {
            return singular.to_string();
        }

        match singular {
            s if s.ends_with('y')
                && s.len() > 1
                && !["ay", "ey", "iy", "oy", "uy"].iter().any(|v| s.ends_with(v)) =>
            {
                format!("{}ies", &s[..s.len() - 1])
            }

            s if ["s", "sh", "ch", "x", "z"].iter().any(|e| s.ends_with(e)) => {
                format!("{}es", s)
            }

            s if s.ends_with("fe") && s.len() > 2 => format!("{}ves", &s[..s.len() - 2]),

            s if s.ends_with('f') && s.len() > 1 => format!("{}ves", &s[..s.len() - 1]),

            s => format!("{}s", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_path() {
        let path = TypePath::parse("User").unwrap();
        assert_eq!(path.simple_name(), "User");
        assert!(path.namespace().is_empty());
        assert!(!path.is_qualified());
        assert_eq!(path.to_string(), "User");
    }

    #[test]
    fn test_parse_nested_path() {
        let path = TypePath::parse("Social::Admin::User").unwrap();
        assert_eq!(path.simple_name(), "User");
        assert_eq!(path.namespace(), &["Social", "Admin"]);
        assert!(path.is_qualified());
        assert_eq!(path.to_string(), "Social::Admin::User");
    }

    #[test]
    fn test_parse_rust_type_name() {
        let path = TypePath::parse("my_app::models::User").unwrap();
        assert_eq!(path.simple_name(), "User");
        assert_eq!(path.namespace(), &["my_app", "models"]);
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        for bad in ["", "   ", "::User", "Social::", "Social::::User", "User<T>", "9User"] {
            let err = TypePath::parse(bad).unwrap_err();
            assert_eq!(err.error_code(), "MALFORMED_TYPE_PATH", "accepted '{}'", bad);
        }
    }

    #[test]
    fn test_sibling_keeps_namespace() {
        let owner = TypePath::parse("Social::User").unwrap();
        let sibling = owner.sibling("Friendship").unwrap();
        assert_eq!(sibling.to_string(), "Social::Friendship");

        let root = TypePath::parse("User").unwrap();
        assert_eq!(root.sibling("Friendship").unwrap().to_string(), "Friendship");
    }

    #[test]
    fn test_type_path_serde() {
        let path: TypePath = serde_json::from_str("\"Social::User\"").unwrap();
        assert_eq!(path.simple_name(), "User");
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"Social::User\"");

        assert!(serde_json::from_str::<TypePath>("\"Social::\"").is_err());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("user_id"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier("user-id"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_underscore() {
        assert_eq!(Inflector::underscore("User"), "user");
        assert_eq!(Inflector::underscore("SocialUser"), "social_user");
        assert_eq!(Inflector::underscore("HTTPClient"), "http_client");
        assert_eq!(Inflector::underscore("User2Profile"), "user2_profile");
        assert_eq!(Inflector::underscore("already_snake"), "already_snake");
    }

    #[test]
    fn test_demodulize() {
        assert_eq!(Inflector::demodulize("Social::Friendship"), "Friendship");
        assert_eq!(Inflector::demodulize("Friendship"), "Friendship");
    }

    #[test]
    fn test_foreign_key() {
        assert_eq!(Inflector::foreign_key("User"), "user_id");
        assert_eq!(Inflector::foreign_key("Friendship"), "friendship_id");
        assert_eq!(Inflector::foreign_key("SocialUser"), "social_user_id");
    }

    #[test]
    fn test_tableize() {
        let path = TypePath::parse("Social::Friendship").unwrap();
        assert_eq!(Inflector::tableize(&path), "social_friendships");

        let path = TypePath::parse("BuddyRequest").unwrap();
        assert_eq!(Inflector::tableize(&path), "buddy_requests");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(Pluralizer::pluralize("friendship"), "friendships");
        assert_eq!(Pluralizer::pluralize("company"), "companies");
        assert_eq!(Pluralizer::pluralize("day"), "days");
        assert_eq!(Pluralizer::pluralize("box"), "boxes");
        assert_eq!(Pluralizer::pluralize("knife"), "knives");
        assert_eq!(Pluralizer::pluralize("wolf"), "wolves");
        assert_eq!(Pluralizer::pluralize(""), "");
    }
}
