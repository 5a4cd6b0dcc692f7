//! Registry caching resolved configs and materialized join types
//!
//! The registry is the arena behind `enable_friendly`: one
//! [`FriendlyConfig`] per owner type and one [`FriendshipDefinition`] per
//! join type, both written once and shared by reference afterwards.

use crate::config::{FriendlyConfig, FriendlyManifest, FriendlyOptions};
use crate::core::entity::Entity;
use crate::core::error::ConfigError;
use crate::core::events::EventBus;
use crate::core::friendship::{FriendshipDefinition, RelationInfo};
use crate::core::naming::TypePath;
use crate::core::repository::Repository;
use crate::engine::friendly::Friendly;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of friendly owner types
pub struct FriendlyRegistry {
    repository: Arc<dyn Repository>,
    events: Option<EventBus>,
    /// owner type path -> resolved config
    configs: RwLock<HashMap<String, Arc<FriendlyConfig>>>,
    /// join type path -> materialized definition
    definitions: RwLock<HashMap<String, Arc<FriendshipDefinition>>>,
}

impl FriendlyRegistry {
    /// Create a registry whose join rows live in `repository`
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self {
            repository,
            events: None,
            configs: RwLock::new(HashMap::new()),
            definitions: RwLock::new(HashMap::new()),
        }
    }

    /// Publish friendship events on `bus`
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.events.as_ref()
    }

    /// Declare `T` friendly and return its operations
    ///
    /// Resolves (or reuses) the config, materializes the join type on first
    /// declaration, and binds both to the registry's repository. Declaring
    /// the same type again with the same options is a no-op that returns an
    /// equivalent handle; different options fail with
    /// [`ConfigError::ConflictingOptions`]. A failed declaration caches
    /// nothing.
    pub fn enable_friendly<T: Entity>(
        &self,
        options: FriendlyOptions,
    ) -> Result<Friendly<T>, ConfigError> {
        let (config, definition) = self.declare(T::type_path(), &options)?;

        Ok(Friendly::new(
            config,
            definition,
            Arc::clone(&self.repository),
            self.events.clone(),
        ))
    }

    /// Operations for an owner type that was already declared (e.g. by a manifest)
    pub fn friendly<T: Entity>(&self) -> Result<Friendly<T>, ConfigError> {
        let owner = TypePath::parse(T::type_path())?;
        let config = self
            .config(&owner.to_string())
            .ok_or_else(|| ConfigError::Undeclared {
                owner_type: owner.to_string(),
            })?;
        let definition = self.materialize(&config)?;

        Ok(Friendly::new(
            config,
            definition,
            Arc::clone(&self.repository),
            self.events.clone(),
        ))
    }

    /// Resolve the config of `owner_type`, caching it on first use
    pub fn resolve(
        &self,
        owner_type: &str,
        options: &FriendlyOptions,
    ) -> Result<Arc<FriendlyConfig>, ConfigError> {
        let key = TypePath::parse(owner_type)?.to_string();

        if let Some(cached) = self.cached(&key, options)? {
            return Ok(cached);
        }

        let mut configs = self.configs.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have resolved it between the two locks
        if let Some(existing) = configs.get(&key) {
            return Self::reuse(existing, options);
        }

        let config = Arc::new(FriendlyConfig::resolve(&key, options)?);
        configs.insert(key.clone(), Arc::clone(&config));

        tracing::debug!(
            owner_type = %key,
            join_type = %config.friendship_type_name,
            require_acceptance = config.require_acceptance,
            "Resolved friendly config"
        );

        Ok(config)
    }

    /// Resolve the config of `owner_type` and materialize its join type
    ///
    /// Both maps are written together: when the join type conflicts, a
    /// config resolved by this call is dropped instead of cached. Locks are
    /// taken configs first, then definitions.
    pub fn declare(
        &self,
        owner_type: &str,
        options: &FriendlyOptions,
    ) -> Result<(Arc<FriendlyConfig>, Arc<FriendshipDefinition>), ConfigError> {
        let key = TypePath::parse(owner_type)?.to_string();

        let mut configs = self.configs.write().unwrap_or_else(PoisonError::into_inner);
        let (config, fresh) = match configs.get(&key) {
            Some(existing) => (Self::reuse(existing, options)?, false),
            None => (Arc::new(FriendlyConfig::resolve(&key, options)?), true),
        };

        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let definition = Self::materialize_into(&mut definitions, &config)?;

        if fresh {
            configs.insert(key.clone(), Arc::clone(&config));
            tracing::debug!(
                owner_type = %key,
                join_type = %config.friendship_type_name,
                require_acceptance = config.require_acceptance,
                "Resolved friendly config"
            );
        }

        Ok((config, definition))
    }

    /// The cached config of `owner_type`, if declared
    pub fn config(&self, owner_type: &str) -> Option<Arc<FriendlyConfig>> {
        let key = TypePath::parse(owner_type).ok()?.to_string();
        let configs = self.configs.read().unwrap_or_else(PoisonError::into_inner);
        configs.get(&key).cloned()
    }

    /// Materialize the join type for `config`, once per join type name
    pub fn materialize(
        &self,
        config: &FriendlyConfig,
    ) -> Result<Arc<FriendshipDefinition>, ConfigError> {
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Self::materialize_into(&mut definitions, config)
    }

    fn materialize_into(
        definitions: &mut HashMap<String, Arc<FriendshipDefinition>>,
        config: &FriendlyConfig,
    ) -> Result<Arc<FriendshipDefinition>, ConfigError> {
        let join_type = config.friendship_type_name.to_string();

        if let Some(existing) = definitions.get(&join_type) {
            if existing.owner_type != config.owner_type
                || existing.requester_key != config.requester_key
                || existing.target_key != config.target_key
            {
                return Err(ConfigError::JoinTypeConflict {
                    join_type,
                    existing_owner: existing.owner_type.to_string(),
                    owner_type: config.owner_type.to_string(),
                });
            }
            return Ok(Arc::clone(existing));
        }

        let definition = Arc::new(FriendshipDefinition::new(
            config.friendship_type_name.clone(),
            config.owner_type.clone(),
            config.requester_key.clone(),
            config.target_key.clone(),
        ));
        definitions.insert(join_type, Arc::clone(&definition));

        tracing::info!(
            join_type = %definition.join_type,
            owner_type = %definition.owner_type,
            table = %definition.table_name,
            "Materialized friendship join type"
        );

        Ok(definition)
    }

    /// Resolve and materialize every declaration of a manifest
    pub fn load_manifest(
        &self,
        manifest: &FriendlyManifest,
    ) -> Result<Vec<Arc<FriendlyConfig>>, ConfigError> {
        manifest
            .owners
            .iter()
            .map(|declaration| {
                let (config, _) = self.declare(&declaration.owner_type, &declaration.options)?;
                Ok(config)
            })
            .collect()
    }

    /// The definition of a materialized join type
    pub fn definition(&self, join_type: &str) -> Option<Arc<FriendshipDefinition>> {
        let key = TypePath::parse(join_type).ok()?.to_string();
        let definitions = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        definitions.get(&key).cloned()
    }

    /// All materialized join types, sorted by name
    pub fn definitions(&self) -> Vec<Arc<FriendshipDefinition>> {
        let definitions = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<_> = definitions.values().cloned().collect();
        all.sort_by_key(|definition| definition.join_type.to_string());
        all
    }

    /// Traversals registered on `owner_type`
    pub fn relations_for(&self, owner_type: &str) -> Vec<RelationInfo> {
        self.config(owner_type)
            .and_then(|config| self.definition(&config.friendship_type_name.to_string()))
            .map(|definition| definition.relations())
            .unwrap_or_default()
    }

    /// DDL for every materialized join type
    pub fn schema_sql(&self) -> String {
        self.definitions()
            .iter()
            .map(|definition| definition.create_table_sql())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn cached(
        &self,
        key: &str,
        options: &FriendlyOptions,
    ) -> Result<Option<Arc<FriendlyConfig>>, ConfigError> {
        let configs = self.configs.read().unwrap_or_else(PoisonError::into_inner);
        configs
            .get(key)
            .map(|existing| Self::reuse(existing, options))
            .transpose()
    }

    fn reuse(
        existing: &Arc<FriendlyConfig>,
        options: &FriendlyOptions,
    ) -> Result<Arc<FriendlyConfig>, ConfigError> {
        if existing.options() != options {
            return Err(ConfigError::ConflictingOptions {
                owner_type: existing.owner_type.to_string(),
            });
        }
        Ok(Arc::clone(existing))
    }
}
