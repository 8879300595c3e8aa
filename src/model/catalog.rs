

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::Dispatch;
use super::model::Model;
use crate::core::{Result, UndeletableConfig, UndeletableError, configure};
use crate::db::Repository;
use crate::guard::{GuardMode, GuardPolicy, GuardRegistry, GuardedRepository};


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub owner: String,
    pub name: String,
    pub target: String,
    pub foreign_key: String,
}


#[derive(Default)]
struct CatalogState {
    repositories: RwLock<HashMap<String, Arc<dyn Repository>>>,
    associations: RwLock<HashMap<(String, String), Association>>,
    guards: GuardRegistry,
}

/// Entity definitions of one application, plus their guard registrations.
///
/// Cloning is cheap and every clone shares the same definitions.
#[derive(Clone, Default)]
pub struct Catalog {
    state: Arc<CatalogState>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&self, repository: Arc<dyn Repository>) -> Result<Model> {
        let entity = repository.entity().to_string();
        let mut repositories = self.state.repositories.write();
        if repositories.contains_key(&entity) {
            return Err(UndeletableError::AlreadyDefined(entity));
        }

        repositories.insert(entity.clone(), repository);
        debug!("Defined entity {}", entity);

        Ok(Model::new(entity, self.clone()))
    }

    pub fn has_many(&self, owner: &str, name: &str, target: &str, foreign_key: &str) -> Result<()> {
        for entity in [owner, target] {
            if !self.is_defined(entity) {
                return Err(UndeletableError::Unbacked(entity.to_string()));
            }
        }

        let association = Association {
            owner: owner.to_string(),
            name: name.to_string(),
            target: target.to_string(),
            foreign_key: foreign_key.to_string(),
        };
        debug!("{} has_many {} ({}.{})", owner, name, target, foreign_key);
        self.state
            .associations
            .write()
            .insert((owner.to_string(), name.to_string()), association);

        Ok(())
    }

    pub fn association(&self, owner: &str, name: &str) -> Result<Association> {
        self.state
            .associations
            .read()
            .get(&(owner.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| UndeletableError::UnknownAssociation {
                owner: owner.to_string(),
                name: name.to_string(),
            })
    }

    /// Silent mode: deletes become successful no-ops, force paths stay available.
    pub fn guard(&self, entity: &str) -> Result<Arc<GuardedRepository>> {
        self.register(entity, GuardMode::Silent)
    }

    /// Raising mode: deletes fail with `ProtectedRecord`.
    pub fn guard_strict(&self, entity: &str) -> Result<Arc<GuardedRepository>> {
        self.register(entity, GuardMode::Raising)
    }

    pub fn register(&self, entity: &str, mode: GuardMode) -> Result<Arc<GuardedRepository>> {
        let repository = self
            .state
            .repositories
            .read()
            .get(entity)
            .cloned()
            .ok_or_else(|| UndeletableError::Unbacked(entity.to_string()))?;

        self.state.guards.register(repository, mode)
    }

    /// Sets the debug flag and registers every guard declared in `config`.
    pub fn apply(&self, config: &UndeletableConfig) -> Result<()> {
        configure(config);
        for (key, mode) in &config.guards {
            let entity = self.resolve_config_key(key)?;
            self.register(&entity, *mode)?;
        }
        info!("Applied config: {} guarded entit(ies)", config.guards.len());
        Ok(())
    }

    // Config sources fold map keys to lowercase, so a key may name `Item` as `item`.
    fn resolve_config_key(&self, key: &str) -> Result<String> {
        let repositories = self.state.repositories.read();
        if repositories.contains_key(key) {
            return Ok(key.to_string());
        }

        let mut candidates = repositories
            .keys()
            .filter(|entity| entity.eq_ignore_ascii_case(key));
        match (candidates.next(), candidates.next()) {
            (Some(entity), None) => Ok(entity.clone()),
            (Some(_), Some(_)) => Err(UndeletableError::Configuration(format!(
                "guard key {} matches more than one entity",
                key
            ))),
            (None, _) => Err(UndeletableError::Unbacked(key.to_string())),
        }
    }

    pub fn model(&self, entity: &str) -> Result<Model> {
        if !self.is_defined(entity) {
            return Err(UndeletableError::Unbacked(entity.to_string()));
        }
        Ok(Model::new(entity.to_string(), self.clone()))
    }

    pub fn is_defined(&self, entity: &str) -> bool {
        self.state.repositories.read().contains_key(entity)
    }

    pub fn is_guarded(&self, entity: &str) -> bool {
        self.state.guards.is_guarded(entity)
    }

    pub fn policy(&self, entity: &str) -> GuardPolicy {
        self.state.guards.policy(entity)
    }

    pub(crate) fn dispatch(&self, entity: &str) -> Result<Dispatch> {
        if let Some(guarded) = self.state.guards.lookup(entity) {
            return Ok(Dispatch::Guarded(guarded));
        }

        self.state
            .repositories
            .read()
            .get(entity)
            .cloned()
            .map(Dispatch::Plain)
            .ok_or_else(|| UndeletableError::Unbacked(entity.to_string()))
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entities: Vec<String> = self.state.repositories.read().keys().cloned().collect();
        entities.sort();
        f.debug_struct("Catalog")
            .field("entities", &entities)
            .field("guards", &self.state.guards)
            .finish()
    }
}
