

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::policy::{GuardMode, GuardPolicy};
use super::repository::GuardedRepository;
use crate::core::{Result, UndeletableError};
use crate::db::Repository;

/// Entity name to guard, written once per entity at setup time.
#[derive(Default)]
pub struct GuardRegistry {
    entries: RwLock<HashMap<String, Arc<GuardedRepository>>>,
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `repository` in a guard. Fails if the entity is already guarded.
    pub fn register(
        &self,
        repository: Arc<dyn Repository>,
        mode: GuardMode,
    ) -> Result<Arc<GuardedRepository>> {
        let entity = repository.entity().to_string();
        if repository.is_guarded() {
            return Err(UndeletableError::AlreadyGuarded(entity));
        }

        let mut entries = self.entries.write();
        if entries.contains_key(&entity) {
            return Err(UndeletableError::AlreadyGuarded(entity));
        }

        let guarded = Arc::new(GuardedRepository::new(repository, mode));
        entries.insert(entity.clone(), Arc::clone(&guarded));
        info!("Registered {} as undeletable ({})", entity, mode);

        Ok(guarded)
    }

    pub fn lookup(&self, entity: &str) -> Option<Arc<GuardedRepository>> {
        self.entries.read().get(entity).cloned()
    }

    pub fn policy(&self, entity: &str) -> GuardPolicy {
        self.entries
            .read()
            .get(entity)
            .map(|guarded| guarded.policy())
            .unwrap_or_default()
    }

    pub fn is_guarded(&self, entity: &str) -> bool {
        self.entries.read().contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl std::fmt::Debug for GuardRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read();
        let mut names: Vec<&String> = entries.keys().collect();
        names.sort();
        write!(f, "GuardRegistry({:?})", names)
    }
}
