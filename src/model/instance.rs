

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use super::model::Model;
use super::relation::Relation;
use crate::core::Result;
use crate::db::{Record, RecordId, Scope};
use crate::guard::GuardPolicy;


pub struct Instance {
    model: Model,
    record: Record,
    destroyed: AtomicBool,
    associations: Mutex<HashMap<String, Arc<Relation>>>,
}

impl Instance {
    pub(crate) fn new(model: Model, record: Record) -> Self {
        Self {
            model,
            record,
            destroyed: AtomicBool::new(false),
            associations: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> RecordId {
        self.record.id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    pub fn to_param(&self) -> String {
        self.record.to_param()
    }

    pub fn is_guarded(&self) -> bool {
        self.model.is_guarded()
    }

    pub fn policy(&self) -> GuardPolicy {
        self.model.policy()
    }

    /// True once a delete or destroy actually removed the row.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub async fn is_persisted(&self) -> Result<bool> {
        self.model.exists(self.id()).await
    }

    pub async fn delete(&self) -> Result<()> {
        let removed = self.model.repository()?.delete(&[self.id()]).await?;
        self.mark_destroyed(removed > 0);
        Ok(())
    }

    /// Runs the destroy callbacks around `delete`. `Ok(false)` if a hook halted.
    pub async fn destroy(&self) -> Result<bool> {
        let repository = self.model.repository()?;
        let destroyed = repository.destroy(&self.record).await?;
        self.mark_destroyed(destroyed && !repository.is_guarded());
        Ok(destroyed)
    }

    pub async fn destroy_strict(&self) -> Result<()> {
        let repository = self.model.repository()?;
        repository.destroy_strict(&self.record).await?;
        self.mark_destroyed(!repository.is_guarded());
        Ok(())
    }

    pub async fn force_delete(&self) -> Result<()> {
        let guarded = self.model.dispatch()?.into_guarded(self.model.name())?;
        let removed = guarded.force_delete(&[self.id()]).await?;
        self.mark_destroyed(removed > 0);
        Ok(())
    }

    pub async fn force_destroy(&self) -> Result<bool> {
        let guarded = self.model.dispatch()?.into_guarded(self.model.name())?;
        let destroyed = guarded.force_destroy(&self.record).await?;
        self.mark_destroyed(destroyed);
        Ok(destroyed)
    }

    pub async fn force_destroy_strict(&self) -> Result<()> {
        let guarded = self.model.dispatch()?.into_guarded(self.model.name())?;
        guarded.force_destroy_strict(&self.record).await?;
        self.mark_destroyed(true);
        Ok(())
    }

    /// The owner's relation for a `has_many` association, cached on this instance.
    pub fn association(&self, name: &str) -> Result<Arc<Relation>> {
        let mut associations = self.associations.lock();
        if let Some(relation) = associations.get(name) {
            return Ok(Arc::clone(relation));
        }

        let catalog = self.model.catalog();
        let definition = catalog.association(self.model.name(), name)?;
        let target = catalog.model(&definition.target)?;
        let relation = Arc::new(Relation::new(
            target,
            Scope::matching(definition.foreign_key, self.id()),
        ));

        associations.insert(name.to_string(), Arc::clone(&relation));
        Ok(relation)
    }

    fn mark_destroyed(&self, removed: bool) {
        if removed {
            self.destroyed.store(true, Ordering::SeqCst);
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("entity", &self.record.entity)
            .field("id", &self.record.id)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
