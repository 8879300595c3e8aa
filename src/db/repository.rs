

use async_trait::async_trait;

use super::callbacks::Callbacks;
use super::record::{Attributes, Record, RecordId, Scope};
use crate::core::{Result, UndeletableError};

/// Persistence operations of one entity type.
///
/// Backends implement the primitive operations (`insert`, `find`, `select`,
/// `count`, `delete`, `delete_all`). The destroy family has default
/// implementations expressed through `delete` and the entity's callbacks, so a
/// decorator that intercepts `delete` changes destroy semantics with it.
#[async_trait]
pub trait Repository: Send + Sync {

    fn entity(&self) -> &str;


    fn callbacks(&self) -> &Callbacks;


    fn is_guarded(&self) -> bool {
        false
    }

    async fn insert(&self, attributes: Attributes) -> Result<Record>;

    async fn find(&self, id: RecordId) -> Result<Option<Record>>;

    async fn select(&self, scope: &Scope) -> Result<Vec<Record>>;

    async fn count(&self, scope: &Scope) -> Result<usize> {
        Ok(self.select(scope).await?.len())
    }

    async fn exists(&self, id: RecordId) -> Result<bool> {
        Ok(self.find(id).await?.is_some())
    }

    /// Removes rows by primary key without callbacks. Returns the number removed.
    async fn delete(&self, ids: &[RecordId]) -> Result<usize>;

    /// Removes every row matched by `scope` without callbacks.
    async fn delete_all(&self, scope: &Scope) -> Result<usize>;

    /// Callback-wrapped delete. `Ok(false)` when a before hook halted.
    async fn destroy(&self, record: &Record) -> Result<bool> {
        let ids = [record.id];
        let outcome = self
            .callbacks()
            .run_destroy(record, || self.delete(&ids))
            .await?;
        Ok(outcome.is_some())
    }

    async fn destroy_strict(&self, record: &Record) -> Result<()> {
        if self.destroy(record).await? {
            Ok(())
        } else {
            Err(UndeletableError::not_destroyed(self.entity(), record.id))
        }
    }

    /// Loads the matched set, then destroys each record. Returns the matched records.
    async fn destroy_all(&self, scope: &Scope) -> Result<Vec<Record>> {
        let records = self.select(scope).await?;
        for record in &records {
            self.destroy(record).await?;
        }
        Ok(records)
    }
}

