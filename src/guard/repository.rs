

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::policy::{GuardMode, GuardPolicy};
use crate::core::{Result, UndeletableError, debug_enabled};
use crate::db::{Attributes, Callbacks, Record, RecordId, Repository, Scope};

/// Decorator that intercepts every deletion path of the wrapped repository.
///
/// Reads pass straight through. `delete` and `delete_all` become a no-op
/// (silent) or a `ProtectedRecord` error (raising). `destroy` keeps running the
/// entity's callbacks around the intercepted delete; `destroy_strict` always
/// fails with `RecordNotDestroyed`. In silent mode the wrapped repository stays
/// reachable through the `force_*` methods.
pub struct GuardedRepository {
    inner: Arc<dyn Repository>,
    mode: GuardMode,
}

impl GuardedRepository {
    pub(crate) fn new(inner: Arc<dyn Repository>, mode: GuardMode) -> Self {
        info!("GuardedRepository initialized for {} (mode={})", inner.entity(), mode);
        Self { inner, mode }
    }

    pub fn mode(&self) -> GuardMode {
        self.mode
    }

    pub fn policy(&self) -> GuardPolicy {
        self.mode.into()
    }

    /// The un-intercepted repository this guard wraps.
    pub fn original(&self) -> &Arc<dyn Repository> {
        &self.inner
    }


    fn intercept(&self, operation: &str, ids: &[RecordId]) -> Result<()> {
        match self.mode {
            GuardMode::Raising => {
                warn!("Rejected {}.{} {:?}: entity is undeletable", self.entity(), operation, ids);
                Err(UndeletableError::protected(self.entity(), ids))
            }
            GuardMode::Silent => {
                if debug_enabled() {
                    debug!("will not {}.{} {:?}", self.entity(), operation, ids);
                }
                Ok(())
            }
        }
    }


    fn bypass(&self) -> Result<&Arc<dyn Repository>> {
        match self.mode {
            GuardMode::Silent => Ok(&self.inner),
            GuardMode::Raising => Err(UndeletableError::BypassUnavailable(self.entity().to_string())),
        }
    }

    pub async fn force_delete(&self, ids: &[RecordId]) -> Result<usize> {
        let original = self.bypass()?;
        info!("Force deleting {} {:?}", self.entity(), ids);
        original.delete(ids).await
    }

    pub async fn force_delete_all(&self, scope: &Scope) -> Result<usize> {
        let original = self.bypass()?;
        info!("Force deleting all {} matching {:?}", self.entity(), scope);
        original.delete_all(scope).await
    }

    pub async fn force_destroy(&self, record: &Record) -> Result<bool> {
        let original = self.bypass()?;
        info!("Force destroying {}#{}", self.entity(), record.id);
        original.destroy(record).await
    }

    pub async fn force_destroy_strict(&self, record: &Record) -> Result<()> {
        let original = self.bypass()?;
        info!("Force destroying! {}#{}", self.entity(), record.id);
        original.destroy_strict(record).await
    }
}

impl std::fmt::Debug for GuardedRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GuardedRepository({}, mode={})", self.inner.entity(), self.mode)
    }
}

#[async_trait]
impl Repository for GuardedRepository {
    fn entity(&self) -> &str {
        self.inner.entity()
    }

    fn callbacks(&self) -> &Callbacks {
        self.inner.callbacks()
    }

    fn is_guarded(&self) -> bool {
        true
    }

    async fn insert(&self, attributes: Attributes) -> Result<Record> {
        self.inner.insert(attributes).await
    }

    async fn find(&self, id: RecordId) -> Result<Option<Record>> {
        self.inner.find(id).await
    }

    async fn select(&self, scope: &Scope) -> Result<Vec<Record>> {
        self.inner.select(scope).await
    }

    async fn count(&self, scope: &Scope) -> Result<usize> {
        self.inner.count(scope).await
    }

    async fn exists(&self, id: RecordId) -> Result<bool> {
        self.inner.exists(id).await
    }

    async fn delete(&self, ids: &[RecordId]) -> Result<usize> {
        self.intercept("delete", ids)?;
        Ok(0)
    }

    async fn delete_all(&self, _scope: &Scope) -> Result<usize> {
        self.intercept("delete_all", &[])?;
        Ok(0)
    }

    async fn destroy_strict(&self, record: &Record) -> Result<()> {
        warn!("Rejected {}#{}.destroy!: entity is undeletable", self.entity(), record.id);
        Err(UndeletableError::not_destroyed(self.entity(), record.id))
    }

    // Never delegates to the wrapped bulk operation: every matched record goes
    // through the default `destroy`, whose delete step is the guarded `delete`.
    // An empty match still rejects in raising mode.
    async fn destroy_all(&self, scope: &Scope) -> Result<Vec<Record>> {
        let records = self.inner.select(scope).await?;
        if records.is_empty() {
            self.intercept("destroy_all", &[])?;
        } else if debug_enabled() {
            debug!("will not {}.destroy_all ({} matched)", self.entity(), records.len());
        }

        for record in &records {
            self.destroy(record).await?;
        }
        Ok(records)
    }
}
