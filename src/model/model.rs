

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::Dispatch;
use super::catalog::Catalog;
use super::instance::Instance;
use super::relation::Relation;
use crate::core::Result;
use crate::db::{Attributes, Record, RecordId, Repository, Scope};
use crate::guard::GuardPolicy;

/// Type-level handle for one entity: creation, lookup and the bulk entry points.
#[derive(Clone)]
pub struct Model {
    name: String,
    catalog: Catalog,
}

impl Model {
    pub(crate) fn new(name: String, catalog: Catalog) -> Self {
        Self { name, catalog }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_guarded(&self) -> bool {
        self.catalog.is_guarded(&self.name)
    }

    pub fn policy(&self) -> GuardPolicy {
        self.catalog.policy(&self.name)
    }

    pub(crate) fn dispatch(&self) -> Result<Dispatch> {
        self.catalog.dispatch(&self.name)
    }

    pub(crate) fn repository(&self) -> Result<Arc<dyn Repository>> {
        Ok(self.dispatch()?.repository())
    }

    pub async fn create(&self, attributes: Attributes) -> Result<Instance> {
        let record = self.repository()?.insert(attributes).await?;
        Ok(Instance::new(self.clone(), record))
    }

    pub async fn find(&self, id: RecordId) -> Result<Option<Instance>> {
        let record = self.repository()?.find(id).await?;
        Ok(record.map(|record| Instance::new(self.clone(), record)))
    }

    pub async fn exists(&self, id: RecordId) -> Result<bool> {
        self.repository()?.exists(id).await
    }

    pub async fn count(&self) -> Result<usize> {
        self.repository()?.count(&Scope::all()).await
    }

    pub fn all(&self) -> Relation {
        Relation::new(self.clone(), Scope::all())
    }

    pub fn where_eq(&self, key: impl Into<String>, value: impl Into<Value>) -> Relation {
        Relation::new(self.clone(), Scope::matching(key, value))
    }

    /// Type-level delete by one or more primary keys; no callbacks.
    pub async fn delete(&self, ids: &[RecordId]) -> Result<usize> {
        debug!("{}.delete {:?}", self.name, ids);
        self.repository()?.delete(ids).await
    }

    pub async fn delete_all(&self) -> Result<usize> {
        self.all().delete_all(None).await
    }

    pub async fn destroy_all(&self) -> Result<Vec<Record>> {
        self.all().destroy_all(None).await
    }

    pub async fn force_delete(&self, ids: &[RecordId]) -> Result<usize> {
        self.dispatch()?.into_guarded(&self.name)?.force_delete(ids).await
    }

    pub async fn force_delete_all(&self) -> Result<usize> {
        self.dispatch()?
            .into_guarded(&self.name)?
            .force_delete_all(&Scope::all())
            .await
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Model({}, policy={})", self.name, self.policy())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::UndeletableError;
    use crate::model::fixtures::catalog_with;
    use crate::db::Attributes;

    #[tokio::test]
    async fn test_plain_model_bulk_operations() {
        let catalog = catalog_with(&["PlainModel"]);
        let model = catalog.model("PlainModel").unwrap();
        let a = model.create(Attributes::new()).await.unwrap();
        model.create(Attributes::new()).await.unwrap();
        model.create(Attributes::new()).await.unwrap();

        assert_eq!(model.delete(&[a.id()]).await.unwrap(), 1);
        assert_eq!(model.destroy_all().await.unwrap().len(), 2);
        assert_eq!(model.count().await.unwrap(), 0);
        assert!(!model.is_guarded());
    }

    #[tokio::test]
    async fn test_plain_model_has_no_force_path() {
        let catalog = catalog_with(&["PlainModel"]);
        let model = catalog.model("PlainModel").unwrap();
        let a = model.create(Attributes::new()).await.unwrap();

        let err = model.force_delete(&[a.id()]).await.unwrap_err();
        assert!(matches!(err, UndeletableError::BypassUnavailable(_)));
        assert!(model.force_delete_all().await.is_err());
        assert_eq!(model.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_silent_model_class_level_operations() {
        let catalog = catalog_with(&["UndeletableModel"]);
        catalog.guard("UndeletableModel").unwrap();
        let model = catalog.model("UndeletableModel").unwrap();
        let a = model.create(Attributes::new()).await.unwrap();

        assert_eq!(model.delete(&[a.id()]).await.unwrap(), 0);
        assert_eq!(model.delete_all().await.unwrap(), 0);
        assert_eq!(model.destroy_all().await.unwrap().len(), 1);
        assert_eq!(model.count().await.unwrap(), 1);

        assert_eq!(model.force_delete(&[a.id()]).await.unwrap(), 1);
        assert_eq!(model.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_silent_model_force_delete_all() {
        let catalog = catalog_with(&["UndeletableModel"]);
        catalog.guard("UndeletableModel").unwrap();
        let model = catalog.model("UndeletableModel").unwrap();
        model.create(Attributes::new()).await.unwrap();
        model.create(Attributes::new()).await.unwrap();

        assert_eq!(model.force_delete_all().await.unwrap(), 2);
        assert_eq!(model.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_raising_model_class_level_operations() {
        let catalog = catalog_with(&["UndeletableBangModel"]);
        catalog.guard_strict("UndeletableBangModel").unwrap();
        let model = catalog.model("UndeletableBangModel").unwrap();
        let a = model.create(Attributes::new()).await.unwrap();

        assert!(model.delete(&[a.id()]).await.unwrap_err().is_protected_record());
        assert!(model.delete_all().await.unwrap_err().is_protected_record());
        assert!(model.destroy_all().await.unwrap_err().is_protected_record());
        assert!(matches!(
            model.force_delete(&[a.id()]).await,
            Err(UndeletableError::BypassUnavailable(_))
        ));
        assert_eq!(model.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_handle_taken_before_registration_sees_guard() {
        let catalog = catalog_with(&["Item"]);
        let model = catalog.model("Item").unwrap();
        assert!(!model.is_guarded());

        catalog.guard("Item").unwrap();
        let item = model.create(Attributes::new()).await.unwrap();
        model.delete(&[item.id()]).await.unwrap();

        assert!(model.is_guarded());
        assert_eq!(model.count().await.unwrap(), 1);
    }
}
