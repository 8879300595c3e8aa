

use parking_lot::Mutex;
use serde_json::Value;

use super::instance::Instance;
use super::model::Model;
use crate::core::Result;
use crate::db::{Attributes, Record, Scope};

/// A scoped collection of one entity with a lazily loaded record cache.
///
/// `load` fills the cache, `size` answers from it when present, `count` always
/// queries. Bulk operations reset the cache so later reads see storage again.
pub struct Relation {
    model: Model,
    scope: Scope,
    loaded: Mutex<Option<Vec<Record>>>,
}

impl Relation {
    pub(crate) fn new(model: Model, scope: Scope) -> Self {
        Self {
            model,
            scope,
            loaded: Mutex::new(None),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn where_eq(&self, key: impl Into<String>, value: impl Into<Value>) -> Relation {
        Relation::new(self.model.clone(), self.scope.clone().where_eq(key, value))
    }

    pub fn refine<F>(&self, refinement: F) -> Relation
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        Relation::new(self.model.clone(), self.scope.clone().refine(refinement))
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.lock().is_some()
    }

    pub async fn load(&self) -> Result<Vec<Record>> {
        if let Some(records) = self.loaded.lock().as_ref() {
            return Ok(records.clone());
        }
        self.reload().await
    }

    pub async fn reload(&self) -> Result<Vec<Record>> {
        let records = self.model.repository()?.select(&self.scope).await?;
        *self.loaded.lock() = Some(records.clone());
        Ok(records)
    }

    pub fn reset(&self) {
        *self.loaded.lock() = None;
    }

    pub async fn to_instances(&self) -> Result<Vec<Instance>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .map(|record| Instance::new(self.model.clone(), record))
            .collect())
    }

    pub async fn size(&self) -> Result<usize> {
        if let Some(records) = self.loaded.lock().as_ref() {
            return Ok(records.len());
        }
        self.count().await
    }

    pub async fn count(&self) -> Result<usize> {
        self.model.repository()?.count(&self.scope).await
    }

    /// Inserts a record carrying this relation's equality conditions.
    pub async fn create(&self, mut attributes: Attributes) -> Result<Instance> {
        for (key, value) in self.scope.conditions() {
            attributes.insert(key.clone(), value.clone());
        }

        let instance = self.model.create(attributes).await?;
        self.reset();
        Ok(instance)
    }

    pub async fn delete_all(&self, predicate: Option<Scope>) -> Result<usize> {
        let scope = self.target_scope(predicate);
        let outcome = self.model.repository()?.delete_all(&scope).await;
        self.reset();
        outcome
    }

    /// Destroys every matched record. A guarded entity's repository loads the
    /// matched set and destroys it record by record, so callbacks fire per
    /// record whichever predicate form selected the set.
    pub async fn destroy_all(&self, predicate: Option<Scope>) -> Result<Vec<Record>> {
        let scope = self.target_scope(predicate);
        let outcome = self.model.repository()?.destroy_all(&scope).await;
        self.reset();
        outcome
    }

    fn target_scope(&self, predicate: Option<Scope>) -> Scope {
        match predicate {
            Some(predicate) => self.scope.merge(&predicate),
            None => self.scope.clone(),
        }
    }
}

impl std::fmt::Debug for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("entity", &self.model.name())
            .field("scope", &self.scope)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::db::{Attributes, Callbacks, HookFlow, Scope};
    use crate::model::fixtures::{catalog_with, repository_with};
    use crate::model::{Catalog, Instance};

    struct Family {
        catalog: Catalog,
        parent: Instance,
        other_parent: Instance,
        before: Arc<AtomicUsize>,
        after: Arc<AtomicUsize>,
    }

    async fn family(guard: Option<bool>) -> Family {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let (b, a) = (Arc::clone(&before), Arc::clone(&after));
        let callbacks = Callbacks::new()
            .before_destroy(move |_| {
                b.fetch_add(1, Ordering::SeqCst);
                HookFlow::Continue
            })
            .after_destroy(move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            });

        let catalog = catalog_with(&["ParentModel"]);
        catalog.define(repository_with("Order", callbacks)).unwrap();
        catalog.has_many("ParentModel", "orders", "Order", "parent_id").unwrap();
        match guard {
            Some(true) => {
                catalog.guard_strict("Order").unwrap();
            }
            Some(false) => {
                catalog.guard("Order").unwrap();
            }
            None => {}
        }

        let parents = catalog.model("ParentModel").unwrap();
        let parent = parents.create(Attributes::new()).await.unwrap();
        let other_parent = parents.create(Attributes::new()).await.unwrap();

        Family {
            catalog,
            parent,
            other_parent,
            before,
            after,
        }
    }

    fn priced(price: i64) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("price".into(), json!(price));
        attributes
    }

    #[tokio::test]
    async fn test_association_is_scoped_and_cached() {
        let f = family(Some(false)).await;
        let orders = f.parent.association("orders").unwrap();
        let other = f.other_parent.association("orders").unwrap();

        let first = orders.create(priced(10)).await.unwrap();
        other.create(priced(20)).await.unwrap();
        assert_eq!(first.get("parent_id"), Some(&json!(f.parent.id())));

        first.destroy().await.unwrap();
        assert_eq!(orders.count().await.unwrap(), 1);

        orders.create(priced(30)).await.unwrap();
        assert_eq!(orders.count().await.unwrap(), 2);
        let loaded = orders.load().await.unwrap();
        assert_eq!(loaded.iter().map(|r| r.get("price").cloned()).collect::<Vec<_>>(), vec![Some(json!(10)), Some(json!(30))]);

        assert!(Arc::ptr_eq(&orders, &f.parent.association("orders").unwrap()));
    }

    #[tokio::test]
    async fn test_size_uses_cache_until_reset() {
        let f = family(None).await;
        let orders = f.parent.association("orders").unwrap();
        orders.create(priced(1)).await.unwrap();

        orders.load().await.unwrap();
        assert!(orders.is_loaded());
        f.catalog.model("Order").unwrap().create(priced(2)).await.unwrap();
        assert_eq!(orders.size().await.unwrap(), 1);

        orders.reset();
        assert_eq!(orders.size().await.unwrap(), 1);
        assert_eq!(orders.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_plain_relation_bulk_operations() {
        let f = family(None).await;
        let orders = f.parent.association("orders").unwrap();
        for price in [1, 2, 3] {
            orders.create(priced(price)).await.unwrap();
        }
        f.other_parent.association("orders").unwrap().create(priced(4)).await.unwrap();

        let destroyed = orders.destroy_all(Some(Scope::matching("price", 1))).await.unwrap();
        assert_eq!(destroyed.len(), 1);
        assert_eq!(orders.delete_all(None).await.unwrap(), 2);

        assert_eq!(orders.count().await.unwrap(), 0);
        assert_eq!(f.catalog.model("Order").unwrap().count().await.unwrap(), 1);
        assert_eq!(f.before.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_guarded_destroy_all_resets_cache() {
        let f = family(Some(false)).await;
        let orders = f.parent.association("orders").unwrap();
        for price in [1, 2, 3] {
            orders.create(priced(price)).await.unwrap();
        }
        assert_eq!(orders.load().await.unwrap().len(), 3);

        let matched = orders.destroy_all(None).await.unwrap();

        assert_eq!(matched.len(), 3);
        assert!(!orders.is_loaded());
        assert_eq!(orders.size().await.unwrap(), 3);
        assert_eq!(f.before.load(Ordering::SeqCst), 3);
        assert_eq!(f.after.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_guarded_destroy_all_predicate_forms_agree() {
        let f = family(Some(false)).await;
        let orders = f.parent.association("orders").unwrap();
        for price in [5, 10, 10, 20] {
            orders.create(priced(price)).await.unwrap();
        }

        let forms: Vec<(Option<Scope>, usize)> = vec![
            (None, 4),
            (Some(Scope::matching("price", 10)), 2),
            (Some(Scope::matching("price", 10).refine(|r| r.id % 2 == 0)), 1),
            (Some(Scope::refined(|r| r.get("price") == Some(&json!(20)))), 1),
        ];

        let mut expected_callbacks = 0;
        for (predicate, expected) in forms {
            let matched = orders.destroy_all(predicate).await.unwrap();
            expected_callbacks += expected;

            assert_eq!(matched.len(), expected);
            assert_eq!(f.before.load(Ordering::SeqCst), expected_callbacks);
            assert_eq!(orders.count().await.unwrap(), 4);
        }
    }

    #[tokio::test]
    async fn test_guarded_delete_all_on_relation() {
        let f = family(Some(false)).await;
        let orders = f.parent.association("orders").unwrap();
        orders.create(priced(1)).await.unwrap();

        assert_eq!(orders.delete_all(Some(Scope::matching("price", 1))).await.unwrap(), 0);
        assert_eq!(orders.count().await.unwrap(), 1);
        assert_eq!(f.before.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_raising_relation_bulk_operations() {
        let f = family(Some(true)).await;
        let orders = f.parent.association("orders").unwrap();
        for price in [1, 2] {
            orders.create(priced(price)).await.unwrap();
        }
        orders.load().await.unwrap();

        assert!(orders.delete_all(None).await.unwrap_err().is_protected_record());
        let err = orders.destroy_all(None).await.unwrap_err();

        assert!(err.is_protected_record());
        assert!(!orders.is_loaded());
        assert_eq!(f.before.load(Ordering::SeqCst), 1);
        assert_eq!(f.after.load(Ordering::SeqCst), 0);
        assert_eq!(orders.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_where_eq_and_refine() {
        let f = family(None).await;
        let model = f.catalog.model("Order").unwrap();
        for price in [1, 2, 3] {
            model.create(priced(price)).await.unwrap();
        }

        assert_eq!(model.where_eq("price", 2).count().await.unwrap(), 1);
        let cheap = model.all().refine(|r| r.get("price").and_then(|p| p.as_i64()) < Some(3));
        assert_eq!(cheap.to_instances().await.unwrap().len(), 2);
    }
}
