

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::callbacks::Callbacks;
use super::record::{Attributes, Record, RecordId, Scope};
use super::repository::Repository;
use crate::core::{Result, UndeletableError};


#[derive(Debug, Default)]
struct Table {
    next_id: RecordId,
    rows: BTreeMap<RecordId, Record>,
}

/// In-process table store backing `MemoryRepository`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creating an existing table is a no-op.
    pub fn create_table(&self, entity: &str) {
        let mut tables = self.tables.write();
        if !tables.contains_key(entity) {
            tables.insert(entity.to_string(), Table::default());
            debug!("Created table {}", entity);
        }
    }

    pub fn has_table(&self, entity: &str) -> bool {
        self.tables.read().contains_key(entity)
    }

    /// Removes every row of `entity`. Ids keep increasing afterwards.
    pub fn truncate(&self, entity: &str) -> Result<()> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(entity)
            .ok_or_else(|| UndeletableError::Unbacked(entity.to_string()))?;
        table.rows.clear();
        Ok(())
    }


    pub fn repository(
        self: &Arc<Self>,
        entity: &str,
        callbacks: Callbacks,
    ) -> Result<MemoryRepository> {
        if !self.has_table(entity) {
            return Err(UndeletableError::Unbacked(entity.to_string()));
        }

        info!("MemoryRepository initialized for {} ({:?})", entity, callbacks);
        Ok(MemoryRepository {
            store: Arc::clone(self),
            entity: entity.to_string(),
            callbacks,
        })
    }

    fn with_table<T>(&self, entity: &str, f: impl FnOnce(&Table) -> T) -> Result<T> {
        let tables = self.tables.read();
        tables
            .get(entity)
            .map(f)
            .ok_or_else(|| UndeletableError::Storage(format!("no such table: {}", entity)))
    }

    fn with_table_mut<T>(&self, entity: &str, f: impl FnOnce(&mut Table) -> T) -> Result<T> {
        let mut tables = self.tables.write();
        tables
            .get_mut(entity)
            .map(f)
            .ok_or_else(|| UndeletableError::Storage(format!("no such table: {}", entity)))
    }
}


pub struct MemoryRepository {
    store: Arc<MemoryStore>,
    entity: String,
    callbacks: Callbacks,
}

impl std::fmt::Debug for MemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryRepository({})", self.entity)
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    fn entity(&self) -> &str {
        &self.entity
    }

    fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    async fn insert(&self, attributes: Attributes) -> Result<Record> {
        let record = self.store.with_table_mut(&self.entity, |table| {
            table.next_id += 1;
            let record = Record::new(self.entity.clone(), table.next_id, attributes);
            table.rows.insert(record.id, record.clone());
            record
        })?;

        debug!("Inserted {}#{}", self.entity, record.id);
        Ok(record)
    }

    async fn find(&self, id: RecordId) -> Result<Option<Record>> {
        self.store
            .with_table(&self.entity, |table| table.rows.get(&id).cloned())
    }

    async fn select(&self, scope: &Scope) -> Result<Vec<Record>> {
        self.store.with_table(&self.entity, |table| {
            table
                .rows
                .values()
                .filter(|record| scope.matches(record))
                .cloned()
                .collect()
        })
    }

    async fn count(&self, scope: &Scope) -> Result<usize> {
        self.store.with_table(&self.entity, |table| {
            table.rows.values().filter(|record| scope.matches(record)).count()
        })
    }

    async fn delete(&self, ids: &[RecordId]) -> Result<usize> {
        let removed = self.store.with_table_mut(&self.entity, |table| {
            ids.iter().filter(|id| table.rows.remove(*id).is_some()).count()
        })?;

        debug!("Deleted {} {} row(s)", removed, self.entity);
        Ok(removed)
    }

    async fn delete_all(&self, scope: &Scope) -> Result<usize> {
        let removed = self.store.with_table_mut(&self.entity, |table| {
            let before = table.rows.len();
            table.rows.retain(|_, record| !scope.matches(record));
            before - table.rows.len()
        })?;

        debug!("Deleted {} {} row(s) matching {:?}", removed, self.entity, scope);
        Ok(removed)
    }
}
