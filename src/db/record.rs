

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;


pub type RecordId = i64;


pub type Attributes = serde_json::Map<String, Value>;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub entity: String,
    pub id: RecordId,
    #[serde(default)]
    pub attributes: Attributes,
    pub created_at: DateTime<Utc>,
}

impl Record {
    pub fn new(entity: impl Into<String>, id: RecordId, attributes: Attributes) -> Self {
        Self {
            entity: entity.into(),
            id,
            attributes,
            created_at: Utc::now(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Stable external identifier of the record.
    pub fn to_param(&self) -> String {
        self.id.to_string()
    }
}


pub type Refinement = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Selection predicate: attribute equality conditions plus an optional refinement.
///
/// An empty scope matches every record of the entity.
#[derive(Clone, Default)]
pub struct Scope {
    conditions: Vec<(String, Value)>,
    refinement: Option<Refinement>,
}

impl Scope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().where_eq(key, value)
    }

    pub fn refined<F>(refinement: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        Self::all().refine(refinement)
    }

    pub fn where_eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((key.into(), value.into()));
        self
    }

    /// Adds a closure filter; composes with any existing refinement.
    pub fn refine<F>(mut self, refinement: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        let combined: Refinement = match self.refinement.take() {
            Some(existing) => Arc::new(move |record: &Record| existing(record) && refinement(record)),
            None => Arc::new(refinement),
        };
        self.refinement = Some(combined);
        self
    }

    pub fn merge(&self, other: &Scope) -> Scope {
        let mut merged = Scope {
            conditions: self.conditions.clone(),
            refinement: self.refinement.clone(),
        };
        merged.conditions.extend(other.conditions.iter().cloned());
        if let Some(extra) = other.refinement.clone() {
            merged = merged.refine(move |record| extra(record));
        }
        merged
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_unfiltered(&self) -> bool {
        self.conditions.is_empty() && self.refinement.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        let conditions_hold = self
            .conditions
            .iter()
            .all(|(key, expected)| record.get(key) == Some(expected));

        conditions_hold && self.refinement.as_ref().is_none_or(|refine| refine(record))
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("conditions", &self.conditions)
            .field("refined", &self.refinement.is_some())
            .finish()
    }
}
