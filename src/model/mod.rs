

pub mod catalog;
pub mod instance;
pub mod model;
pub mod relation;

pub use catalog::{Association, Catalog};
pub use instance::Instance;
pub use model::Model;
pub use relation::Relation;

use std::sync::Arc;

use crate::core::{Result, UndeletableError};
use crate::db::Repository;
use crate::guard::GuardedRepository;

/// Repository that serves an entity's calls, resolved per call from the catalog.
#[derive(Clone)]
pub(crate) enum Dispatch {
    Plain(Arc<dyn Repository>),
    Guarded(Arc<GuardedRepository>),
}

impl Dispatch {
    pub(crate) fn repository(&self) -> Arc<dyn Repository> {
        match self {
            Self::Plain(repository) => Arc::clone(repository),
            Self::Guarded(guarded) => Arc::clone(guarded) as Arc<dyn Repository>,
        }
    }

    /// The guard exposing force operations; unguarded entities have none.
    pub(crate) fn into_guarded(self, entity: &str) -> Result<Arc<GuardedRepository>> {
        match self {
            Self::Guarded(guarded) => Ok(guarded),
            Self::Plain(_) => Err(UndeletableError::BypassUnavailable(entity.to_string())),
        }
    }
}
