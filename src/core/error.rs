

use thiserror::Error;

use crate::db::RecordId;


#[derive(Error, Debug)]
pub enum UndeletableError {
    /// Raised by delete, destroy, delete_all and destroy_all on raising-mode types.
    #[error("{entity} is undeletable (ids: {ids:?})")]
    ProtectedRecord { entity: String, ids: Vec<RecordId> },

    /// Raised by the strict destroy entry point.
    #[error("{entity} record {id} was not destroyed")]
    RecordNotDestroyed { entity: String, id: RecordId },

    #[error("{0} is already guarded")]
    AlreadyGuarded(String),

    #[error("No persistence backing for {0}")]
    Unbacked(String),

    #[error("Entity already defined: {0}")]
    AlreadyDefined(String),

    #[error("Unknown association {owner}.{name}")]
    UnknownAssociation { owner: String, name: String },

    #[error("Force deletion is not available for {0}")]
    BypassUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),
}

impl UndeletableError {
    pub fn protected(entity: impl Into<String>, ids: &[RecordId]) -> Self {
        Self::ProtectedRecord {
            entity: entity.into(),
            ids: ids.to_vec(),
        }
    }

    pub fn not_destroyed(entity: impl Into<String>, id: RecordId) -> Self {
        Self::RecordNotDestroyed {
            entity: entity.into(),
            id,
        }
    }

    pub fn is_protected_record(&self) -> bool {
        matches!(self, Self::ProtectedRecord { .. })
    }

    pub fn is_record_not_destroyed(&self) -> bool {
        matches!(self, Self::RecordNotDestroyed { .. })
    }

    /// Misconfiguration detected at registration or setup time.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::AlreadyGuarded(_)
                | Self::Unbacked(_)
                | Self::AlreadyDefined(_)
                | Self::UnknownAssociation { .. }
                | Self::Configuration(_)
                | Self::Config(_)
        )
    }
}


pub type Result<T> = std::result::Result<T, UndeletableError>;
