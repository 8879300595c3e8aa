

pub mod core;
pub mod db;
pub mod guard;
pub mod model;

pub use crate::core::config::UndeletableConfig;
pub use crate::core::error::{Result, UndeletableError};
pub use crate::core::{configure, debug_enabled, init_tracing, set_debug};
pub use db::{Attributes, Callbacks, HookFlow, MemoryStore, Record, RecordId, Repository, Scope};
pub use guard::{GuardMode, GuardPolicy, GuardRegistry, GuardedRepository};
pub use model::{Association, Catalog, Instance, Model, Relation};


pub const VERSION: &str = env!("CARGO_PKG_VERSION");
