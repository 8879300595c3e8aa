

pub mod callbacks;
pub mod memory;
pub mod record;
pub mod repository;

pub use callbacks::{AfterDestroyHook, BeforeDestroyHook, Callbacks, HookFlow};
pub use memory::{MemoryRepository, MemoryStore};
pub use record::{Attributes, Record, RecordId, Refinement, Scope};
pub use repository::Repository;
