

pub mod policy;
pub mod registry;
pub mod repository;

pub use policy::{GuardMode, GuardPolicy};
pub use registry::GuardRegistry;
pub use repository::GuardedRepository;
