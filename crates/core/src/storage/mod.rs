pub mod datastore;
pub mod encryption;
pub mod format;
pub mod manager;
pub mod memory;

pub use datastore::{Database, Datastore};
pub use memory::MemoryStore;
