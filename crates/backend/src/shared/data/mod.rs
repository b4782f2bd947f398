pub mod db;
pub mod document_store;
pub mod memory_store;
pub mod object_storage;
pub mod sqlite_store;

pub use document_store::{DocumentStore, RangeQuery, StoredDocument};
pub use memory_store::MemoryDocumentStore;
pub use object_storage::{LocalObjectStorage, ObjectStorage};
pub use sqlite_store::SqliteDocumentStore;
