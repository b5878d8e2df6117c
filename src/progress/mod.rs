pub mod record;
pub mod storage;
pub mod store;

pub use record::{percentage, VideoProgress};
pub use storage::{FileStore, KeyValueStore, MemoryStore, ProgressStorage, StorageError, DEFAULT_STORAGE_KEY};
pub use store::ProgressStore;
