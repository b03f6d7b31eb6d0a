pub mod memory;
pub mod sqlite;

use crate::app::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key holding the serialized content list.
pub const CONTENT_KEY: &str = "geministics_content";
/// Key holding the last-changed marker other contexts watch.
pub const REFRESH_KEY: &str = "geministics_refresh";

/// Local persistent key-value storage shared by every context on this machine.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Returns whether the key existed.
    fn remove(&self, key: &str) -> Result<bool>;
}
