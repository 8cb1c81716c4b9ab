pub mod sqlite;

use crate::app::Result;

pub use sqlite::SqliteStore;

/// Durable string key-value storage.
///
/// Writes to the same key are last-write-wins; nothing spans keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
    /// Removes every key in `keys`, returning how many existed.
    fn remove_many(&self, keys: &[String]) -> Result<usize>;
}
