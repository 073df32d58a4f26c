use anyhow::Result;

/// Durable local key-value persistence. Mutation is single-threaded and the
/// writes are small, so the interface stays synchronous.
pub trait StateStore: Send + Sync {
    /// `Ok(None)` when the key has never been written.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
