use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::interfaces::adapters::StateStore;
use crate::global_constants;

/// Key-value persistence as one file per key under the user's config
/// directory (`~/.config/whisperlens` on Linux). Values are opaque bytes;
/// what they mean is the caller's business.
pub struct JsonFileStore {
    directory: PathBuf,
}

impl JsonFileStore {
    pub fn in_config_dir() -> Result<Self> {
        let directory = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(global_constants::CONFIG_DIR_NAME);

        Ok(Self::at(directory))
    }

    pub fn at(directory: PathBuf) -> Self {
        Self { directory }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl StateStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        log::debug!("[STORE] Loaded {} bytes from {:?}", bytes.len(), path);
        Ok(Some(bytes))
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.directory)?;

        let path = self.path_for(key);
        fs::write(&path, bytes)?;

        log::debug!("[STORE] Saved {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)?;
            log::debug!("[STORE] Removed {:?}", path);
        }
        Ok(())
    }
}
