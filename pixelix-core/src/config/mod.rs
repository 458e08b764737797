//! Plugin configuration persistence
//!
//! Each plugin instance stores its settings as a postcard blob under
//! `/configuration/<uid>.bin`. A missing or unreadable file is not an error
//! the plugin can do anything about: it falls back to defaults and writes
//! them back right away so the next boot finds a valid file.

use core::fmt::Write;

use heapless::String;
use log::{info, warn};
use pixelix_hal::{ConfigStore, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Directory holding all plugin configuration files
pub const CONFIG_DIR: &str = "/configuration";

/// Maximum serialized plugin config size
pub const MAX_CONFIG_SIZE: usize = 256;

/// Maximum length of a configuration file path
pub const MAX_PATH_LEN: usize = 32;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Storage operation failed
    Storage(StorageError),
    /// Stored data could not be decoded
    Deserialize,
    /// Config could not be encoded
    Serialize,
    /// Setting is out of range
    InvalidValue,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        ConfigError::Storage(e)
    }
}

/// Path of the configuration file of plugin `uid`
pub fn config_path(uid: u16) -> String<MAX_PATH_LEN> {
    let mut path = String::new();
    // "/configuration/65535.bin" always fits
    let _ = write!(path, "{}/{}.bin", CONFIG_DIR, uid);
    path
}

/// Load a configuration
pub fn load<T, S>(store: &S, path: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
    S: ConfigStore + ?Sized,
{
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    let len = store.load(path, &mut buffer)?;
    postcard::from_bytes(&buffer[..len]).map_err(|_| ConfigError::Deserialize)
}

/// Save a configuration
pub fn save<T, S>(store: &S, path: &str, config: &T) -> Result<(), ConfigError>
where
    T: Serialize,
    S: ConfigStore + ?Sized,
{
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    let bytes = postcard::to_slice(config, &mut buffer).map_err(|_| ConfigError::Serialize)?;
    store.save(path, bytes)?;
    info!("File {} saved.", path);
    Ok(())
}

/// Load a configuration, or create the file with defaults
pub fn load_or_init<T, S>(store: &S, path: &str) -> T
where
    T: Serialize + DeserializeOwned + Default,
    S: ConfigStore + ?Sized,
{
    match load(store, path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load file {}: {:?}", path, e);
            let config = T::default();
            if let Err(e) = save(store, path, &config) {
                warn!("Failed to create initial configuration file {}: {:?}", path, e);
            }
            config
        }
    }
}

/// Remove a configuration file
pub fn remove<S: ConfigStore + ?Sized>(store: &S, path: &str) {
    if store.remove(path).is_ok() {
        info!("File {} removed", path);
    }
}
