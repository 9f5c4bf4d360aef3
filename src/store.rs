use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::types::Location;

pub const STORE_KEY: &str = "planetary-hours.location";

#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(format!("{STORE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Location>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let location = serde_json::from_str(&json)?;
        debug!(path = %self.path.display(), "loaded saved location");
        Ok(Some(location))
    }

    pub fn load_or_none(&self) -> Option<Location> {
        self.load().unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "ignoring unreadable saved location");
            None
        })
    }

    pub fn save(&self, location: &Location) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(location)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "saved location");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
