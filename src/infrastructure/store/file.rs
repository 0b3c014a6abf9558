#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs;
use std::path;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::PersistenceError;
use crate::domain::models::Store;

/// One `<key>.json` file per key. Writes go to a temporary sibling first and
/// are renamed into place so a crash never leaves a half-written blob.
///
/// There is no locking, two processes sharing a data dir race and the last
/// write wins.
pub struct FileStore {
    pub dir: path::PathBuf,
}

impl Default for FileStore {
    fn default() -> FileStore {
        return FileStore::new(path::PathBuf::from(Config::get(ConfigKey::DataDir)));
    }
}

impl FileStore {
    pub fn new(dir: path::PathBuf) -> FileStore {
        return FileStore { dir };
    }

    fn get_file_path(&self, key: &str) -> path::PathBuf {
        return self.dir.join(format!("{key}.json"));
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let file_path = self.get_file_path(key);
        if !file_path.exists() {
            return Ok(None);
        }

        let payload = fs::read_to_string(file_path).map_err(|err| {
            return PersistenceError::Read {
                key: key.to_string(),
                reason: err.to_string(),
            };
        })?;

        return Ok(Some(payload));
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let write_err = |err: std::io::Error| {
            return PersistenceError::Write {
                key: key.to_string(),
                reason: err.to_string(),
            };
        };

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(write_err)?;
        }

        let file_path = self.get_file_path(key);
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp_path, value).map_err(write_err)?;
        fs::rename(&tmp_path, &file_path).map_err(write_err)?;

        return Ok(());
    }
}
