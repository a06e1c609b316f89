//! Directory-backed store: one `<collection>.json` file per collection.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, EngineResult};

use super::{Collection, Store};

/// Persists each collection as a JSON file under a data directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Uses `root` as the data directory, creating it on first write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.root.join(format!("{}.json", collection.name()))
    }
}

fn persistence_error(collection: Collection, error: std::io::Error) -> EngineError {
    EngineError::Persistence {
        collection: collection.name().to_string(),
        message: error.to_string(),
    }
}

impl Store for FileStore {
    fn get(&self, collection: Collection) -> EngineResult<Option<String>> {
        match fs::read_to_string(self.path_for(collection)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(persistence_error(collection, err)),
        }
    }

    fn set(&self, collection: Collection, contents: String) -> EngineResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| persistence_error(collection, e))?;

        let target = self.path_for(collection);
        let staging = target.with_extension("json.tmp");
        fs::write(&staging, contents).map_err(|e| persistence_error(collection, e))?;
        fs::rename(&staging, &target).map_err(|e| persistence_error(collection, e))
    }
}
