use std::{
    collections::BTreeMap,
    fs::{self, File, OpenOptions},
    io::{Read, Write},
    path::PathBuf,
    sync::Mutex,
};

use super::{io_to_generic_error, KeyValueStore, StoreError, StoreResult};

/// Keeps every key in a single JSON object on disk. The file is re-read on every access so
/// a second process sharing the file sees logouts straight away.
pub struct FileStore {
    file_path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(file_path: PathBuf) -> StoreResult<Self> {
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::UnableToInitialize(io_to_generic_error(e)))?;
            }
        }

        Ok(Self {
            file_path,
            write_lock: Mutex::new(()),
        })
    }

    fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        let mut file = match File::open(&self.file_path) {
            Ok(file) => file,
            Err(err) => match err.kind() {
                std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
                _ => return Err(StoreError::UnableToRead(io_to_generic_error(err))),
            },
        };

        let mut contents = String::new();

        file.read_to_string(&mut contents)
            .map_err(|e| StoreError::UnableToRead(io_to_generic_error(e)))?;

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn save(&self, values: &BTreeMap<String, String>) -> StoreResult<()> {
        let bytes =
            serde_json::to_vec_pretty(values).map_err(|e| StoreError::UnableToWrite(e.to_string()))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.file_path)
            .map_err(|e| StoreError::UnableToWrite(io_to_generic_error(e)))?;

        file.write_all(&bytes)
            .map_err(|e| StoreError::UnableToWrite(io_to_generic_error(e)))
    }

    fn modify(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> StoreResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::UnableToWrite(e.to_string()))?;

        let mut values = self.load()?;

        change(&mut values);

        self.save(&values)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.modify(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.modify(|values| {
            values.remove(key);
        })
    }
}
