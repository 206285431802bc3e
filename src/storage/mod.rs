use thiserror::Error;

pub mod file;
pub mod memory;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unable to initialize the session store: {0}")]
    UnableToInitialize(String),
    #[error("Unable to read the session store: {0}")]
    UnableToRead(String),
    #[error("Unable to write the session store: {0}")]
    UnableToWrite(String),
    #[error("Session store contents are corrupt: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub fn io_to_generic_error(error: std::io::Error) -> String {
    format!("{}", error)
}

/// Durable client-side string store, the equivalent of browser local storage.
///
/// Implementations use interior mutability so a single store can be shared between
/// the session store and the http interceptors.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}
