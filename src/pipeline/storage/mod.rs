pub mod file_store;

pub use file_store::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage location: {0}")]
    InvalidLocation(String),
}
