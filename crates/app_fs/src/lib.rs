//! ImageTagger File System Layer
//!
//! Provides the file system primitives the tagging host builds on:
//! - Image listing with natural sort order
//! - Non-clobbering moves and atomic writes
//! - Opening files with the system default application

mod browser;
mod file_operations;

pub use browser::{ImageEntry, list_images, count_images, is_supported_image, IMAGE_EXTENSIONS};
pub use file_operations::{move_into, write_atomic, open_external};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Cannot open {path}: {reason}")]
    OpenFailed { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, FsError>;
