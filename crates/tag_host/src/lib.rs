//! ImageTagger backend host
//!
//! The host owns everything the UI may not touch directly:
//! - The native folder dialog
//! - The queue of untagged images in the selected folder
//! - Moving (and optionally renaming) tagged images into `tagged/`
//! - The `tagged/tags.json` ledger
//! - Tagged/total counters, pushed after every change

mod backend;
pub mod bridge;
mod ledger;
mod picker;

pub use backend::{TaggingBackend, TAGGED_DIR};
pub use ledger::{Ledger, LedgerEntry, LEDGER_FILE};
pub use picker::{FolderPicker, RfdPicker};

use thiserror::Error;

/// Backend operation errors. Their `Display` text is what the operator sees.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("{0}")]
    Fs(#[from] app_fs::FsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] serde_json::Error),

    #[error("No folder selected")]
    NoFolder,

    #[error("No more untagged images in this folder")]
    QueueEmpty,

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("No tags given for {0}")]
    NoTags(String),

    #[error("Nothing tagged in this folder yet")]
    NoLedger,
}

pub type Result<T> = std::result::Result<T, HostError>;
