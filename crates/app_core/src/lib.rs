//! ImageTagger Core Domain Logic
//!
//! This crate contains:
//! - Tag vocabulary and autocomplete
//! - Tagging session state (event in, effects out)
//! - Keyboard command dispatch
//! - Notifications
//! - Configuration
//! - Error types
//! - Remote tag catalog fetch

pub mod autocomplete;
pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod notification;
pub mod session;
pub mod vocabulary;

pub use autocomplete::{candidates, Candidate, Direction, TagSearch, NEW_TAG_MARKER};
pub use catalog::{fetch_tag_list, parse_catalog};
pub use command::{Command, CommandDispatcher, KeyChord, KeyScope};
pub use config::{AppConfig, BackendConfig, CatalogConfig, GeneralConfig, TaggingConfig};
pub use error::AppError;
pub use notification::{Notification, NotificationCenter, NotificationKind, Toast};
pub use session::{Effect, Event, FolderContext, SessionImage, SessionState};
pub use vocabulary::TagVocabulary;
