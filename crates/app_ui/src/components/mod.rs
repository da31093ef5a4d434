//! UI Components

pub mod action_bar;
pub mod dialogs;
pub mod tag_picker;
pub mod toasts;
pub mod toolbar;
pub mod viewer;

pub use action_bar::ActionBar;
pub use dialogs::{Dialog, DialogResult, GuideDialog};
pub use tag_picker::TagPicker;
pub use toasts::ToastStack;
pub use toolbar::Toolbar;
pub use viewer::ImageViewer;
