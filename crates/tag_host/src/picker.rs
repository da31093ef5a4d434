//! Folder selection

use std::path::PathBuf;

/// Source of folder choices; `None` means the operator cancelled
pub trait FolderPicker {
    fn pick_folder(&mut self) -> Option<PathBuf>;
}

/// Native dialog through rfd
#[derive(Debug, Default)]
pub struct RfdPicker;

impl FolderPicker for RfdPicker {
    fn pick_folder(&mut self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select a folder of images to tag")
            .pick_folder()
    }
}

/// Replays a fixed list of answers
#[cfg(test)]
pub(crate) struct ScriptedPicker(pub std::collections::VecDeque<Option<PathBuf>>);

#[cfg(test)]
impl FolderPicker for ScriptedPicker {
    fn pick_folder(&mut self) -> Option<PathBuf> {
        self.0.pop_front().flatten()
    }
}
