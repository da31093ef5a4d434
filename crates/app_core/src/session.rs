//! Tagging session state
//!
//! All UI state lives in one [`SessionState`]. Input arrives as an [`Event`]
//! (backend reply, keyboard command, widget interaction); [`SessionState::update`]
//! applies it and returns the side effects to run, so the workflow can be
//! driven and checked without a window or a backend process.

use crate::autocomplete::{Candidate, Direction, TagSearch};
use crate::command::Command;
use crate::config::AppConfig;
use crate::notification::Notification;
use crate::vocabulary::TagVocabulary;
use ipc_proto::{AddFile, BackendEvent, BackendRequest, FolderSelection, Stats};

pub const NO_IMAGE_LOADED: &str = "No image loaded!";
pub const NO_TAGS_SELECTED: &str = "No tags selected!";
pub const NO_FOLDER_SELECTED: &str = "No folder selected!";
pub const ADDING_IMAGE: &str = "Adding image...";
pub const IMAGE_ADDED: &str = "Image added!";

/// Shown on the folder button before a folder is chosen
pub const FOLDER_PLACEHOLDER: &str = "SELECT FOLDER";

/// The folder being worked through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderContext {
    pub folder_path: String,
    pub path_separator: String,
}

impl FolderContext {
    /// Bare file name of `path`, split on this folder's separator
    pub fn file_name<'a>(&self, path: &'a str) -> &'a str {
        if self.path_separator.is_empty() {
            return path;
        }
        path.rsplit(self.path_separator.as_str()).next().unwrap_or(path)
    }
}

impl From<FolderSelection> for FolderContext {
    fn from(selection: FolderSelection) -> Self {
        Self {
            folder_path: selection.folder,
            path_separator: selection.path_sep,
        }
    }
}

/// The image on screen and the tags chosen for it (selection order, no duplicates)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionImage {
    pub path: Option<String>,
    pub tags: Vec<String>,
}

/// Everything that can happen to a session
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Reply or push from the backend
    Backend(BackendEvent),
    /// Remote catalog arrived
    VocabularyLoaded(Vec<String>),
    /// Resolved keyboard shortcut or action-bar button
    Command(Command),
    /// Search input text changed
    QueryChanged(String),
    /// Search input gained (true) or lost (false) focus
    SearchFocusChanged(bool),
    /// Dropdown entry clicked
    PickCandidate(Candidate),
    /// Chip close button clicked
    RemoveTag(String),
    SelectFolder,
    ToggleRenameFiles,
    ToggleStats,
    OpenGuide,
    CloseGuide,
    OpenOutputFile,
}

/// Side effects requested by an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Send(BackendRequest),
    Notify(Notification),
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub vocabulary: TagVocabulary,
    pub image: SessionImage,
    pub search: TagSearch,
    /// Cached copy of the backend's counters
    pub stats: Stats,
    pub folder: Option<FolderContext>,
    /// Sent with every `add-file`
    pub rename_files: bool,
    /// Gates page-level shortcuts
    pub input_focused: bool,
    pub stats_open: bool,
    pub guide_open: bool,
}

impl SessionState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            vocabulary: TagVocabulary::new(),
            image: SessionImage::default(),
            search: TagSearch::new(),
            stats: Stats::default(),
            folder: None,
            rename_files: config.tagging.rename_files,
            input_focused: false,
            stats_open: false,
            guide_open: config.general.show_guide_on_startup,
        }
    }

    /// Placeholder for the tag input
    pub fn placeholder(&self) -> String {
        format!("Type tags here ({})", self.vocabulary.len())
    }

    /// Text for the folder button
    pub fn folder_label(&self) -> &str {
        self.folder
            .as_ref()
            .map(|f| f.folder_path.as_str())
            .unwrap_or(FOLDER_PLACEHOLDER)
    }

    /// Apply one event; returns the effects to execute in order
    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Backend(backend) => self.on_backend(backend),
            Event::VocabularyLoaded(tags) => {
                self.vocabulary.merge_catalog(tags);
                self.search.refresh(&self.vocabulary, &self.image.tags);
                Vec::new()
            }
            Event::Command(command) => self.on_command(command),
            Event::QueryChanged(query) => {
                self.search.set_query(query, &self.vocabulary, &self.image.tags);
                Vec::new()
            }
            Event::SearchFocusChanged(focused) => {
                self.input_focused = focused;
                if !focused {
                    self.search.reset();
                }
                Vec::new()
            }
            Event::PickCandidate(candidate) => {
                self.search
                    .pick(&candidate, &mut self.vocabulary, &mut self.image.tags);
                Vec::new()
            }
            Event::RemoveTag(tag) => {
                self.image.tags.retain(|t| *t != tag);
                self.search.refresh(&self.vocabulary, &self.image.tags);
                Vec::new()
            }
            Event::SelectFolder => vec![Effect::Send(BackendRequest::OpenFolderDialog)],
            Event::ToggleRenameFiles => {
                self.rename_files = !self.rename_files;
                tracing::debug!(rename_files = self.rename_files, "Rename on submit toggled");
                Vec::new()
            }
            Event::ToggleStats => {
                self.stats_open = !self.stats_open;
                Vec::new()
            }
            Event::OpenGuide => {
                self.guide_open = true;
                Vec::new()
            }
            Event::CloseGuide => {
                self.guide_open = false;
                Vec::new()
            }
            Event::OpenOutputFile => match &self.folder {
                Some(folder) => vec![Effect::Send(BackendRequest::OpenOutputFile {
                    folder: folder.folder_path.clone(),
                })],
                None => vec![Effect::Notify(Notification::error(NO_FOLDER_SELECTED))],
            },
        }
    }

    fn on_backend(&mut self, event: BackendEvent) -> Vec<Effect> {
        match event {
            BackendEvent::FolderOpened(Ok(selection)) => {
                let folder = FolderContext::from(selection);
                tracing::info!("Folder selected: {}", folder.folder_path);
                let request = BackendRequest::NextFile {
                    folder: Some(folder.folder_path.clone()),
                };
                self.folder = Some(folder);
                vec![Effect::Send(request)]
            }
            BackendEvent::NextFile(Ok(path)) => {
                tracing::debug!("Next image: {}", path);
                self.image = SessionImage {
                    path: Some(path),
                    tags: Vec::new(),
                };
                self.search.refresh(&self.vocabulary, &self.image.tags);
                Vec::new()
            }
            BackendEvent::FileAdded(Ok(())) => vec![
                Effect::Notify(Notification::success(IMAGE_ADDED)),
                Effect::Send(BackendRequest::NextFile { folder: None }),
            ],
            BackendEvent::OutputFileOpened(Ok(())) => Vec::new(),
            BackendEvent::FolderOpened(Err(message))
            | BackendEvent::NextFile(Err(message))
            | BackendEvent::FileAdded(Err(message))
            | BackendEvent::OutputFileOpened(Err(message)) => {
                vec![Effect::Notify(Notification::error(message))]
            }
            BackendEvent::Stats(stats) => {
                self.stats = stats;
                Vec::new()
            }
        }
    }

    fn on_command(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::DismissOverlays => {
                self.stats_open = false;
                self.guide_open = false;
                Vec::new()
            }
            Command::Submit => self.submit(),
            Command::Skip => {
                if self.image.path.is_none() {
                    return vec![Effect::Notify(Notification::error(NO_IMAGE_LOADED))];
                }
                vec![Effect::Send(BackendRequest::NextFile { folder: None })]
            }
            Command::SearchConfirm => {
                self.search
                    .confirm_highlighted(&mut self.vocabulary, &mut self.image.tags);
                Vec::new()
            }
            Command::SearchPrev => {
                self.search.navigate(Direction::Up);
                Vec::new()
            }
            Command::SearchNext => {
                self.search.navigate(Direction::Down);
                Vec::new()
            }
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        let Some(path) = self.image.path.as_deref() else {
            return vec![Effect::Notify(Notification::error(NO_IMAGE_LOADED))];
        };
        if self.image.tags.is_empty() {
            return vec![Effect::Notify(Notification::error(NO_TAGS_SELECTED))];
        }
        let Some(folder) = &self.folder else {
            return vec![Effect::Notify(Notification::error(NO_FOLDER_SELECTED))];
        };

        let request = AddFile {
            folder: folder.folder_path.clone(),
            filename: folder.file_name(path).to_string(),
            tags: AddFile::join_tags(&self.image.tags),
            rename: self.rename_files,
        };
        tracing::info!(file = %request.filename, tags = %request.tags, "Submitting image");

        vec![
            Effect::Send(BackendRequest::AddFile(request)),
            Effect::Notify(Notification::info(ADDING_IMAGE)),
        ]
    }
}
