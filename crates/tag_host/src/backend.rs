//! Request handling for the tagging host

use crate::ledger::{Ledger, LedgerEntry};
use crate::picker::FolderPicker;
use crate::{HostError, Result};
use ipc_proto::{AddFile, BackendEvent, BackendRequest, FolderSelection, Stats};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

/// Subdirectory that receives tagged images and the ledger
pub const TAGGED_DIR: &str = "tagged";

/// The folder being worked through and its remaining images
#[derive(Debug)]
struct FolderSession {
    folder: PathBuf,
    queue: VecDeque<PathBuf>,
}

impl FolderSession {
    fn scan(folder: PathBuf) -> Result<Self> {
        let queue = app_fs::list_images(&folder)?
            .into_iter()
            .map(|entry| entry.path)
            .collect::<VecDeque<_>>();

        tracing::info!("Queued {} untagged images in {:?}", queue.len(), folder);
        Ok(Self { folder, queue })
    }

    /// Next queued image still on disk
    fn next(&mut self) -> Option<PathBuf> {
        while let Some(path) = self.queue.pop_front() {
            if path.is_file() {
                return Some(path);
            }
            tracing::debug!("Dropping vanished file {:?}", path);
        }
        None
    }
}

/// Turns requests into replies and stats pushes
pub struct TaggingBackend<P> {
    picker: P,
    session: Option<FolderSession>,
}

impl<P: FolderPicker> TaggingBackend<P> {
    pub fn new(picker: P) -> Self {
        Self {
            picker,
            session: None,
        }
    }

    /// Handle one request. `Shutdown` is the caller's business and yields nothing.
    pub fn handle(&mut self, request: BackendRequest) -> Vec<BackendEvent> {
        tracing::debug!("Handling {}", request.name());

        match request {
            BackendRequest::OpenFolderDialog => self.open_folder_dialog(),
            BackendRequest::NextFile { folder } => {
                let result = self.next_file(folder.map(PathBuf::from));
                vec![BackendEvent::NextFile(result.map_err(|e| e.to_string()))]
            }
            BackendRequest::AddFile(add) => match self.add_file(&add) {
                Ok(()) => {
                    let mut events = vec![BackendEvent::FileAdded(Ok(()))];
                    events.extend(self.stats_push(Path::new(&add.folder)));
                    events
                }
                Err(e) => {
                    tracing::warn!("add-file {} failed: {}", add.filename, e);
                    vec![BackendEvent::FileAdded(Err(e.to_string()))]
                }
            },
            BackendRequest::OpenOutputFile { folder } => {
                let result = open_output_file(Path::new(&folder));
                vec![BackendEvent::OutputFileOpened(result.map_err(|e| e.to_string()))]
            }
            BackendRequest::Shutdown => Vec::new(),
        }
    }

    fn open_folder_dialog(&mut self) -> Vec<BackendEvent> {
        let Some(folder) = self.picker.pick_folder() else {
            tracing::info!("Folder dialog cancelled");
            return vec![BackendEvent::FolderOpened(Err(HostError::NoFolder.to_string()))];
        };

        let selection = FolderSelection {
            folder: folder.display().to_string(),
            path_sep: std::path::MAIN_SEPARATOR_STR.to_string(),
        };

        let mut events = vec![BackendEvent::FolderOpened(Ok(selection))];
        events.extend(self.stats_push(&folder));
        events
    }

    /// With a folder: rescan it and start over. Without: continue the queue.
    fn next_file(&mut self, folder: Option<PathBuf>) -> Result<String> {
        if let Some(folder) = folder {
            self.session = Some(FolderSession::scan(folder)?);
        }

        let session = self.session.as_mut().ok_or(HostError::NoFolder)?;
        let path = session.next().ok_or(HostError::QueueEmpty)?;
        Ok(path.display().to_string())
    }

    fn add_file(&mut self, add: &AddFile) -> Result<()> {
        if add.filename.is_empty() || add.filename.contains(['/', '\\']) {
            return Err(HostError::InvalidFileName(add.filename.clone()));
        }
        let tags = add.tag_list();
        if tags.is_empty() {
            return Err(HostError::NoTags(add.filename.clone()));
        }

        let folder = Path::new(&add.folder);
        let source = folder.join(&add.filename);
        let tagged_dir = folder.join(TAGGED_DIR);

        let new_name = if add.rename {
            Some(hashed_name(&source)?)
        } else {
            None
        };

        let dest = app_fs::move_into(&source, &tagged_dir, new_name.as_deref())?;
        let file = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| add.filename.clone());

        let entry = LedgerEntry {
            file,
            original_name: add.filename.clone(),
            tags,
            tagged_at: chrono::Utc::now(),
        };

        if let Err(e) = Ledger::in_dir(&tagged_dir).append(entry) {
            // Keep disk and ledger consistent: put the image back in the queue folder
            if let Err(undo) = app_fs::move_into(&dest, folder, Some(&add.filename)) {
                tracing::error!("Could not restore {:?} after ledger failure: {}", dest, undo);
            }
            return Err(e);
        }

        tracing::info!("Tagged {} -> {:?}", add.filename, dest);
        Ok(())
    }

    fn stats_push(&self, folder: &Path) -> Option<BackendEvent> {
        match folder_stats(folder) {
            Ok(stats) => Some(BackendEvent::Stats(stats)),
            Err(e) => {
                tracing::warn!("Could not count images in {:?}: {}", folder, e);
                None
            }
        }
    }

    /// Folder the queue was built from
    #[cfg(test)]
    pub fn current_folder(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.folder.as_path())
    }
}

/// `<xxh3 of contents as 16 hex digits>.<lowercase extension>`
fn hashed_name(path: &Path) -> Result<String> {
    let content = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            HostError::Fs(app_fs::FsError::NotFound(path.display().to_string()))
        }
        _ => HostError::Io(e),
    })?;
    let hash = format!("{:016x}", xxh3_64(&content));

    Ok(match path.extension() {
        Some(ext) => format!("{}.{}", hash, ext.to_string_lossy().to_lowercase()),
        None => hash,
    })
}

/// Tagged = images in `tagged/`; total = tagged + images still in the folder
pub fn folder_stats(folder: &Path) -> Result<Stats> {
    let untagged = app_fs::count_images(folder)? as u64;
    let tagged = app_fs::count_images(folder.join(TAGGED_DIR))? as u64;
    Ok(Stats {
        tagged,
        total: tagged + untagged,
    })
}

fn open_output_file(folder: &Path) -> Result<()> {
    let ledger = Ledger::in_dir(&folder.join(TAGGED_DIR));
    if !ledger.path().exists() {
        return Err(HostError::NoLedger);
    }
    app_fs::open_external(ledger.path())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::ScriptedPicker;
    use std::fs;

    fn backend(answers: Vec<Option<PathBuf>>) -> TaggingBackend<ScriptedPicker> {
        TaggingBackend::new(ScriptedPicker(answers.into()))
    }

    fn folder_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        dir
    }

    fn folder_arg(dir: &tempfile::TempDir) -> String {
        dir.path().display().to_string()
    }

    fn add(dir: &tempfile::TempDir, filename: &str, tags: &str, rename: bool) -> BackendRequest {
        BackendRequest::AddFile(AddFile {
            folder: folder_arg(dir),
            filename: filename.to_string(),
            tags: tags.to_string(),
            rename,
        })
    }

    #[test]
    fn test_dialog_cancel() {
        let mut host = backend(vec![None]);
        assert_eq!(
            host.handle(BackendRequest::OpenFolderDialog),
            vec![BackendEvent::FolderOpened(Err("No folder selected".to_string()))]
        );
    }

    #[test]
    fn test_dialog_selection_pushes_stats() {
        let dir = folder_with(&["a.png", "b.jpg", "notes.txt"]);
        let mut host = backend(vec![Some(dir.path().to_path_buf())]);

        let events = host.handle(BackendRequest::OpenFolderDialog);
        assert_eq!(events.len(), 2);
        match &events[0] {
            BackendEvent::FolderOpened(Ok(selection)) => {
                assert_eq!(selection.folder, folder_arg(&dir));
                assert_eq!(selection.path_sep, std::path::MAIN_SEPARATOR_STR);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(events[1], BackendEvent::Stats(Stats { tagged: 0, total: 2 }));
    }

    #[test]
    fn test_next_file_walks_queue_in_natural_order() {
        let dir = folder_with(&["img10.png", "img2.png", "img1.png"]);
        let mut host = backend(vec![]);

        let first = host.handle(BackendRequest::NextFile { folder: Some(folder_arg(&dir)) });
        assert_eq!(
            first,
            vec![BackendEvent::NextFile(Ok(dir.path().join("img1.png").display().to_string()))]
        );
        assert_eq!(host.current_folder(), Some(dir.path()));

        // Skip: the next request without a folder continues the queue
        let second = host.handle(BackendRequest::NextFile { folder: None });
        assert_eq!(
            second,
            vec![BackendEvent::NextFile(Ok(dir.path().join("img2.png").display().to_string()))]
        );

        host.handle(BackendRequest::NextFile { folder: None });
        assert_eq!(
            host.handle(BackendRequest::NextFile { folder: None }),
            vec![BackendEvent::NextFile(Err(
                "No more untagged images in this folder".to_string()
            ))]
        );
    }

    #[test]
    fn test_next_file_without_folder() {
        let mut host = backend(vec![]);
        assert_eq!(
            host.handle(BackendRequest::NextFile { folder: None }),
            vec![BackendEvent::NextFile(Err("No folder selected".to_string()))]
        );
    }

    #[test]
    fn test_add_file_moves_and_records() {
        let dir = folder_with(&["a.png", "b.png"]);
        let mut host = backend(vec![]);
        host.handle(BackendRequest::NextFile { folder: Some(folder_arg(&dir)) });

        let events = host.handle(add(&dir, "a.png", "ecchi;boobs", false));
        assert_eq!(
            events,
            vec![
                BackendEvent::FileAdded(Ok(())),
                BackendEvent::Stats(Stats { tagged: 1, total: 2 }),
            ]
        );

        assert!(!dir.path().join("a.png").exists());
        assert!(dir.path().join(TAGGED_DIR).join("a.png").exists());

        let entries = Ledger::in_dir(&dir.path().join(TAGGED_DIR)).entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file, "a.png");
        assert_eq!(entries[0].original_name, "a.png");
        assert_eq!(entries[0].tags, vec!["ecchi", "boobs"]);

        // The chained next-file lands on the remaining image
        assert_eq!(
            host.handle(BackendRequest::NextFile { folder: None }),
            vec![BackendEvent::NextFile(Ok(dir.path().join("b.png").display().to_string()))]
        );
    }

    #[test]
    fn test_add_file_rename_uses_content_hash() {
        let dir = folder_with(&["Photo.PNG"]);
        let mut host = backend(vec![]);

        host.handle(add(&dir, "Photo.PNG", "ecchi", true));

        let expected = format!("{:016x}.png", xxh3_64(b"Photo.PNG"));
        assert!(dir.path().join(TAGGED_DIR).join(&expected).exists());

        let entries = Ledger::in_dir(&dir.path().join(TAGGED_DIR)).entries().unwrap();
        assert_eq!(entries[0].file, expected);
        assert_eq!(entries[0].original_name, "Photo.PNG");
    }

    #[test]
    fn test_add_file_never_overwrites() {
        let dir = folder_with(&["a.png"]);
        fs::create_dir(dir.path().join(TAGGED_DIR)).unwrap();
        fs::write(dir.path().join(TAGGED_DIR).join("a.png"), b"older").unwrap();
        let mut host = backend(vec![]);

        let events = host.handle(add(&dir, "a.png", "ecchi", false));
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], BackendEvent::FileAdded(Err(_))));
        assert!(dir.path().join("a.png").exists());
        assert_eq!(fs::read(dir.path().join(TAGGED_DIR).join("a.png")).unwrap(), b"older");
    }

    #[test]
    fn test_add_file_rejects_bad_input() {
        let dir = folder_with(&["a.png"]);
        let mut host = backend(vec![]);

        for request in [
            add(&dir, "../a.png", "ecchi", false),
            add(&dir, "a.png", ";;", false),
            add(&dir, "missing.png", "ecchi", false),
            add(&dir, "missing.png", "ecchi", true),
        ] {
            let events = host.handle(request);
            assert!(matches!(&events[..], [BackendEvent::FileAdded(Err(_))]));
        }
        assert!(dir.path().join("a.png").exists());
    }

    #[test]
    fn test_open_output_file_without_ledger() {
        let dir = folder_with(&[]);
        let mut host = backend(vec![]);
        assert_eq!(
            host.handle(BackendRequest::OpenOutputFile { folder: folder_arg(&dir) }),
            vec![BackendEvent::OutputFileOpened(Err(
                "Nothing tagged in this folder yet".to_string()
            ))]
        );
    }

    #[test]
    fn test_stats_for_missing_tagged_dir() {
        let dir = folder_with(&["a.png", "b.gif"]);
        assert_eq!(folder_stats(dir.path()).unwrap(), Stats { tagged: 0, total: 2 });
    }
}
