//! Backend host process: spawning, request writing, reply reading

use app_core::AppError;
use crossbeam_channel::Sender;
use ipc_proto::{read_message, write_message, BackendEvent, BackendRequest};
use parking_lot::Mutex;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Messages delivered to the UI thread from worker threads
#[derive(Debug)]
pub enum AppMessage {
    Backend(BackendEvent),
    VocabularyLoaded(Vec<String>),
    BackendExited(String),
}

/// Executable name of the backend host
const HOST_NAME: &str = "tag_host";

/// `tag_host` next to the running executable, unless configured otherwise
pub fn host_path(configured: Option<&Path>) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }

    let file_name = format!("{}{}", HOST_NAME, std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

/// Running backend host. Requests go to its stdin; a reader thread forwards
/// its stdout replies into the UI channel.
pub struct BackendBridge {
    child: Child,
    stdin: Mutex<Option<ChildStdin>>,
    reader: Option<JoinHandle<()>>,
}

impl BackendBridge {
    pub fn spawn(path: &Path, messages: Sender<AppMessage>) -> Result<Self, AppError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| AppError::Bridge(format!("cannot start {}: {}", path.display(), e)))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            reap(&mut child);
            return Err(AppError::Bridge("host pipes unavailable".to_string()));
        };

        let spawned = std::thread::Builder::new()
            .name("backend-reader".to_string())
            .spawn(move || {
                let mut reader = BufReader::new(stdout);
                let reason = loop {
                    match read_message(&mut reader) {
                        Ok(Some(envelope)) => match BackendEvent::from_envelope(&envelope) {
                            Ok(event) => {
                                if messages.send(AppMessage::Backend(event)).is_err() {
                                    return;
                                }
                            }
                            Err(e) => tracing::warn!("Ignoring backend message: {}", e),
                        },
                        Ok(None) => break "backend process exited".to_string(),
                        Err(e) => break e.to_string(),
                    }
                };
                let _ = messages.send(AppMessage::BackendExited(reason));
            });

        let reader = match spawned {
            Ok(reader) => reader,
            Err(e) => {
                reap(&mut child);
                return Err(AppError::Io(e));
            }
        };

        tracing::info!("Backend host started: {} (pid {})", path.display(), child.id());

        Ok(Self {
            child,
            stdin: Mutex::new(Some(stdin)),
            reader: Some(reader),
        })
    }

    pub fn send(&self, request: &BackendRequest) -> Result<(), AppError> {
        let mut stdin = self.stdin.lock();
        let pipe = stdin
            .as_mut()
            .ok_or_else(|| AppError::Bridge("backend already shut down".to_string()))?;

        tracing::debug!("-> {}", request.name());
        write_message(pipe, &request.to_envelope())
            .map_err(|e| AppError::Bridge(format!("cannot reach backend: {}", e)))
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.send(&BackendRequest::Shutdown) {
            tracing::debug!("Shutdown request not delivered: {}", e);
        }
        // Closing stdin is the EOF the host also treats as shutdown
        self.stdin.lock().take();

        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    tracing::info!("Backend host exited: {}", status);
                    break;
                }
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(20));
                }
                _ => {
                    tracing::warn!("Backend host did not exit, killing it");
                    reap(&mut self.child);
                    break;
                }
            }
        }

        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

/// Kill the host and collect its exit status
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("Kill failed: {}", e);
    }
    let _ = child.wait();
}

impl Drop for BackendBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_host_path_wins() {
        let configured = PathBuf::from("/opt/tagger/tag_host");
        assert_eq!(host_path(Some(&configured)), configured);
    }

    #[test]
    fn test_default_host_path_is_sibling() {
        let path = host_path(None);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("tag_host"));
    }

    #[cfg(unix)]
    #[test]
    fn test_reap_collects_running_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        reap(&mut child);
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_missing_host_is_bridge_error() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let result = BackendBridge::spawn(Path::new("/nonexistent/tag_host"), tx);
        assert!(matches!(result, Err(AppError::Bridge(_))));
    }
}
