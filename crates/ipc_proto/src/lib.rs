//! IPC Protocol definitions for UI <-> Tagging Host communication
//!
//! This crate defines the closed set of messages exchanged between the tagging
//! UI and the privileged host process that owns the file system. On the wire
//! every message is a named envelope carrying a positional argument list,
//! serialized as one JSON object per line:
//!
//! ```text
//! {"name":"add-file","args":["/imgs","a.png","ecchi;boobs",false]}
//! ```
//!
//! In-process both sides only ever see [`BackendRequest`] and [`BackendEvent`],
//! so every message kind is matched exhaustively.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use thiserror::Error;

/// Message names used on the wire
pub mod names {
    pub const OPEN_FOLDER_DIALOG: &str = "open-folder-dialog";
    pub const NEXT_FILE: &str = "next-file";
    pub const ADD_FILE: &str = "add-file";
    pub const OPEN_OUTPUT_FILE: &str = "open-output-file";
    pub const STATS: &str = "stats";
    pub const SHUTDOWN: &str = "shutdown";
}

/// Separator between tags in an `add-file` request
pub const TAG_DELIMITER: char = ';';

/// Protocol errors
#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown message: {0}")]
    UnknownMessage(String),

    #[error("Bad argument {index} for {message}: expected {expected}")]
    BadArgument {
        message: String,
        index: usize,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ProtoError>;

/// A named message with positional arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Envelope {
    pub fn new(name: &str, args: Vec<Value>) -> Self {
        Self {
            name: name.to_string(),
            args,
        }
    }

    fn str_arg(&self, index: usize) -> Result<String> {
        self.args
            .get(index)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| self.bad_arg(index, "string"))
    }

    fn bool_arg(&self, index: usize) -> Result<bool> {
        self.args
            .get(index)
            .and_then(Value::as_bool)
            .ok_or_else(|| self.bad_arg(index, "bool"))
    }

    fn payload(&self) -> Result<Value> {
        self.args
            .first()
            .cloned()
            .ok_or_else(|| self.bad_arg(0, "object"))
    }

    fn bad_arg(&self, index: usize, expected: &'static str) -> ProtoError {
        ProtoError::BadArgument {
            message: self.name.clone(),
            index,
            expected,
        }
    }
}

/// Payload of an `add-file` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddFile {
    /// Folder the file lives in
    pub folder: String,
    /// Bare file name inside `folder`
    pub filename: String,
    /// Tags joined by [`TAG_DELIMITER`]
    pub tags: String,
    /// Rename the file when moving it
    pub rename: bool,
}

impl AddFile {
    /// Join a tag list the way the wire expects it
    pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
        tags.iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(&TAG_DELIMITER.to_string())
    }

    /// Split the joined tag string, dropping empty pieces
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(TAG_DELIMITER)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Requests sent from the UI to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendRequest {
    /// Show the native folder picker
    OpenFolderDialog,

    /// Advance to the next image; a folder restarts the queue from that folder
    NextFile { folder: Option<String> },

    /// Record tags for a file and move it out of the queue
    AddFile(AddFile),

    /// Open the folder's tag ledger with the default application
    OpenOutputFile { folder: String },

    /// Graceful shutdown
    Shutdown,
}

impl BackendRequest {
    /// Wire name of this request
    pub fn name(&self) -> &'static str {
        match self {
            BackendRequest::OpenFolderDialog => names::OPEN_FOLDER_DIALOG,
            BackendRequest::NextFile { .. } => names::NEXT_FILE,
            BackendRequest::AddFile(_) => names::ADD_FILE,
            BackendRequest::OpenOutputFile { .. } => names::OPEN_OUTPUT_FILE,
            BackendRequest::Shutdown => names::SHUTDOWN,
        }
    }

    pub fn to_envelope(&self) -> Envelope {
        let args = match self {
            BackendRequest::OpenFolderDialog | BackendRequest::Shutdown => Vec::new(),
            BackendRequest::NextFile { folder } => folder.iter().map(|f| json!(f)).collect(),
            BackendRequest::AddFile(add) => vec![
                json!(add.folder),
                json!(add.filename),
                json!(add.tags),
                json!(add.rename),
            ],
            BackendRequest::OpenOutputFile { folder } => vec![json!(folder)],
        };
        Envelope::new(self.name(), args)
    }

    pub fn from_envelope(envelope: &Envelope) -> Result<Self> {
        match envelope.name.as_str() {
            names::OPEN_FOLDER_DIALOG => Ok(BackendRequest::OpenFolderDialog),
            names::NEXT_FILE => {
                let folder = match envelope.args.first() {
                    None | Some(Value::Null) => None,
                    Some(_) => Some(envelope.str_arg(0)?),
                };
                Ok(BackendRequest::NextFile { folder })
            }
            names::ADD_FILE => Ok(BackendRequest::AddFile(AddFile {
                folder: envelope.str_arg(0)?,
                filename: envelope.str_arg(1)?,
                tags: envelope.str_arg(2)?,
                rename: envelope.bool_arg(3)?,
            })),
            names::OPEN_OUTPUT_FILE => Ok(BackendRequest::OpenOutputFile {
                folder: envelope.str_arg(0)?,
            }),
            names::SHUTDOWN => Ok(BackendRequest::Shutdown),
            other => Err(ProtoError::UnknownMessage(other.to_string())),
        }
    }
}

/// Folder chosen in the host's folder dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSelection {
    pub folder: String,
    #[serde(rename = "pathSep")]
    pub path_sep: String,
}

/// Tagging progress for the current folder, owned by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub tagged: u64,
    pub total: u64,
}

impl Stats {
    pub fn untagged(&self) -> u64 {
        self.total.saturating_sub(self.tagged)
    }
}

/// Replies and pushes sent from the host to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Reply to `open-folder-dialog`
    FolderOpened(std::result::Result<FolderSelection, String>),

    /// Reply to `next-file`: the full path of the next image
    NextFile(std::result::Result<String, String>),

    /// Reply to `add-file`
    FileAdded(std::result::Result<(), String>),

    /// Reply to `open-output-file`
    OutputFileOpened(std::result::Result<(), String>),

    /// Unsolicited progress push
    Stats(Stats),
}

/// Wire shape shared by every `{success, ...}` reply
#[derive(Debug, Default, Serialize, Deserialize)]
struct Reply {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl BackendEvent {
    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        match self {
            BackendEvent::FolderOpened(_) => names::OPEN_FOLDER_DIALOG,
            BackendEvent::NextFile(_) => names::NEXT_FILE,
            BackendEvent::FileAdded(_) => names::ADD_FILE,
            BackendEvent::OutputFileOpened(_) => names::OPEN_OUTPUT_FILE,
            BackendEvent::Stats(_) => names::STATS,
        }
    }

    pub fn to_envelope(&self) -> Result<Envelope> {
        let payload = match self {
            BackendEvent::FolderOpened(Ok(selection)) => serde_json::to_value(selection)?,
            BackendEvent::FolderOpened(Err(message)) | BackendEvent::NextFile(Err(message)) => {
                serde_json::to_value(Reply {
                    message: Some(message.clone()),
                    ..Default::default()
                })?
            }
            BackendEvent::NextFile(Ok(file)) => serde_json::to_value(Reply {
                success: true,
                file: Some(file.clone()),
                ..Default::default()
            })?,
            BackendEvent::FileAdded(result) | BackendEvent::OutputFileOpened(result) => {
                serde_json::to_value(match result {
                    Ok(()) => Reply {
                        success: true,
                        ..Default::default()
                    },
                    Err(error) => Reply {
                        error: Some(error.clone()),
                        ..Default::default()
                    },
                })?
            }
            BackendEvent::Stats(stats) => serde_json::to_value(stats)?,
        };
        Ok(Envelope::new(self.name(), vec![payload]))
    }

    pub fn from_envelope(envelope: &Envelope) -> Result<Self> {
        match envelope.name.as_str() {
            names::OPEN_FOLDER_DIALOG => {
                let payload = envelope.payload()?;
                if payload.get("folder").is_some() {
                    Ok(BackendEvent::FolderOpened(Ok(serde_json::from_value(payload)?)))
                } else {
                    let reply: Reply = serde_json::from_value(payload)?;
                    Ok(BackendEvent::FolderOpened(Err(reply.message.unwrap_or_default())))
                }
            }
            names::NEXT_FILE => {
                let reply: Reply = serde_json::from_value(envelope.payload()?)?;
                match (reply.success, reply.file) {
                    (true, Some(file)) => Ok(BackendEvent::NextFile(Ok(file))),
                    (true, None) => Err(envelope.bad_arg(0, "reply with file")),
                    (false, _) => Ok(BackendEvent::NextFile(Err(reply.message.unwrap_or_default()))),
                }
            }
            names::ADD_FILE => Ok(BackendEvent::FileAdded(Self::ack(envelope)?)),
            names::OPEN_OUTPUT_FILE => Ok(BackendEvent::OutputFileOpened(Self::ack(envelope)?)),
            names::STATS => Ok(BackendEvent::Stats(serde_json::from_value(envelope.payload()?)?)),
            other => Err(ProtoError::UnknownMessage(other.to_string())),
        }
    }

    fn ack(envelope: &Envelope) -> Result<std::result::Result<(), String>> {
        let reply: Reply = serde_json::from_value(envelope.payload()?)?;
        if reply.success {
            Ok(Ok(()))
        } else {
            Ok(Err(reply.error.or(reply.message).unwrap_or_default()))
        }
    }
}

/// Write one envelope as a JSON line and flush
pub fn write_message<W: Write>(writer: &mut W, envelope: &Envelope) -> Result<()> {
    serde_json::to_writer(&mut *writer, envelope)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read the next envelope; `None` at end of stream. Blank lines are skipped.
pub fn read_message<R: BufRead>(reader: &mut R) -> Result<Option<Envelope>> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            return Ok(Some(serde_json::from_str(line.trim())?));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_add_file_positional_args() {
        let request = BackendRequest::AddFile(AddFile {
            folder: "/imgs".to_string(),
            filename: "a.png".to_string(),
            tags: AddFile::join_tags(&["ecchi", "boobs"]),
            rename: false,
        });

        let envelope = request.to_envelope();
        assert_eq!(envelope.name, "add-file");
        assert_eq!(Value::Array(envelope.args.clone()), json!(["/imgs", "a.png", "ecchi;boobs", false]));
        assert_eq!(BackendRequest::from_envelope(&envelope).unwrap(), request);
    }

    #[test]
    fn test_next_file_folder_is_optional() {
        let bare = BackendRequest::NextFile { folder: None }.to_envelope();
        assert!(bare.args.is_empty());

        let parsed: Envelope = serde_json::from_str(r#"{"name":"next-file","args":["/imgs"]}"#).unwrap();
        assert_eq!(
            BackendRequest::from_envelope(&parsed).unwrap(),
            BackendRequest::NextFile { folder: Some("/imgs".to_string()) }
        );
    }

    #[test]
    fn test_reply_shapes() {
        let ok = BackendEvent::NextFile(Ok("/imgs/a.png".to_string())).to_envelope().unwrap();
        assert_eq!(ok.args[0], json!({"success": true, "file": "/imgs/a.png"}));

        let failed = BackendEvent::NextFile(Err("folder empty".to_string())).to_envelope().unwrap();
        assert_eq!(failed.args[0], json!({"success": false, "message": "folder empty"}));

        let rejected = BackendEvent::FileAdded(Err("exists".to_string())).to_envelope().unwrap();
        assert_eq!(rejected.args[0], json!({"success": false, "error": "exists"}));

        let folder = BackendEvent::FolderOpened(Ok(FolderSelection {
            folder: "/imgs".to_string(),
            path_sep: "/".to_string(),
        }))
        .to_envelope()
        .unwrap();
        assert_eq!(folder.args[0], json!({"folder": "/imgs", "pathSep": "/"}));
    }

    #[test]
    fn test_parse_backend_replies() {
        let env: Envelope =
            serde_json::from_str(r#"{"name":"next-file","args":[{"success":false,"message":"folder empty"}]}"#).unwrap();
        assert_eq!(
            BackendEvent::from_envelope(&env).unwrap(),
            BackendEvent::NextFile(Err("folder empty".to_string()))
        );

        let env: Envelope = serde_json::from_str(r#"{"name":"stats","args":[{"tagged":3,"total":10}]}"#).unwrap();
        match BackendEvent::from_envelope(&env).unwrap() {
            BackendEvent::Stats(stats) => assert_eq!(stats.untagged(), 7),
            other => panic!("Wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_line_codec() {
        let mut buf = Vec::new();
        write_message(&mut buf, &BackendRequest::OpenFolderDialog.to_envelope()).unwrap();
        write_message(&mut buf, &BackendRequest::Shutdown.to_envelope()).unwrap();

        let mut reader = Cursor::new(buf);
        let first = read_message(&mut reader).unwrap().unwrap();
        assert_eq!(BackendRequest::from_envelope(&first).unwrap(), BackendRequest::OpenFolderDialog);
        let second = read_message(&mut reader).unwrap().unwrap();
        assert_eq!(BackendRequest::from_envelope(&second).unwrap(), BackendRequest::Shutdown);
        assert!(read_message(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_bad_arguments() {
        let env = Envelope::new(names::ADD_FILE, vec![json!("/imgs"), json!(1)]);
        assert!(matches!(
            BackendRequest::from_envelope(&env),
            Err(ProtoError::BadArgument { index: 1, .. })
        ));

        let env = Envelope::new("delete-everything", Vec::new());
        assert!(matches!(BackendRequest::from_envelope(&env), Err(ProtoError::UnknownMessage(_))));
    }
}
