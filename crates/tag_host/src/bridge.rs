//! stdin/stdout loop between the UI and the backend

use crate::backend::TaggingBackend;
use crate::picker::FolderPicker;
use anyhow::Result;
use ipc_proto::{read_message, write_message, BackendRequest};
use std::io::{BufRead, Write};

/// Serve requests until EOF or `shutdown`.
///
/// A malformed or unknown message is logged and skipped; operation failures
/// are already turned into failure replies by the backend.
pub fn run<R, W, P>(mut reader: R, mut writer: W, backend: &mut TaggingBackend<P>) -> Result<()>
where
    R: BufRead,
    W: Write,
    P: FolderPicker,
{
    tracing::info!("Bridge ready");

    loop {
        let envelope = match read_message(&mut reader) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                tracing::info!("Input closed, shutting down");
                break;
            }
            Err(ipc_proto::ProtoError::Json(e)) => {
                tracing::warn!("Discarding unreadable line: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let request = match BackendRequest::from_envelope(&envelope) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Ignoring message: {}", e);
                continue;
            }
        };

        if request == BackendRequest::Shutdown {
            tracing::info!("Shutdown requested");
            break;
        }

        for event in backend.handle(request) {
            write_message(&mut writer, &event.to_envelope()?)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::ScriptedPicker;
    use ipc_proto::{BackendEvent, Envelope};
    use std::collections::VecDeque;
    use std::io::Cursor;

    fn replies(output: Vec<u8>) -> Vec<BackendEvent> {
        let mut reader = Cursor::new(output);
        let mut events = Vec::new();
        while let Some(envelope) = read_message(&mut reader).unwrap() {
            events.push(BackendEvent::from_envelope(&envelope).unwrap());
        }
        events
    }

    #[test]
    fn test_serves_until_shutdown() {
        let input = concat!(
            "{\"name\":\"open-folder-dialog\",\"args\":[]}\n",
            "not json\n",
            "{\"name\":\"rotate-image\",\"args\":[]}\n",
            "{\"name\":\"shutdown\",\"args\":[]}\n",
            "{\"name\":\"open-folder-dialog\",\"args\":[]}\n",
        );
        let mut backend = TaggingBackend::new(ScriptedPicker(VecDeque::from([None, None])));
        let mut output = Vec::new();

        run(Cursor::new(input), &mut output, &mut backend).unwrap();

        assert_eq!(
            replies(output),
            vec![BackendEvent::FolderOpened(Err("No folder selected".to_string()))]
        );
    }

    #[test]
    fn test_eof_ends_loop() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();

        let request = Envelope::new(
            ipc_proto::names::NEXT_FILE,
            vec![serde_json::json!(dir.path().display().to_string())],
        );
        let mut input = Vec::new();
        write_message(&mut input, &request).unwrap();

        let mut backend = TaggingBackend::new(ScriptedPicker(VecDeque::new()));
        let mut output = Vec::new();
        run(Cursor::new(input), &mut output, &mut backend).unwrap();

        assert_eq!(
            replies(output),
            vec![BackendEvent::NextFile(Ok(dir.path().join("a.png").display().to_string()))]
        );
    }
}
