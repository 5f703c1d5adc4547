//! Remote file operations
//!
//! Thin passthroughs: each call issues exactly one transport request and
//! returns the bot's answer verbatim. None of them touch an in-memory tree;
//! re-fetch after a mutation to see its effect.

use serde_json::{json, Value};
use tracing::debug;

use super::{BotError, Method, RawRecord, Transport};

const FILES_PATH: &str = "/bot/files";
const FOLDERS_PATH: &str = "/bot/folders";
const DEFAULT_FOLDER_NAME: &str = "Folder";

fn file_path(uuid: &str) -> String {
    format!("{}/{}", FILES_PATH, uuid)
}

/// Fetch the flat file/folder listing
pub async fn list_files<T: Transport + ?Sized>(transport: &T) -> Result<Vec<RawRecord>, BotError> {
    let value = transport.request(FILES_PATH, Method::Get, None).await?;
    let records = RawRecord::list_from_value(value)?;
    debug!("Listed {} entries", records.len());
    Ok(records)
}

/// Delete a file or folder
pub async fn delete<T: Transport + ?Sized>(transport: &T, uuid: &str) -> Result<Value, BotError> {
    transport.request(&file_path(uuid), Method::Delete, None).await
}

/// Patch arbitrary attributes (title, artist, album, ...)
pub async fn edit<T: Transport + ?Sized>(
    transport: &T,
    uuid: &str,
    options: Value,
) -> Result<Value, BotError> {
    transport.request(&file_path(uuid), Method::Patch, Some(options)).await
}

/// Move an entry below `parent`; `None` or `""` means root
pub async fn move_entry<T: Transport + ?Sized>(
    transport: &T,
    uuid: &str,
    parent: Option<&str>,
) -> Result<Value, BotError> {
    let body = json!({ "parent": parent.unwrap_or("") });
    transport.request(&file_path(uuid), Method::Patch, Some(body)).await
}

/// Create a folder; name defaults to "Folder", parent to root
pub async fn add_folder<T: Transport + ?Sized>(
    transport: &T,
    name: Option<&str>,
    parent: Option<&str>,
) -> Result<Value, BotError> {
    let body = json!({
        "name": name.unwrap_or(DEFAULT_FOLDER_NAME),
        "parent": parent.unwrap_or(""),
    });
    transport.request(FOLDERS_PATH, Method::Post, Some(body)).await
}

/// Move a folder below `parent`; same request as [`move_entry`]
pub async fn move_folder<T: Transport + ?Sized>(
    transport: &T,
    folder_uuid: &str,
    parent: Option<&str>,
) -> Result<Value, BotError> {
    move_entry(transport, folder_uuid, parent).await
}

pub async fn rename_folder<T: Transport + ?Sized>(
    transport: &T,
    name: &str,
    folder_uuid: &str,
) -> Result<Value, BotError> {
    let body = json!({
        "uuid": folder_uuid,
        "type": super::FOLDER_KIND,
        "title": name,
    });
    transport.request(&file_path(folder_uuid), Method::Patch, Some(body)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::testing::{FailingTransport, RecordingTransport};

    #[tokio::test]
    async fn test_delete_request() {
        let transport = RecordingTransport::new(json!({"success": true}));
        let result = delete(&transport, "abc").await.unwrap();
        assert_eq!(result, json!({"success": true}));
        assert_eq!(
            transport.calls(),
            vec![("/bot/files/abc".to_string(), Method::Delete, None)]
        );
    }

    #[tokio::test]
    async fn test_edit_passes_options_verbatim() {
        let transport = RecordingTransport::new(Value::Null);
        let options = json!({"title": "Song", "artist": "Band", "album": "LP"});
        edit(&transport, "f1", options.clone()).await.unwrap();
        assert_eq!(
            transport.calls(),
            vec![("/bot/files/f1".to_string(), Method::Patch, Some(options))]
        );
    }

    #[tokio::test]
    async fn test_move_defaults_to_root() {
        let transport = RecordingTransport::new(Value::Null);
        move_entry(&transport, "f1", None).await.unwrap();
        move_entry(&transport, "f1", Some("B")).await.unwrap();
        move_folder(&transport, "B", None).await.unwrap();

        let calls = transport.calls();
        let to_root = Some(json!({"parent": ""}));
        assert_eq!(calls[0], ("/bot/files/f1".to_string(), Method::Patch, to_root.clone()));
        assert_eq!(calls[1].2, Some(json!({"parent": "B"})));
        assert_eq!(calls[2], ("/bot/files/B".to_string(), Method::Patch, to_root));
    }

    #[tokio::test]
    async fn test_add_folder_defaults() {
        let transport = RecordingTransport::new(Value::Null);
        add_folder(&transport, None, None).await.unwrap();
        add_folder(&transport, Some("Jazz"), Some("A")).await.unwrap();

        let calls = transport.calls();
        let default_body = Some(json!({"name": "Folder", "parent": ""}));
        assert_eq!(calls[0], ("/bot/folders".to_string(), Method::Post, default_body));
        assert_eq!(calls[1].2, Some(json!({"name": "Jazz", "parent": "A"})));
    }

    #[tokio::test]
    async fn test_rename_folder_body() {
        let transport = RecordingTransport::new(Value::Null);
        rename_folder(&transport, "Rock", "B").await.unwrap();
        assert_eq!(
            transport.calls(),
            vec![(
                "/bot/files/B".to_string(),
                Method::Patch,
                Some(json!({"uuid": "B", "type": "folder", "title": "Rock"}))
            )]
        );
    }

    #[tokio::test]
    async fn test_list_files_parses_records() {
        let transport = RecordingTransport::new(json!([
            {"uuid": "A", "type": "folder", "parent": "", "title": "Music"},
            {"uuid": "f1", "type": "url", "parent": "A"},
        ]));
        let records = list_files(&transport).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_folder());
        assert_eq!(records[1].parent(), "A");
        assert_eq!(transport.calls()[0].1, Method::Get);
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let err = delete(&FailingTransport, "abc").await.unwrap_err();
        assert!(matches!(err, BotError::ServerError(_)));
    }
}
