use serde_json::Value;

use crate::bot::{remote, BotError, RawRecord, Transport};

/// A leaf entry (track, stream URL, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    record: RawRecord,
}

impl FileNode {
    pub fn new(record: RawRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &RawRecord {
        &self.record
    }

    pub fn uuid(&self) -> &str {
        &self.record.uuid
    }

    pub fn parent_uuid(&self) -> &str {
        self.record.parent()
    }

    pub fn title(&self) -> &str {
        self.record.title()
    }

    pub fn kind(&self) -> &str {
        self.record.kind()
    }

    pub fn is_root(&self) -> bool {
        self.parent_uuid().is_empty()
    }

    /// Any other key of the listing entry, e.g. `artist` or `duration`
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.record.extra.get(key)
    }

    pub async fn delete<T: Transport + ?Sized>(&self, transport: &T) -> Result<Value, BotError> {
        remote::delete(transport, self.uuid()).await
    }

    pub async fn edit<T: Transport + ?Sized>(
        &self,
        transport: &T,
        options: Value,
    ) -> Result<Value, BotError> {
        remote::edit(transport, self.uuid(), options).await
    }

    pub async fn move_to<T: Transport + ?Sized>(
        &self,
        transport: &T,
        parent: Option<&str>,
    ) -> Result<Value, BotError> {
        remote::move_entry(transport, self.uuid(), parent).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_attributes() {
        let record: RawRecord = serde_json::from_value(serde_json::json!({
            "uuid": "f1",
            "parent": "A",
            "type": "url",
            "title": "Radio",
            "artist": "Station",
        }))
        .unwrap();
        let file = FileNode::new(record);

        assert_eq!(file.uuid(), "f1");
        assert_eq!(file.parent_uuid(), "A");
        assert_eq!(file.kind(), "url");
        assert_eq!(file.title(), "Radio");
        assert_eq!(file.attribute("artist"), Some(&serde_json::json!("Station")));
        assert_eq!(file.attribute("album"), None);
        assert!(!file.is_root());
    }

    #[tokio::test]
    async fn test_file_edit_request() {
        use crate::bot::testing::RecordingTransport;
        use crate::bot::Method;

        let transport = RecordingTransport::new(Value::Null);
        let file = FileNode::new(RawRecord {
            uuid: "f1".to_string(),
            ..RawRecord::default()
        });
        file.edit(&transport, serde_json::json!({"album": "B-Sides"})).await.unwrap();
        assert_eq!(
            transport.calls(),
            vec![(
                "/bot/files/f1".to_string(),
                Method::Patch,
                Some(serde_json::json!({"album": "B-Sides"}))
            )]
        );
    }
}
