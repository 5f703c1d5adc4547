//! Folder nodes and recursive adoption

use serde_json::Value;

use super::{Node, Walk};
use crate::bot::{remote, BotError, RawRecord, Transport, FOLDER_KIND};

/// A folder owning an ordered list of children
///
/// Children are only ever appended, through [`FolderNode::try_adopt`], and
/// keep the order in which they were adopted.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    record: RawRecord,
    children: Vec<Node>,
}

impl FolderNode {
    /// Wrap a raw record. The record's `uuid` is the folder's identity and
    /// is expected to be unique across the listing.
    pub fn new(record: RawRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn record(&self) -> &RawRecord {
        &self.record
    }

    pub fn uuid(&self) -> &str {
        &self.record.uuid
    }

    /// Parent folder UUID, empty for a root
    pub fn parent_uuid(&self) -> &str {
        self.record.parent()
    }

    pub fn title(&self) -> &str {
        self.record.title()
    }

    /// `"folder"`, or empty when the record carried no type
    pub fn kind(&self) -> &str {
        self.record.kind()
    }

    pub fn is_root(&self) -> bool {
        self.parent_uuid().is_empty()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Attach `candidate` below the folder in this subtree whose UUID matches
    /// the candidate's parent.
    ///
    /// This folder is checked first, then child folders depth-first in
    /// insertion order; the first match wins. When nothing in the subtree
    /// matches, the candidate is handed back in `Err` so the caller can park
    /// it and retry once its parent exists.
    pub fn try_adopt(&mut self, candidate: Node) -> Result<(), Node> {
        if candidate.parent_uuid() == self.uuid() {
            self.children.push(candidate);
            return Ok(());
        }

        let mut candidate = candidate;
        for child in &mut self.children {
            let Node::Folder(folder) = child else {
                continue;
            };
            if folder.kind() != FOLDER_KIND {
                continue;
            }
            match folder.try_adopt(candidate) {
                Ok(()) => return Ok(()),
                Err(rejected) => candidate = rejected,
            }
        }

        Err(candidate)
    }

    /// Pre-order walk over all descendants; direct children have depth 0
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.children)
    }

    /// First descendant with the given UUID
    pub fn find(&self, uuid: &str) -> Option<&Node> {
        self.walk().map(|(_, node)| node).find(|node| node.uuid() == uuid)
    }

    /// Number of descendants
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
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

    pub async fn add_folder<T: Transport + ?Sized>(
        &self,
        transport: &T,
        name: Option<&str>,
        parent: Option<&str>,
    ) -> Result<Value, BotError> {
        remote::add_folder(transport, name, parent).await
    }

    pub async fn move_folder<T: Transport + ?Sized>(
        &self,
        transport: &T,
        folder_uuid: &str,
        parent: Option<&str>,
    ) -> Result<Value, BotError> {
        remote::move_folder(transport, folder_uuid, parent).await
    }

    pub async fn rename_folder<T: Transport + ?Sized>(
        &self,
        transport: &T,
        name: &str,
        folder_uuid: &str,
    ) -> Result<Value, BotError> {
        remote::rename_folder(transport, name, folder_uuid).await
    }
}
