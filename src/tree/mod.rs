//! In-memory model of the bot's file hierarchy
//!
//! The backend lists files and folders flat, each carrying the UUID of its
//! parent folder. [`FolderNode::try_adopt`] attaches a node below the
//! matching folder; [`Forest`] drives it over a whole listing.

pub mod file;
pub mod folder;
pub mod forest;

pub use file::FileNode;
pub use folder::FolderNode;
pub use forest::{Forest, ForestBuilder};

use serde_json::Value;

use crate::bot::{remote, BotError, RawRecord, Transport, FOLDER_KIND};

/// A file or folder in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Folder(FolderNode),
    File(FileNode),
}

impl Node {
    /// Build the node for a record: a folder iff `type == "folder"`
    pub fn from_record(record: RawRecord) -> Self {
        if record.is_folder() {
            Node::Folder(FolderNode::new(record))
        } else {
            Node::File(FileNode::new(record))
        }
    }

    pub fn record(&self) -> &RawRecord {
        match self {
            Node::Folder(folder) => folder.record(),
            Node::File(file) => file.record(),
        }
    }

    pub fn uuid(&self) -> &str {
        &self.record().uuid
    }

    pub fn parent_uuid(&self) -> &str {
        self.record().parent()
    }

    pub fn title(&self) -> &str {
        self.record().title()
    }

    pub fn kind(&self) -> &str {
        self.record().kind()
    }

    pub fn is_root(&self) -> bool {
        self.parent_uuid().is_empty()
    }

    /// True for folder nodes that the recursive search descends into
    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder(folder) if folder.kind() == FOLDER_KIND)
    }

    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(file) => Some(file),
            Node::Folder(_) => None,
        }
    }

    /// Children of a folder, empty for files
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Folder(folder) => folder.children(),
            Node::File(_) => &[],
        }
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

impl From<FolderNode> for Node {
    fn from(folder: FolderNode) -> Self {
        Node::Folder(folder)
    }
}

impl From<FileNode> for Node {
    fn from(file: FileNode) -> Self {
        Node::File(file)
    }
}

/// Pre-order traversal yielding `(depth, node)`
pub struct Walk<'a> {
    stack: Vec<(usize, std::slice::Iter<'a, Node>)>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(nodes: &'a [Node]) -> Self {
        Self {
            stack: vec![(0, nodes.iter())],
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (depth, iter) = self.stack.last_mut()?;
            let depth = *depth;
            let next = iter.next();
            match next {
                Some(node) => {
                    let children = node.children();
                    if !children.is_empty() {
                        self.stack.push((depth + 1, children.iter()));
                    }
                    return Some((depth, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_records {
    use crate::bot::RawRecord;

    pub fn folder(uuid: &str, parent: &str) -> RawRecord {
        RawRecord {
            uuid: uuid.to_string(),
            title: Some(format!("Folder {}", uuid)),
            kind: Some("folder".to_string()),
            parent: Some(parent.to_string()),
            ..RawRecord::default()
        }
    }

    pub fn file(uuid: &str, parent: &str) -> RawRecord {
        RawRecord {
            uuid: uuid.to_string(),
            title: Some(format!("Track {}", uuid)),
            kind: Some("url".to_string()),
            parent: Some(parent.to_string()),
            ..RawRecord::default()
        }
    }

    pub fn untyped(uuid: &str, parent: &str) -> RawRecord {
        RawRecord {
            uuid: uuid.to_string(),
            parent: Some(parent.to_string()),
            ..RawRecord::default()
        }
    }
}
