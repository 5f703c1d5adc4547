//! Tree assembly from a flat listing
//!
//! The listing comes in backend order, so a record can show up before the
//! folder it lives in. [`Forest::from_records`] indexes records by parent
//! first and then adopts them top-down, which places every reachable record
//! and keeps sibling order. [`ForestBuilder`] accepts records one at a time
//! and parks the ones whose parent has not been seen yet.

use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

use super::{FolderNode, Node, Walk};
use crate::bot::{remote, BotError, RawRecord, Transport};

/// Top-level entries with their subtrees, plus what could not be placed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    entries: Vec<Node>,
    orphans: Vec<Node>,
}

impl Forest {
    /// Assemble a listing in two passes.
    ///
    /// Records whose parent chain never reaches a top-level folder (unknown
    /// parent, cycles, self-parenting) end up in [`Forest::orphans`] in
    /// listing order.
    pub fn from_records(records: impl IntoIterator<Item = RawRecord>) -> Self {
        let mut entries = Vec::new();
        let mut by_parent: HashMap<String, Vec<(usize, RawRecord)>> = HashMap::new();

        for (idx, record) in records.into_iter().enumerate() {
            if record.parent().is_empty() {
                entries.push(Node::from_record(record));
            } else {
                by_parent
                    .entry(record.parent().to_string())
                    .or_default()
                    .push((idx, record));
            }
        }

        let mut unplaced = Vec::new();
        for entry in &mut entries {
            if !entry.is_folder() {
                continue;
            }
            let Node::Folder(root) = entry else {
                continue;
            };

            let mut queue = VecDeque::from([root.uuid().to_string()]);
            while let Some(parent) = queue.pop_front() {
                let Some(children) = by_parent.remove(&parent) else {
                    continue;
                };
                for (idx, record) in children {
                    let node = Node::from_record(record);
                    let uuid = node.is_folder().then(|| node.uuid().to_string());
                    match root.try_adopt(node) {
                        Ok(()) => queue.extend(uuid),
                        Err(node) => unplaced.push((idx, node)),
                    }
                }
            }
        }

        unplaced.extend(
            by_parent
                .into_values()
                .flatten()
                .map(|(idx, record)| (idx, Node::from_record(record))),
        );
        unplaced.sort_by_key(|(idx, _)| *idx);
        let orphans: Vec<Node> = unplaced.into_iter().map(|(_, node)| node).collect();

        let forest = Self { entries, orphans };
        debug!(
            "Assembled {} top-level entries, {} nodes total",
            forest.entries.len(),
            forest.len()
        );
        if !forest.orphans.is_empty() {
            warn!("{} entries have no reachable parent folder", forest.orphans.len());
        }
        forest
    }

    /// List the bot's files and assemble them
    pub async fn fetch<T: Transport + ?Sized>(transport: &T) -> Result<Self, BotError> {
        let records = remote::list_files(transport).await?;
        Ok(Self::from_records(records))
    }

    /// Top-level files and folders, in listing order
    pub fn entries(&self) -> &[Node] {
        &self.entries
    }

    /// Top-level folders
    pub fn roots(&self) -> impl Iterator<Item = &FolderNode> {
        self.entries
            .iter()
            .filter(|node| node.is_folder())
            .filter_map(Node::as_folder)
    }

    /// Entries that could not be attached anywhere
    pub fn orphans(&self) -> &[Node] {
        &self.orphans
    }

    pub fn is_complete(&self) -> bool {
        self.orphans.is_empty()
    }

    /// Pre-order walk over every placed node; top-level entries have depth 0
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.entries)
    }

    pub fn find(&self, uuid: &str) -> Option<&Node> {
        self.walk().map(|(_, node)| node).find(|node| node.uuid() == uuid)
    }

    /// Number of placed nodes, orphans excluded
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RawRecord> for Forest {
    fn from_iter<I: IntoIterator<Item = RawRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

/// Single-pass assembly with deferral
///
/// Every offered record is tried against the roots seen so far. Rejected
/// nodes are parked and retried whenever a new folder gets placed. Retries
/// can place a later sibling before an earlier one, so sibling order may
/// differ from listing order.
#[derive(Debug, Default)]
pub struct ForestBuilder {
    entries: Vec<Node>,
    pending: Vec<Node>,
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record; returns whether it was placed right away
    pub fn offer(&mut self, record: RawRecord) -> bool {
        let node = Node::from_record(record);
        let is_folder = node.is_folder();

        match self.place(node) {
            Ok(()) => {
                if is_folder && !self.pending.is_empty() {
                    self.retry_pending();
                }
                true
            }
            Err(node) => {
                debug!("Deferring {} until {} is known", node.uuid(), node.parent_uuid());
                self.pending.push(node);
                false
            }
        }
    }

    /// Nodes still waiting for their parent
    pub fn pending(&self) -> &[Node] {
        &self.pending
    }

    pub fn finish(self) -> Forest {
        if !self.pending.is_empty() {
            warn!("{} entries have no reachable parent folder", self.pending.len());
        }
        Forest {
            entries: self.entries,
            orphans: self.pending,
        }
    }

    fn place(&mut self, node: Node) -> Result<(), Node> {
        if node.parent_uuid().is_empty() {
            self.entries.push(node);
            return Ok(());
        }

        let mut node = node;
        for entry in &mut self.entries {
            if !entry.is_folder() {
                continue;
            }
            let Node::Folder(root) = entry else {
                continue;
            };
            match root.try_adopt(node) {
                Ok(()) => return Ok(()),
                Err(rejected) => node = rejected,
            }
        }
        Err(node)
    }

    fn retry_pending(&mut self) {
        loop {
            let mut placed_folder = false;
            for node in std::mem::take(&mut self.pending) {
                let is_folder = node.is_folder();
                match self.place(node) {
                    Ok(()) => placed_folder |= is_folder,
                    Err(node) => self.pending.push(node),
                }
            }
            if !placed_folder || self.pending.is_empty() {
                break;
            }
        }
    }
}

impl Extend<RawRecord> for ForestBuilder {
    fn extend<I: IntoIterator<Item = RawRecord>>(&mut self, iter: I) {
        for record in iter {
            self.offer(record);
        }
    }
}
