//! Best-tip trie over block hash chains

use super::{Block, NodeId, Walk};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use tracing::debug;

const ROOT: NodeId = NodeId(0);

/// A shared-prefix tree of the hash chains reported by many peers
///
/// Blocks live in an arena and are addressed by [`NodeId`]. Every hash that
/// has ever been inserted resolves through `index` to exactly one block, no
/// matter which chain or link introduced it. A block reached from two
/// different parents is therefore shared rather than duplicated.
#[derive(Clone, Debug)]
pub struct BestTipTrie {
    nodes: Vec<Block>,
    index: HashMap<String, NodeId>,
}

impl BestTipTrie {
    /// Create an empty trie holding only the synthetic root
    pub fn new() -> Self {
        BestTipTrie {
            nodes: vec![Block::root()],
            index: HashMap::new(),
        }
    }

    /// The synthetic root block
    pub fn root(&self) -> &Block {
        &self.nodes[ROOT.0]
    }

    pub fn root_id(&self) -> NodeId {
        ROOT
    }

    /// Get a block by id
    ///
    /// Ids are only handed out by this trie, so every id it returned is valid.
    pub fn block(&self, id: NodeId) -> &Block {
        &self.nodes[id.0]
    }

    /// Number of distinct hashes known to the trie
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.index.contains_key(hash)
    }

    /// Find the block for a hash anywhere in the trie
    pub fn lookup(&self, hash: &str) -> Option<&Block> {
        self.index.get(hash).map(|id| self.block(*id))
    }

    pub fn id_of(&self, hash: &str) -> Option<NodeId> {
        self.index.get(hash).copied()
    }

    /// Insert a best chain (oldest first) reported by `label`
    ///
    /// Each segment reuses the existing child, or the already-indexed block
    /// for that hash, before a new block is created. When the tip is already
    /// known the walk ends on that existing block, so a chain whose prefix is
    /// new but whose tip has been seen does not grow a second copy of the tip.
    /// The label is appended to the tip block's labels.
    pub fn insert<S: AsRef<str>>(&mut self, chain: &[S], label: impl Into<String>) {
        if let Some(tip) = self.walk_chain(chain) {
            self.nodes[tip.0].labels.push(label.into());
        }
    }

    /// Record a single parent -> child edge seen in a relay event
    ///
    /// Events arrive out of order, so the child may already be known before
    /// its parent shows up. In that case the child is expected to sit
    /// directly under the root and is moved under a freshly created parent.
    pub fn insert_link(&mut self, parent: &str, child: &str, value: Option<String>) {
        if let Some(parent_id) = self.id_of(parent) {
            let child_id = self.resolve_child(parent_id, child);
            self.push_value(child_id, value);
        } else if let Some(child_id) = self.id_of(child) {
            let parent_id = self.create(ROOT, parent);
            self.reparent(child_id, parent_id);
            self.push_value(child_id, value);
        } else {
            let tip = self.walk_chain(&[parent, child]);
            if let (Some(tip), Some(value)) = (tip, value) {
                self.nodes[tip.0].labels.push(value);
            }
        }
    }

    /// Move `node` from directly under the root to under `new_parent`
    ///
    /// Only the root edge is removed. A node sitting deeper in the trie keeps
    /// its existing parents and gains `new_parent` as an additional one.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        if node == ROOT || node == new_parent {
            debug!(?node, ?new_parent, "ignoring degenerate reparent");
            return;
        }

        let root = &mut self.nodes[ROOT.0];
        match root.children.iter().position(|id| *id == node) {
            Some(pos) => {
                root.children.remove(pos);
            }
            None => debug!(?node, "reparented block was not directly under root"),
        }

        self.attach(new_parent, node);
        debug!(
            block = self.block(node).hash().unwrap_or_default(),
            parent = self.block(new_parent).hash().unwrap_or_default(),
            "reparented block"
        );
    }

    /// Get the `value` annotations of the block at an exact path from the root
    pub fn get<S: AsRef<str>>(&self, chain: &[S]) -> Result<&[String]> {
        Ok(self.node(chain)?.value())
    }

    /// Follow an exact path from the root through child edges
    ///
    /// Unlike [`insert`](Self::insert) this never consults the index: every
    /// segment must be a child of the block before it.
    pub fn node<S: AsRef<str>>(&self, chain: &[S]) -> Result<&Block> {
        let mut current = ROOT;
        for (depth, segment) in chain.iter().enumerate() {
            let segment = segment.as_ref();
            current = self.child_by_hash(current, segment).ok_or_else(|| {
                Error::NotFound(format!("{} at depth {}", segment, depth))
            })?;
        }
        Ok(self.block(current))
    }

    /// The longest path from the root along which every block has exactly
    /// one child, i.e. the chain all reporters agree on
    pub fn prefix(&self) -> Vec<String> {
        let mut path = Vec::new();
        let mut seen = HashSet::from([ROOT]);
        let mut current = ROOT;

        while let [only] = self.block(current).children.as_slice() {
            let only = *only;
            if !seen.insert(only) {
                break;
            }
            if let Some(hash) = self.block(only).hash() {
                path.push(hash.to_string());
            }
            current = only;
        }

        path
    }

    /// Every block (root included) carrying relay annotations, pre-order
    pub fn items(&self) -> Walk<'_> {
        Walk::new(self, |block| !block.value.is_empty())
    }

    /// Every block (root included) with more than one child, pre-order
    pub fn forks(&self) -> Walk<'_> {
        Walk::new(self, |block| block.children.len() > 1)
    }

    /// Every block that some reporter named as its best tip, pre-order
    pub fn tips(&self) -> Walk<'_> {
        Walk::new(self, |block| !block.labels.is_empty())
    }

    /// Every block reachable from the root, pre-order
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self, |_| true)
    }

    /// Attach a metadata entry to a known block
    pub fn set_metadata(
        &mut self,
        hash: &str,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<()> {
        let id = self
            .id_of(hash)
            .ok_or_else(|| Error::NotFound(hash.to_string()))?;
        self.nodes[id.0].metadata.insert(key.into(), value);
        Ok(())
    }

    // === Internal helpers ===

    /// Walk a chain from the root, creating what is missing, and return the
    /// block reached by its last hash
    fn walk_chain<S: AsRef<str>>(&mut self, chain: &[S]) -> Option<NodeId> {
        if chain.is_empty() {
            debug!("ignoring empty chain");
            return None;
        }
        let mut current = ROOT;
        for segment in chain {
            current = self.resolve_child(current, segment.as_ref());
        }
        Some(current)
    }

    /// Find or make the child of `parent` keyed by `hash`
    fn resolve_child(&mut self, parent: NodeId, hash: &str) -> NodeId {
        if let Some(child) = self.child_by_hash(parent, hash) {
            return child;
        }
        match self.id_of(hash) {
            Some(existing) => {
                debug!(block = hash, "linking known block under a new parent");
                self.attach(parent, existing);
                existing
            }
            None => self.create(parent, hash),
        }
    }

    fn child_by_hash(&self, parent: NodeId, hash: &str) -> Option<NodeId> {
        self.block(parent)
            .children
            .iter()
            .copied()
            .find(|id| self.block(*id).hash() == Some(hash))
    }

    /// Create and index a new block under `parent`
    fn create(&mut self, parent: NodeId, hash: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Block::with_hash(hash));
        self.index.insert(hash.to_string(), id);
        self.attach(parent, id);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        if !children.contains(&child) {
            children.push(child);
        }
    }

    fn push_value(&mut self, id: NodeId, value: Option<String>) {
        if let Some(value) = value {
            self.nodes[id.0].value.push(value);
        }
    }
}

impl Default for BestTipTrie {
    fn default() -> Self {
        BestTipTrie::new()
    }
}
