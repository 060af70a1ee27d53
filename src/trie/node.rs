//! Trie node types

use std::collections::BTreeMap;
use std::fmt;

/// Index of a block within the trie arena
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A block observed by at least one reporter
///
/// The root block is synthetic and carries no hash. Every other block is
/// reached through an edge keyed by its own hash.
#[derive(Clone, Debug, Default)]
pub struct Block {
    /// The state hash naming this block (`None` for the root)
    pub(crate) hash: Option<String>,
    /// Reporters whose best chain ended exactly here
    pub(crate) labels: Vec<String>,
    /// Annotations attached through relay links
    pub(crate) value: Vec<String>,
    /// Free-form metadata, untouched by the trie itself
    pub(crate) metadata: BTreeMap<String, serde_json::Value>,
    /// Child edges in insertion order
    pub(crate) children: Vec<NodeId>,
}

impl Block {
    /// Create the synthetic root
    pub(crate) fn root() -> Self {
        Block::default()
    }

    /// Create a block for the given hash
    pub(crate) fn with_hash(hash: impl Into<String>) -> Self {
        Block {
            hash: Some(hash.into()),
            ..Block::default()
        }
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn value(&self) -> &[String] {
        &self.value
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Ids of the child blocks, in the order they were attached
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// True for the synthetic root
    pub fn is_root(&self) -> bool {
        self.hash.is_none()
    }

    /// Short display form: the last `len` characters of the hash
    pub fn short_hash(&self, len: usize) -> String {
        match &self.hash {
            Some(hash) => shorten(hash, len),
            None => "root".to_string(),
        }
    }
}

/// Keep the last `len` characters of a hash, like `hash[-8:]`
pub fn shorten(hash: &str, len: usize) -> String {
    let count = hash.chars().count();
    hash.chars().skip(count.saturating_sub(len)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_no_hash() {
        let root = Block::root();
        assert!(root.is_root());
        assert_eq!(root.hash(), None);
        assert_eq!(root.short_hash(8), "root");
    }

    #[test]
    fn test_shorten_keeps_tail() {
        assert_eq!(shorten("3NKxyz0123456789", 8), "23456789");
        assert_eq!(shorten("abc", 8), "abc");
        assert_eq!(shorten("", 8), "");
    }

    #[test]
    fn test_block_short_hash() {
        let block = Block::with_hash("3NLabcdefghijk");
        assert_eq!(block.short_hash(4), "hijk");
        assert!(!block.is_root());
    }
}
