//! Lazy pre-order traversal of the trie

use super::{BestTipTrie, Block, NodeId};

/// Depth-first, pre-order iterator over `(path, block)` pairs
///
/// The path is the list of hashes from the root down to the block (empty for
/// the root itself). Each call to a trie query builds a fresh `Walk`, so
/// walks never share state. Because a known hash may be linked under more
/// than one parent, a block can appear once per distinct path; a child that
/// is already on the current path is skipped so loops terminate.
pub struct Walk<'a> {
    trie: &'a BestTipTrie,
    /// Pending blocks with the depth they sit at
    stack: Vec<(NodeId, usize)>,
    /// Blocks from the root to the one most recently visited
    path: Vec<NodeId>,
    filter: fn(&Block) -> bool,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(trie: &'a BestTipTrie, filter: fn(&Block) -> bool) -> Self {
        Walk {
            trie,
            stack: vec![(trie.root_id(), 0)],
            path: Vec::new(),
            filter,
        }
    }

    fn hashes(&self) -> Vec<String> {
        self.path
            .iter()
            .filter_map(|id| self.trie.block(*id).hash())
            .map(str::to_string)
            .collect()
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (Vec<String>, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            self.path.truncate(depth);
            self.path.push(id);

            let block = self.trie.block(id);
            for child in block.children().iter().rev() {
                if !self.path.contains(child) {
                    self.stack.push((*child, depth + 1));
                }
            }

            if (self.filter)(block) {
                return Some((self.hashes(), block));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_is_preorder() {
        let mut trie = BestTipTrie::new();
        trie.insert(&["a", "b", "c"], "peer1");
        trie.insert(&["a", "d"], "peer2");

        let paths: Vec<Vec<String>> = trie.walk().map(|(path, _)| path).collect();
        let expected: Vec<Vec<String>> = vec![
            vec![],
            vec!["a".into()],
            vec!["a".into(), "b".into()],
            vec!["a".into(), "b".into(), "c".into()],
            vec!["a".into(), "d".into()],
        ];
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_shared_block_visited_per_path() {
        let mut trie = BestTipTrie::new();
        trie.insert(&["a", "b"], "peer1");
        trie.insert(&["z", "b"], "peer2");

        let tips: Vec<Vec<String>> = trie.tips().map(|(path, _)| path).collect();
        assert_eq!(
            tips,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["z".to_string(), "b".to_string()],
            ]
        );
    }
}
