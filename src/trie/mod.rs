//! Best-tip trie for comparing reported block chains
//!
//! Peers each report the chain they consider canonical. Feeding those chains
//! into one trie shows:
//! - the prefix every peer agrees on
//! - the points where chains fork
//! - which peers ended up on which tip

mod node;
mod shared;
mod tree;
mod walk;

pub use node::{shorten, Block, NodeId};
pub use shared::SharedTrie;
pub use tree::BestTipTrie;
pub use walk::Walk;
