//! # tiptrie
//!
//! A best-tip trie for comparing the block chains reported by testnet peers.
//!
//! Every peer reports the chain it currently considers canonical. Inserting
//! those chains into one [`BestTipTrie`] shows where all peers agree, where
//! they fork, and which peers sit on which tip. Relay events, which arrive out
//! of order, can be fed in one parent -> child link at a time.
//!
//! ## Core Concepts
//!
//! - **Chain**: block hashes from an ancestor toward a tip, oldest first
//! - **Label**: the peer that reported a chain ending at a block
//! - **Fork**: a block with more than one child
//! - **Prefix**: the longest fork-free path from the root
//!
//! ## Example
//!
//! ```
//! use tiptrie::BestTipTrie;
//!
//! let mut trie = BestTipTrie::new();
//! trie.insert(&["a", "b", "c"], "peer-1");
//! trie.insert(&["a", "b", "d"], "peer-2");
//!
//! assert_eq!(trie.prefix(), vec!["a", "b"]);
//! assert_eq!(trie.forks().count(), 1);
//! ```

pub mod config;
pub mod ingest;
pub mod report;
pub mod trie;
pub mod viz;

mod error;

pub use config::ReportConfig;
pub use error::{Error, Result};
pub use ingest::{ChainRecord, IngestSummary, Link, LinkBatch};
pub use report::{ForkEntry, PathEntry, Report};
pub use trie::{BestTipTrie, Block, NodeId, SharedTrie, Walk};
pub use viz::render_dot;
