//! Summaries of a filled trie

use crate::config::ReportConfig;
use crate::trie::{shorten, BestTipTrie, Block, NodeId, Walk};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A point where reported chains diverge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkEntry {
    pub path: Vec<String>,
    /// Hashes of the competing children
    pub children: Vec<String>,
}

/// A block together with the reporters attached to it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub path: Vec<String>,
    pub reporters: Vec<String>,
}

/// Everything a comparison run reports about the trie
///
/// `prefix` keeps full hashes; paths elsewhere are shortened to
/// `short_hash_len` characters for display. A block linked under several
/// parents is listed once, under the first path that reaches it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub prefix: Vec<String>,
    pub prefix_len: usize,
    pub node_count: usize,
    pub forks: Vec<ForkEntry>,
    /// Blocks annotated by relay links
    pub items: Vec<PathEntry>,
    /// Best tips and the peers that reported them
    pub tips: Vec<PathEntry>,
}

impl Report {
    pub fn from_trie(trie: &BestTipTrie, config: &ReportConfig) -> Self {
        let len = config.short_hash_len;
        let short_path = |path: Vec<String>| -> Vec<String> {
            path.iter().map(|h| shorten(h, len)).collect()
        };

        let forks = first_paths(trie, trie.forks())
            .map(|(path, block)| ForkEntry {
                path: short_path(path),
                children: child_hashes(trie, block, len),
            })
            .collect();

        let items = first_paths(trie, trie.items())
            .map(|(path, block)| PathEntry {
                path: short_path(path),
                reporters: block.value().to_vec(),
            })
            .collect();

        let tips = first_paths(trie, trie.tips())
            .map(|(path, block)| PathEntry {
                path: short_path(path),
                reporters: block.labels().to_vec(),
            })
            .collect();

        let prefix = trie.prefix();
        Report {
            prefix_len: prefix.len(),
            prefix,
            node_count: trie.len(),
            forks,
            items,
            tips,
        }
    }

    /// Whether every reporter agrees on a single chain
    pub fn is_unanimous(&self) -> bool {
        self.forks.is_empty()
    }
}

/// Keep only the first path a walk yields for each block
fn first_paths<'a>(
    trie: &'a BestTipTrie,
    walk: Walk<'a>,
) -> impl Iterator<Item = (Vec<String>, &'a Block)> + 'a {
    let mut seen: HashSet<Option<NodeId>> = HashSet::new();
    walk.filter(move |(_, block)| seen.insert(block.hash().and_then(|h| trie.id_of(h))))
}

fn child_hashes(trie: &BestTipTrie, block: &Block, len: usize) -> Vec<String> {
    block
        .children()
        .iter()
        .map(|id| trie.block(*id).short_hash(len))
        .collect()
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "blocks: {}", self.node_count)?;
        match self.prefix.last() {
            Some(tip) => writeln!(f, "common prefix: {} blocks, ending at {}", self.prefix_len, tip)?,
            None => writeln!(f, "common prefix: none")?,
        }

        writeln!(f, "forks: {}", self.forks.len())?;
        for fork in &self.forks {
            writeln!(f, "  {} -> {}", display_path(&fork.path), fork.children.join(", "))?;
        }

        if !self.tips.is_empty() {
            writeln!(f, "tips:")?;
            for tip in &self.tips {
                writeln!(f, "  {}: {}", display_path(&tip.path), tip.reporters.join(", "))?;
            }
        }

        if !self.items.is_empty() {
            writeln!(f, "relayed:")?;
            for item in &self.items {
                writeln!(f, "  {}: {}", display_path(&item.path), item.reporters.len())?;
            }
        }
        Ok(())
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "root".to_string()
    } else {
        path.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BestTipTrie {
        let mut trie = BestTipTrie::new();
        trie.insert(&["3NKgenesis01", "3NKblock0001", "3NKblock0002"], "peer1");
        trie.insert(&["3NKgenesis01", "3NKblock0001", "3NKother0002"], "peer2");
        trie.insert_link("3NKblock0002", "3NKblock0003", Some("pod-1".into()));
        trie
    }

    #[test]
    fn test_report_from_trie() {
        let config = ReportConfig {
            short_hash_len: 4,
            ..ReportConfig::default()
        };
        let report = Report::from_trie(&sample(), &config);

        assert_eq!(report.prefix, vec!["3NKgenesis01", "3NKblock0001"]);
        assert_eq!(report.prefix_len, 2);
        assert_eq!(report.node_count, 5);
        assert_eq!(
            report.forks,
            vec![ForkEntry {
                path: vec!["is01".into(), "0001".into()],
                children: vec!["0002".into(), "0002".into()],
            }]
        );
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].reporters, vec!["pod-1"]);
        assert_eq!(report.tips.len(), 2);
        assert!(!report.is_unanimous());
    }

    #[test]
    fn test_shared_tip_listed_once() {
        let mut trie = BestTipTrie::new();
        trie.insert(&["a", "b"], "peer1");
        trie.insert(&["z", "b"], "peer2");
        trie.insert_link("a", "b", Some("pod".into()));

        let report = Report::from_trie(&trie, &ReportConfig::default());
        assert_eq!(
            report.tips,
            vec![PathEntry {
                path: vec!["a".into(), "b".into()],
                reporters: vec!["peer1".into(), "peer2".into()],
            }]
        );
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.forks.len(), 1);
        assert!(report.forks[0].path.is_empty());
    }

    #[test]
    fn test_empty_report() {
        let report = Report::from_trie(&BestTipTrie::new(), &ReportConfig::default());
        assert!(report.prefix.is_empty());
        assert!(report.is_unanimous());
        assert!(report.to_string().contains("common prefix: none"));
    }

    #[test]
    fn test_report_text() {
        let text = Report::from_trie(&sample(), &ReportConfig::default()).to_string();
        assert!(text.contains("blocks: 5"));
        assert!(text.contains("forks: 1"));
        assert!(text.contains("ending at 3NKblock0001"));
        assert!(text.contains("peer1"));
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report::from_trie(&sample(), &ReportConfig::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["prefix_len"], 2);
        assert!(json["forks"].is_array());
    }
}
