//! Turning captured peer output into trie inserts
//!
//! Two sources feed the trie:
//! - best-chain snapshots, one per peer, inserted as whole chains
//! - relay log lines, inserted one parent -> child link at a time

mod logs;
mod snapshot;

pub use logs::{parse_log_line, read_links, Link, LinkBatch};
pub use snapshot::{load_snapshot, parse_best_chain, read_chain_records, trim_label, ChainRecord};

use crate::config::ReportConfig;
use crate::trie::{BestTipTrie, SharedTrie};
use std::path::PathBuf;
use std::thread;
use tracing::{info, warn};

/// Upper bound on snapshot files loaded at once
pub const MAX_WORKERS: usize = 12;

/// Outcome of loading a set of snapshot files
#[derive(Debug, Default)]
pub struct IngestSummary {
    /// Chains inserted into the trie
    pub inserted: usize,
    /// Files that could not be used, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

/// Load snapshot files on worker threads and insert every chain found
///
/// Files are independent, so they are read and parsed in parallel; the
/// inserts themselves go through the shared trie's lock one at a time.
/// A file that fails to load is logged and skipped, not fatal.
pub fn ingest_snapshots(
    paths: &[PathBuf],
    config: &ReportConfig,
    trie: &SharedTrie,
) -> IngestSummary {
    if paths.is_empty() {
        return IngestSummary::default();
    }
    let chunk_size = paths.len().div_ceil(MAX_WORKERS);

    let results: Vec<(usize, Vec<(PathBuf, String)>)> = thread::scope(|scope| {
        let handles: Vec<_> = paths
            .chunks(chunk_size)
            .map(|chunk| scope.spawn(move || ingest_chunk(chunk, config, trie)))
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(result) => result,
                Err(_) => (0, vec![(PathBuf::new(), "worker panicked".to_string())]),
            })
            .collect()
    });

    let mut summary = IngestSummary::default();
    for (inserted, skipped) in results {
        summary.inserted += inserted;
        summary.skipped.extend(skipped);
    }
    summary
}

fn ingest_chunk(
    chunk: &[PathBuf],
    config: &ReportConfig,
    trie: &SharedTrie,
) -> (usize, Vec<(PathBuf, String)>) {
    let mut inserted = 0;
    let mut skipped = Vec::new();

    for path in chunk {
        info!("Processing {}", path.display());
        match load_snapshot(path, config) {
            Ok(record) => {
                trie.insert(&record.chain, record.label);
                inserted += 1;
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                skipped.push((path.clone(), e.to_string()));
            }
        }
    }

    (inserted, skipped)
}

/// Insert every record of a chain-records file
pub fn ingest_records(records: Vec<ChainRecord>, trie: &mut BestTipTrie) -> usize {
    let count = records.len();
    for record in records {
        trie.insert(&record.chain, record.label);
    }
    count
}

/// Insert every link of a batch, annotated with its reporter
pub fn ingest_links(batch: LinkBatch, trie: &mut BestTipTrie) -> usize {
    let count = batch.links.len();
    for link in batch.links {
        trie.insert_link(&link.parent, &link.child, link.reporter);
    }
    info!("{} Blocks during the inspected timespan", count);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_ingest_snapshots_skips_bad_files() {
        let dir = tempdir().unwrap();
        let mut paths = Vec::new();
        for (name, body) in [
            ("peer-a", r#"["g","b1","b2"]"#),
            ("peer-b", r#"{"data":{"bestChain":[{"stateHash":"g"},{"stateHash":"b1"},{"stateHash":"c2"}]}}"#),
            ("peer-c", r#"{"data":{"bestChain":null}}"#),
            ("peer-d", "garbage"),
        ] {
            let path = dir.path().join(format!("{}.json", name));
            std::fs::write(&path, body).unwrap();
            paths.push(path);
        }

        let shared = SharedTrie::new();
        let summary = ingest_snapshots(&paths, &ReportConfig::default(), &shared);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.skipped.len(), 2);

        let trie = shared.into_inner();
        assert_eq!(trie.prefix(), vec!["g".to_string(), "b1".to_string()]);
        assert_eq!(trie.forks().count(), 1);
    }

    #[test]
    fn test_ingest_snapshots_empty() {
        let shared = SharedTrie::new();
        let summary = ingest_snapshots(&[], &ReportConfig::default(), &shared);
        assert_eq!(summary.inserted, 0);
        assert!(shared.with(|t| t.is_empty()));
    }

    #[test]
    fn test_ingest_links_out_of_order() {
        let lines = [
            r#"["t",{"k8s-pod/app":"pod-2"},{"metadata":{"state_hash":"b2","external_transition":{"data":{"protocol_state":{"previous_state_hash":"b1"}}}}}]"#,
            r#"["t",{"k8s-pod/app":"pod-1"},{"metadata":{"state_hash":"b1","external_transition":{"data":{"protocol_state":{"previous_state_hash":"b0"}}}}}]"#,
        ]
        .join("\n");
        let batch = read_links(Cursor::new(lines), 1000).unwrap();

        let mut trie = BestTipTrie::new();
        assert_eq!(ingest_links(batch, &mut trie), 2);
        assert!(trie.node(&["b0", "b1", "b2"]).is_ok());
        assert_eq!(trie.get(&["b0", "b1"]).unwrap(), &["pod-1".to_string()][..]);
    }
}
