//! Best-chain snapshots captured from peers

use crate::config::ReportConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

/// One reporter's best chain, oldest block first
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRecord {
    pub label: String,
    pub chain: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    /// `{"data": {"bestChain": [{"stateHash": ...}, ...]}}`
    Graphql { data: BestChainData },
    /// `["hash", ...]`
    Bare(Vec<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BestChainData {
    best_chain: Option<Vec<StateHashEntry>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateHashEntry {
    state_hash: String,
}

/// Parse a captured `bestChain` response (or a bare array of hashes)
///
/// A peer without a best tip answers `"bestChain": null`, reported as
/// [`Error::NoBestTip`] naming `source`.
pub fn parse_best_chain(json: &str, source: &str) -> Result<Vec<String>> {
    match serde_json::from_str::<Snapshot>(json)? {
        Snapshot::Bare(chain) => Ok(chain),
        Snapshot::Graphql { data } => data
            .best_chain
            .map(|entries| entries.into_iter().map(|e| e.state_hash).collect())
            .ok_or_else(|| Error::NoBestTip(source.to_string())),
    }
}

/// Load one snapshot file, labelled by its file stem
pub fn load_snapshot(path: &Path, config: &ReportConfig) -> Result<ChainRecord> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let content = std::fs::read_to_string(path)?;
    let chain = parse_best_chain(&content, &name)?;

    Ok(ChainRecord {
        label: trim_label(&name, config.label_suffix_trim),
        chain,
    })
}

/// Drop `trim` trailing characters from a reporter name
///
/// Names too short to trim are kept whole rather than emptied.
pub fn trim_label(name: &str, trim: usize) -> String {
    let len = name.chars().count();
    if trim == 0 || trim >= len {
        return name.to_string();
    }
    name.chars().take(len - trim).collect()
}

/// Read JSON-lines chain records, skipping blank lines
pub fn read_chain_records<R: BufRead>(reader: R) -> Result<Vec<ChainRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| Error::Parse {
            line: i + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}
