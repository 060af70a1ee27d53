//! Graphviz rendering of the trie
//!
//! Produces a `strict digraph` in DOT syntax. Blocks are shaded from white to
//! blue by how many relay annotations they carry, and every reporter that
//! named a block as its best tip is drawn as a blue node pointing at it.

use crate::config::ReportConfig;
use crate::trie::{BestTipTrie, Block};
use std::collections::HashSet;
use std::fmt::Write;

const ROOT_ID: &str = "root";

/// Render the whole trie as a DOT graph
pub fn render_dot(trie: &BestTipTrie, config: &ReportConfig) -> String {
    let mut out = String::new();
    let mut nodes: HashSet<String> = HashSet::new();
    let mut edges: HashSet<(String, String)> = HashSet::new();

    out.push_str("strict digraph {\n");
    out.push_str("  edge [dir=back]\n");
    let _ = writeln!(out, "  \"{}\" [label=\"root\" color=black]", ROOT_ID);
    nodes.insert(ROOT_ID.to_string());

    for (_, block) in trie.walk() {
        let id = node_id(block);

        if nodes.insert(id.clone()) {
            let _ = writeln!(
                out,
                "  \"{}\" [label=\"{}\" color=\"{}\" shape=ellipse style=filled]",
                escape(&id),
                escape(&block.short_hash(config.short_hash_len)),
                shade(block.value().len(), config.color_steps),
            );
            for label in block.labels() {
                let label_id = format!("label:{}", label);
                if nodes.insert(label_id.clone()) {
                    let _ = writeln!(
                        out,
                        "  \"{}\" [label=\"{}\" color=blue]",
                        escape(&label_id),
                        escape(label)
                    );
                }
                if edges.insert((label_id.clone(), id.clone())) {
                    let _ = writeln!(
                        out,
                        "  \"{}\" -> \"{}\" [color=blue]",
                        escape(&label_id),
                        escape(&id)
                    );
                }
            }
        }

        for child in block.children() {
            let child_id = node_id(trie.block(*child));
            if edges.insert((id.clone(), child_id.clone())) {
                let _ = writeln!(out, "  \"{}\" -> \"{}\"", escape(&id), escape(&child_id));
            }
        }
    }

    out.push_str("}\n");
    out
}

/// Fill colour for a block with `count` annotations
///
/// `steps` shades run from white to pure blue; counts past the last shade
/// stay on it.
pub fn shade(count: usize, steps: usize) -> String {
    let last = steps.saturating_sub(1);
    if last == 0 {
        return "#0000ff".to_string();
    }
    let step = count.min(last);
    let level = 255 - (255 * step / last);
    format!("#{:02x}{:02x}ff", level, level)
}

/// DOT id of a block; hashes are opaque, so they get their own namespace
fn node_id(block: &Block) -> String {
    match block.hash() {
        Some(hash) => format!("block:{}", hash),
        None => ROOT_ID.to_string(),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
