//! Block relay events from cached log lines
//!
//! Each line is one JSON array as written by the log exporter. The second
//! element holds the resource labels and the last one the JSON payload:
//!
//! ```text
//! [timestamp, {"k8s-pod/app": "..."}, ..., {"message": "...", "metadata": {...}}]
//! ```

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::io::BufRead;
use tracing::{debug, info};

const PREVIOUS_STATE_HASH: &str = "/external_transition/data/protocol_state/previous_state_hash";
const REPORTER_LABEL: &str = "k8s-pod/app";

/// A parent -> child edge seen by one reporter
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    pub parent: String,
    pub child: String,
    pub reporter: Option<String>,
}

/// Links read from a log file plus what was passed over
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkBatch {
    pub links: Vec<Link>,
    /// Entries read, including skipped ones
    pub entries: usize,
    /// Entries without labels or without both hashes (older log formats)
    pub skipped: usize,
}

/// Extract a link from one log entry
///
/// Returns `Ok(None)` for entries without resource labels and for entries
/// that lack a state hash or parent hash.
pub fn parse_log_line(line: &str) -> serde_json::Result<Option<Link>> {
    let entry: Value = serde_json::from_str(line)?;
    let Some(fields) = entry.as_array() else {
        return Ok(None);
    };
    let Some(labels) = fields.get(1).filter(|labels| !labels.is_null()) else {
        return Ok(None);
    };
    let Some(metadata) = fields.last().and_then(|payload| payload.get("metadata")) else {
        return Ok(None);
    };

    let child = metadata.get("state_hash").and_then(Value::as_str);
    let parent = metadata.pointer(PREVIOUS_STATE_HASH).and_then(Value::as_str);
    let (Some(parent), Some(child)) = (parent, child) else {
        return Ok(None);
    };

    let reporter = labels
        .get(REPORTER_LABEL)
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Some(Link {
        parent: parent.to_string(),
        child: child.to_string(),
        reporter,
    }))
}

/// Read up to `max_entries` log entries, skipping blank lines
pub fn read_links<R: BufRead>(reader: R, max_entries: usize) -> Result<LinkBatch> {
    let mut batch = LinkBatch::default();

    for (i, line) in reader.lines().enumerate() {
        if batch.entries >= max_entries {
            debug!(max_entries, "entry limit reached");
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        batch.entries += 1;
        let parsed = parse_log_line(&line).map_err(|e| Error::Parse {
            line: i + 1,
            message: e.to_string(),
        })?;
        match parsed {
            Some(link) => batch.links.push(link),
            None => batch.skipped += 1,
        }

        if batch.entries % 100 == 0 {
            info!("Processing {}", batch.entries);
        }
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn entry(parent: &str, child: &str, pod: &str) -> String {
        serde_json::json!([
            "2020-06-01T00:00:00Z",
            { "k8s-pod/app": pod },
            {
                "message": "Rebroadcasting $state_hash",
                "metadata": {
                    "state_hash": child,
                    "external_transition": {
                        "data": { "protocol_state": { "previous_state_hash": parent } }
                    }
                }
            }
        ])
        .to_string()
    }

    #[test]
    fn test_parse_rebroadcast_entry() {
        let link = parse_log_line(&entry("3NKp", "3NKc", "whale-1")).unwrap().unwrap();
        assert_eq!(
            link,
            Link {
                parent: "3NKp".into(),
                child: "3NKc".into(),
                reporter: Some("whale-1".into()),
            }
        );
    }

    #[test]
    fn test_entry_without_labels_is_skipped() {
        let line = r#"["t", null, {"metadata": {"state_hash": "c",
            "external_transition": {"data": {"protocol_state": {"previous_state_hash": "p"}}}}}]"#;
        assert_eq!(parse_log_line(line).unwrap(), None);

        let batch = read_links(Cursor::new(line.replace('\n', " ")), 1000).unwrap();
        assert!(batch.links.is_empty());
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn test_labels_without_pod_name_keep_link() {
        let line = r#"["t", {"zone": "us-west1"}, {"metadata": {"state_hash": "c",
            "external_transition": {"data": {"protocol_state": {"previous_state_hash": "p"}}}}}]"#;
        let link = parse_log_line(line).unwrap().unwrap();
        assert_eq!(link.reporter, None);
        assert_eq!(link.parent, "p");
    }

    #[test]
    fn test_old_format_is_skipped() {
        let line = r#"["t", {"k8s-pod/app": "x"}, {"metadata": {"peer_id": "abc"}}]"#;
        assert_eq!(parse_log_line(line).unwrap(), None);
        assert_eq!(parse_log_line(r#"{"not": "an array"}"#).unwrap(), None);
    }

    #[test]
    fn test_read_links_respects_limit() {
        let mut input = String::new();
        for i in 0..5 {
            input.push_str(&entry(&format!("b{}", i), &format!("b{}", i + 1), "pod"));
            input.push('\n');
        }
        input.push_str("[\"t\", null, {\"metadata\": {}}]\n");

        let batch = read_links(Cursor::new(input.clone()), 3).unwrap();
        assert_eq!(batch.entries, 3);
        assert_eq!(batch.links.len(), 3);

        let batch = read_links(Cursor::new(input), 1000).unwrap();
        assert_eq!(batch.entries, 6);
        assert_eq!(batch.links.len(), 5);
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn test_read_links_reports_bad_line() {
        let input = format!("{}\n{{broken\n", entry("a", "b", "pod"));
        match read_links(Cursor::new(input), 1000) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
