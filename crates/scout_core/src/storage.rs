use crate::model::{AnnotatedListing, Listing};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// Reads a listing pool from JSONL. Blank lines are ignored; a line that
/// does not parse is logged and skipped so one bad record cannot block
/// the rest of the pool.
pub fn load_listings_jsonl(path: &Path) -> Result<Vec<Listing>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut listings = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.context("read jsonl line")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Listing>(&line) {
            Ok(listing) => listings.push(listing),
            Err(err) => warn!(line = lineno + 1, %err, "skipping malformed listing"),
        }
    }

    Ok(listings)
}

pub fn save_annotated_jsonl(path: &Path, records: &[AnnotatedListing]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        let line = serde_json::to_string(record).context("serialize annotated listing")?;
        writer
            .write_all(line.as_bytes())
            .context("write record line")?;
        writer.write_all(b"\n").context("write newline")?;
    }

    writer.flush().context("flush output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_annotated_listings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("accepted.jsonl");

        let listing: Listing = serde_json::from_str(
            r#"{"id":"L1","title":"t","topic":"AI","description":"d","eligibility":"Open to all."}"#,
        )
        .expect("parse");
        let records = vec![AnnotatedListing {
            listing,
            similarity_score: 0.9939,
            eligibility_ok: Some(true),
        }];

        save_annotated_jsonl(&path, &records).expect("save");
        let loaded = load_listings_jsonl(&path).expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "L1");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pool.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"id":"L1","title":"ok","topic":"x","description":"y","eligibility":"Open to all."}"#,
                "\n",
                "this is not json\n",
                "\n",
                r#"{"id":"L2","title":"also ok","topic":"x","description":"y","eligibility":""}"#,
                "\n",
            ),
        )
        .expect("write");

        let listings = load_listings_jsonl(&path).expect("load");
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["L1", "L2"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_listings_jsonl(&dir.path().join("absent.jsonl")).is_err());
    }
}
