use crate::error::Result;
use crate::types::UnifiedEvent;
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const HEADER: [&str; 8] = [
    "source",
    "title",
    "description",
    "start_date",
    "end_date",
    "location",
    "register_link",
    "category",
];

/// Writes one timestamped CSV file per run.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
    prefix: String,
}

impl SnapshotWriter {
    pub fn new<P: AsRef<Path>>(dir: P, prefix: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
        }
    }

    pub fn file_name(&self, at: DateTime<Local>) -> String {
        format!("{}_{}.csv", self.prefix, at.format("%Y-%m-%d_%H-%M-%S"))
    }

    /// Write `events` and return the file path. The header row is always written.
    pub fn write(&self, events: &[UnifiedEvent], at: DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(self.file_name(at));

        let mut file = BufWriter::new(File::create(&path)?);
        // BOM so spreadsheet tools pick UTF-8 for non-ASCII titles
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(HEADER)?;
        for event in events {
            writer.serialize(event)?;
        }
        writer.flush()?;

        info!("Saved {} records to {}", events.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 10, 30, 9, 5, 0).unwrap()
    }

    #[test]
    fn file_name_embeds_timestamp() {
        let writer = SnapshotWriter::new("out", "all_partner_events");
        assert_eq!(writer.file_name(at()), "all_partner_events_2025-10-30_09-05-00.csv");
    }

    #[test]
    fn runs_in_the_same_minute_keep_separate_files() {
        let dir = tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), "events");
        let first = writer.write(&[], at()).unwrap();
        let second = writer
            .write(&[], Local.with_ymd_and_hms(2025, 10, 30, 9, 5, 41).unwrap())
            .unwrap();
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn writes_bom_header_and_rows() {
        let dir = tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("output"), "events");
        let events = vec![UnifiedEvent {
            source: Source::UiPath,
            title: Some("Automatisierung, für alle".to_string()),
            description: Some(String::new()),
            start_date: Some("2025-11-04".to_string()),
            end_date: None,
            location: None,
            register_link: Some("https://www.uipath.com/x".to_string()),
            category: "Webinar".to_string(),
        }];

        let path = writer.write(&events, at()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("source,title,description,start_date,end_date,location,register_link,category")
        );
        assert_eq!(
            lines.next(),
            Some("UiPath,\"Automatisierung, für alle\",,2025-11-04,,,https://www.uipath.com/x,Webinar")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_run_still_writes_header() {
        let dir = tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), "events");
        let path = writer.write(&[], at()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.trim_start_matches('\u{feff}').lines().count(), 1);
    }
}
