use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{
    COMPANY_WIDTH, HUNT_WIDTH, PROGRESS_WIDTH, PersonalDetails, REMINDER_WIDTH,
};

/// The four flat tabular datasets. PersonalDetails is not a row collection
/// and lives behind its own load/save pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Hunt,
    Company,
    Reminder,
    Progress,
}

impl RecordKind {
    pub fn file_name(self) -> &'static str {
        match self {
            RecordKind::Hunt => "hunt.csv",
            RecordKind::Company => "company.csv",
            RecordKind::Reminder => "reminder.csv",
            RecordKind::Progress => "progress.csv",
        }
    }

    pub fn width(self) -> usize {
        match self {
            RecordKind::Hunt => HUNT_WIDTH,
            RecordKind::Company => COMPANY_WIDTH,
            RecordKind::Reminder => REMINDER_WIDTH,
            RecordKind::Progress => PROGRESS_WIDTH,
        }
    }
}

const PERSONAL_FILE: &str = "personalDetails.json";

/// Pad a short row with empty strings, trim a long one. Idempotent; the
/// trim is lossy for extra columns.
pub fn normalize_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.truncate(width);
    while row.len() < width {
        row.push(String::new());
    }
    row
}

/// Flat-file record store. Each kind is one headerless CSV, one row per
/// record, overwritten wholesale on save. Last writer wins.
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    /// Open the store at the platform data directory (or ./data as a
    /// fallback when no home directory can be resolved).
    pub fn open() -> Result<Self> {
        let data_dir = if let Some(dirs) = directories::ProjectDirs::from("", "", "jobhound") {
            dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from("data")
        };
        Ok(Self { data_dir })
    }

    /// Open the store at an explicit directory (tests, --data-dir).
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, kind: RecordKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    /// Load all rows of a kind, each normalized to the kind's schema width.
    /// A missing file is an empty collection, not an error.
    pub fn load(&self, kind: RecordKind) -> Result<Vec<Vec<String>>> {
        let path = self.path_for(kind);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let width = kind.width();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.with_context(|| format!("Failed to read {}", path.display()))?;
            let row: Vec<String> = record.iter().map(str::to_string).collect();
            rows.push(normalize_row(row, width));
        }
        Ok(rows)
    }

    /// Overwrite the kind's file with exactly these rows, width-normalized.
    pub fn save(&self, kind: RecordKind, rows: &[Vec<String>]) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create {}", self.data_dir.display()))?;

        let path = self.path_for(kind);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let width = kind.width();
        for row in rows {
            writer.write_record(normalize_row(row.clone(), width))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load the personal-details document. Missing or unreadable JSON falls
    /// back to the default document; startup never fails on it.
    pub fn load_personal(&self) -> PersonalDetails {
        let path = self.data_dir.join(PERSONAL_FILE);
        match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(_) => PersonalDetails::default(),
        }
    }

    pub fn save_personal(&self, details: &PersonalDetails) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create {}", self.data_dir.display()))?;
        let path = self.data_dir.join(PERSONAL_FILE);
        let json = serde_json::to_string_pretty(details)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_normalize_row_pads_short_rows() {
        let normalized = normalize_row(row(&["a", "b"]), 5);
        assert_eq!(normalized, row(&["a", "b", "", "", ""]));
    }

    #[test]
    fn test_normalize_row_trims_long_rows() {
        let normalized = normalize_row(row(&["a", "b", "c", "d"]), 2);
        assert_eq!(normalized, row(&["a", "b"]));
    }

    #[test]
    fn test_normalize_row_is_idempotent() {
        let once = normalize_row(row(&["a"]), 3);
        let twice = normalize_row(once.clone(), 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());
        assert!(store.load(RecordKind::Hunt).unwrap().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());

        let rows = vec![
            row(&["r1", "h1", "2025-01-02 09:00:00", "Pending", "follow up"]),
            row(&["r2", "h1", "2025-02-03 10:30:00", "Done", "said, \"thanks\""]),
        ];
        store.save(RecordKind::Reminder, &rows).unwrap();
        assert_eq!(store.load(RecordKind::Reminder).unwrap(), rows);
    }

    #[test]
    fn test_save_normalizes_row_width() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());

        let rows = vec![
            row(&["r1", "h1"]),                                              // short
            row(&["r2", "h1", "2025-01-01 08:00:00", "Pending", "x", "y"]),  // long
        ];
        store.save(RecordKind::Reminder, &rows).unwrap();

        let loaded = store.load(RecordKind::Reminder).unwrap();
        assert_eq!(loaded[0], row(&["r1", "h1", "", "", ""]));
        assert_eq!(loaded[1], row(&["r2", "h1", "2025-01-01 08:00:00", "Pending", "x"]));
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());

        store
            .save(RecordKind::Company, &[row(&["c1", "Acme", "", "", "No", "", "", "", "", ""])])
            .unwrap();
        store
            .save(RecordKind::Company, &[row(&["c2", "Globex", "", "", "No", "", "", "", "", ""])])
            .unwrap();

        let loaded = store.load(RecordKind::Company).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0][0], "c2");
    }

    #[test]
    fn test_quoted_fields_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());

        let rows = vec![normalize_row(
            row(&["h1", "Engineer, Backend", "line one\nline two"]),
            HUNT_WIDTH,
        )];
        store.save(RecordKind::Hunt, &rows).unwrap();
        assert_eq!(store.load(RecordKind::Hunt).unwrap(), rows);
    }

    #[test]
    fn test_personal_details_missing_and_malformed_fall_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());
        assert_eq!(store.load_personal(), PersonalDetails::default());

        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join(PERSONAL_FILE), "{not json").unwrap();
        assert_eq!(store.load_personal(), PersonalDetails::default());
    }

    #[test]
    fn test_personal_details_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());

        let mut details = PersonalDetails::default();
        details.name = "Jane Doe".to_string();
        details.skills[0].skill = "Rust".to_string();

        store.save_personal(&details).unwrap();
        assert_eq!(store.load_personal(), details);
    }
}
