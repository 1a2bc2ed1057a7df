use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::io::Write;
use std::process::Command;

// The grid-edit cycle: an editor surface takes a snapshot of a projection,
// hands it to the user's $EDITOR as a headered CSV, and returns whatever
// came back for the reconciler to merge. One fully serialized cycle per
// invocation; nothing shared is touched until the caller saves.

/// Round a projection through the user's editor. The header row is for the
/// human and is dropped on the way back.
pub fn edit_rows(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<Vec<String>>> {
    let text = rows_to_csv(headers, rows)?;
    let edited = edit_text_in_editor(&text, ".csv")?;
    csv_to_rows(&edited)
}

/// Hand arbitrary text to $VISUAL / $EDITOR (falling back to vi) and
/// return the saved contents.
pub fn edit_text_in_editor(initial: &str, suffix: &str) -> Result<String> {
    let editor = env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    let mut file = tempfile::Builder::new()
        .prefix("jobhound-")
        .suffix(suffix)
        .tempfile()
        .context("Failed to create temp file for editing")?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;

    // Tolerate editors with flags baked in, e.g. EDITOR="code -w".
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| anyhow!("EDITOR is set but empty"))?;

    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor '{}'", editor))?;
    if !status.success() {
        bail!("Editor '{}' exited with {}; discarding edits", editor, status);
    }

    std::fs::read_to_string(file.path()).context("Failed to read edited file")
}

pub fn rows_to_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow!("{e}"))?;
    String::from_utf8(bytes).context("CSV snapshot was not valid UTF-8")
}

pub fn csv_to_rows(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to parse edited CSV")?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_csv_round_trip_drops_header() {
        let headers = ["id", "Name"];
        let rows = vec![row(&["c1", "Acme, Inc"]), row(&["c2", "Globex"])];

        let text = rows_to_csv(&headers, &rows).unwrap();
        assert!(text.starts_with("id,Name\n"));
        assert!(text.contains("\"Acme, Inc\""));

        assert_eq!(csv_to_rows(&text).unwrap(), rows);
    }

    #[test]
    fn test_csv_to_rows_tolerates_ragged_rows() {
        let rows = csv_to_rows("id,Name\nc1\nc2,Globex,extra\n").unwrap();
        assert_eq!(rows, vec![row(&["c1"]), row(&["c2", "Globex", "extra"])]);
    }

    // One test for both editor outcomes; parallel tests must not fight
    // over VISUAL/EDITOR.
    #[test]
    fn test_edit_text_follows_editor_exit_status() {
        unsafe {
            env::set_var("VISUAL", "true");
            env::set_var("EDITOR", "true");
        }
        let text = edit_text_in_editor("id,Name\nc1,Acme\n", ".csv").unwrap();
        assert_eq!(text, "id,Name\nc1,Acme\n");

        unsafe {
            env::set_var("VISUAL", "false");
            env::set_var("EDITOR", "false");
        }
        assert!(edit_text_in_editor("x", ".txt").is_err());

        unsafe {
            env::set_var("VISUAL", "true");
            env::set_var("EDITOR", "true");
        }
    }
}
