use calamine::{open_workbook_auto, Data, Reader};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{InputRecord, TableRow, COLUMNS};

/// Errors that can occur when reading or writing tabular files
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] calamine::Error),

    #[error("Input is missing column {0}")]
    MissingColumn(&'static str),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

/// Load the persisted result table, or `None` if the file does not exist.
///
/// Columns are read by position; an empty file is an empty table.
pub fn load_existing(path: &Path) -> Result<Option<Vec<TableRow>>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    if fs::metadata(path)?.len() == 0 {
        return Ok(Some(Vec::new()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(TableRow::from_fields(record?.iter()));
    }

    Ok(Some(rows))
}

/// Create an empty file (and parent directories) if nothing exists at `path`
pub fn ensure_exists(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    path.with_file_name(format!("{}.tmp", name))
}

/// Write the full table, replacing the file at `path` in one rename
pub fn save(path: &Path, rows: &[TableRow]) -> Result<(), StoreError> {
    let tmp = temp_path(path);

    {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(&tmp)?;
        writer.write_record(COLUMNS)?;
        for row in rows {
            writer.write_record(row.to_fields())?;
        }
        writer.flush()?;
    }

    fs::rename(&tmp, path)?;
    Ok(())
}

/// Positions of the input columns within a header row
struct InputColumns {
    first_name: usize,
    last_name: usize,
    street: Option<usize>,
    zip: usize,
}

impl InputColumns {
    fn locate<'a, I>(headers: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_uppercase()).collect();
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &'static str| find(name).ok_or(StoreError::MissingColumn(name));

        Ok(Self {
            first_name: require("FIRST_NAME")?,
            last_name: require("LAST_NAME")?,
            street: find("STREET"),
            zip: require("ZIP")?,
        })
    }

    fn record(&self, cells: &[String]) -> InputRecord {
        let cell = |idx: usize| cells.get(idx).map(|c| c.trim().to_string()).unwrap_or_default();
        InputRecord::new(
            cell(self.first_name),
            cell(self.last_name),
            self.street.map(cell).unwrap_or_default(),
            cell(self.zip),
        )
    }
}

/// Load input records from a CSV or Excel file, chosen by extension
pub fn load_input(path: &Path) -> Result<Vec<InputRecord>, StoreError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => load_csv_input(path),
        "xlsx" | "xlsm" | "xls" => load_sheet_input(path),
        _ => Err(StoreError::UnsupportedFormat(path.display().to_string())),
    }
}

fn load_csv_input(path: &Path) -> Result<Vec<InputRecord>, StoreError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let columns = InputColumns::locate(reader.headers()?.iter())?;

    let mut records = Vec::new();
    for row in reader.records() {
        let cells: Vec<String> = row?.iter().map(str::to_string).collect();
        records.push(columns.record(&cells));
    }
    Ok(records)
}

fn load_sheet_input(path: &Path) -> Result<Vec<InputRecord>, StoreError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let header: Vec<String> = header.iter().map(cell_text).collect();
    let columns = InputColumns::locate(header.iter().map(String::as_str))?;

    Ok(rows
        .map(|row| columns.record(&row.iter().map(cell_text).collect::<Vec<_>>()))
        .collect())
}

/// Cell text as a spreadsheet would show it; whole floats lose their ".0"
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (*f as i64).to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("contact-enrich-store-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        path
    }

    fn row(first: &str, email: &str) -> TableRow {
        TableRow::from_fields([first, "Doe", "1 Main St", "New York", "NY", "10001", email, "SUCCESS"])
    }

    #[test]
    fn test_missing_file_is_none() {
        assert!(load_existing(&scratch("absent.csv")).unwrap().is_none());
    }

    #[test]
    fn test_empty_file_is_empty_table() {
        let path = scratch("empty.csv");
        ensure_exists(&path).unwrap();
        assert_eq!(load_existing(&path).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch("saved.csv");
        let rows = vec![row("Jane", "jane@gmail.com"), row("", "")];
        save(&path, &rows).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("FIRST_NAME,LAST_NAME,STREET,CITY,DIST,ZIP,EMAIL,STATUS"));
        assert!(!temp_path(&path).exists());
        assert_eq!(load_existing(&path).unwrap(), Some(rows));
    }

    #[test]
    fn test_load_csv_input_case_insensitive_headers() {
        let path = scratch("input.csv");
        fs::write(&path, "first_name,Last_Name,zip\nJane,Doe,02101\n").unwrap();

        let records = load_input(&path).unwrap();
        assert_eq!(records, vec![InputRecord::new("Jane", "Doe", "", "02101")]);
    }

    #[test]
    fn test_load_input_missing_column() {
        let path = scratch("nozip.csv");
        fs::write(&path, "FIRST_NAME,LAST_NAME\nJane,Doe\n").unwrap();
        assert!(matches!(load_input(&path), Err(StoreError::MissingColumn("ZIP"))));
    }

    #[test]
    fn test_unsupported_input_format() {
        assert!(matches!(
            load_input(Path::new("people.json")),
            Err(StoreError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_cell_text_drops_whole_float_fraction() {
        assert_eq!(cell_text(&Data::Float(10001.0)), "10001");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
