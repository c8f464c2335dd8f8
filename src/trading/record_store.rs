use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::BotError;

/// Append-only CSV table of `R` rows.
///
/// Appends from any number of threads are serialised through one mutex. The
/// header row is written only when the file is new or empty.
pub struct CsvTable<R> {
    path: PathBuf,
    lock: Mutex<()>,
    _rows: PhantomData<fn() -> R>,
}

impl<R: Serialize + DeserializeOwned> CsvTable<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _rows: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, rows: &[R]) -> Result<(), BotError> {
        if rows.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!("appended {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }

    /// Append, logging instead of failing.
    pub fn append_or_warn(&self, rows: &[R]) {
        if let Err(e) = self.append(rows) {
            warn!("could not append to {}: {}", self.path.display(), e);
        }
    }

    pub fn load_strict(&self) -> Result<Vec<R>, BotError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader.deserialize().collect::<Result<Vec<R>, _>>()?;
        Ok(rows)
    }

    /// Prior rows, or none when the file is missing or unreadable.
    pub fn load(&self) -> Vec<R> {
        if !self.path.exists() {
            return Vec::new();
        }
        match self.load_strict() {
            Ok(rows) => rows,
            Err(e) => {
                warn!("ignoring unreadable {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        value: f64,
    }

    fn row(name: &str, value: f64) -> Row {
        Row {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn appends_accumulate_with_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let table: CsvTable<Row> = CsvTable::new(dir.path().join("rows.csv"));

        table.append(&[row("a", 1.0)]).unwrap();
        table.append(&[row("b", 2.0), row("c", 3.0)]).unwrap();

        let rows = table.load();
        assert_eq!(rows, vec![row("a", 1.0), row("b", 2.0), row("c", 3.0)]);

        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text.matches("name,value").count(), 1);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table: CsvTable<Row> = CsvTable::new(dir.path().join("nope.csv"));
        assert!(table.load().is_empty());
        assert!(table.load_strict().is_err());
    }

    #[test]
    fn unreadable_file_loads_empty_and_append_still_works() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.csv");
        std::fs::write(&path, "name,value\nx,not-a-number\n").unwrap();
        let table: CsvTable<Row> = CsvTable::new(&path);
        assert!(table.load().is_empty());
        table.append(&[row("ok", 1.0)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("ok,1.0\n"));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let table: CsvTable<Row> = CsvTable::new(dir.path().join("nested/out/rows.csv"));
        table.append(&[row("a", 1.0)]).unwrap();
        assert_eq!(table.load().len(), 1);
    }

    #[test]
    fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let table: Arc<CsvTable<Row>> = Arc::new(CsvTable::new(dir.path().join("rows.csv")));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        table.append(&[row(&format!("t{t}"), i as f64)]).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(table.load_strict().unwrap().len(), 200);
    }
}
