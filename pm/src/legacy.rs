//! Readers for the two legacy CSV exports

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};

use crate::error::{MigrateError, Result};

/// Legacy patient id → patient name
pub type LegacyIdToName = HashMap<i64, String>;

/// Patients rows need at least id, (unused), name
const PATIENT_MIN_COLUMNS: usize = 3;

fn open_csv(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| MigrateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Header row is skipped; row widths vary in the exports
    Ok(ReaderBuilder::new().has_headers(true).flexible(true).from_reader(file))
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Parse a field that must hold an integer; failure aborts the run
pub(crate) fn required_int<T: FromStr>(path: &Path, line: u64, field: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| MigrateError::InvalidInteger {
        path: path.to_path_buf(),
        line,
        field,
        value: raw.to_string(),
    })
}

/// Build the legacy id → name mapping from the patients export.
///
/// Column 0 is the legacy id and column 2 the name. Rows with fewer than three
/// columns are ignored and a repeated id keeps the last name seen.
pub fn read_legacy_patients(path: &Path) -> Result<LegacyIdToName> {
    let mut reader = open_csv(path)?;
    let mut mapping = LegacyIdToName::new();

    for record in reader.records() {
        let record = record?;
        if record.len() < PATIENT_MIN_COLUMNS {
            debug!("{}:{}: skipping short patient row", path.display(), record_line(&record));
            continue;
        }
        let id: i64 = required_int(path, record_line(&record), "id", &record[0])?;
        mapping.insert(id, record[2].to_string());
    }

    info!("Read {} legacy patients from {}", mapping.len(), path.display());
    Ok(mapping)
}

/// One visits row with every column the migration reads
#[derive(Debug, Clone)]
pub struct RawVisit {
    source: Rc<Path>,
    line: u64,
    fields: StringRecord,
}

impl RawVisit {
    /// Rows narrower than this are not migrated
    pub const MIN_COLUMNS: usize = 12;

    pub const PATIENT_ID: usize = 1;
    pub const DATE: usize = 2;
    pub const GESTATIONAL_WEEK: usize = 3;
    pub const GESTATIONAL_DAY: usize = 4;
    pub const WEIGHT: usize = 5;
    pub const SYSTOLIC: usize = 6;
    pub const DIASTOLIC: usize = 7;
    pub const FUNDAL_HEIGHT: usize = 8;
    pub const FETAL_HEARTBEAT: usize = 9;
    pub const FETAL_MOVEMENT: usize = 10;
    pub const NOTES: usize = 11;

    fn new(source: Rc<Path>, fields: StringRecord) -> Self {
        let line = record_line(&fields);
        Self { source, line, fields }
    }

    /// Build a row from raw column values, as if read at `line` of `source`
    #[cfg(test)]
    pub(crate) fn from_fields<I, S>(source: &Path, line: u64, fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let fields: StringRecord = StringRecord::from_byte_record(fields.into_iter().collect()).ok()?;
        if fields.len() < Self::MIN_COLUMNS {
            return None;
        }
        Some(Self {
            source: Rc::from(source),
            line,
            fields,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    /// Raw value of column `index`
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).unwrap_or_default()
    }

    /// Legacy patient id from column 1
    pub fn legacy_patient_id(&self) -> Result<i64> {
        required_int(&self.source, self.line, "gestanteId", self.get(Self::PATIENT_ID))
    }
}

/// A visits row as read from the file
#[derive(Debug, Clone)]
pub enum VisitRow {
    Visit(RawVisit),
    /// Fewer than [`RawVisit::MIN_COLUMNS`] columns
    Incomplete { line: u64, columns: usize },
}

/// Streaming reader over the visits export
pub struct VisitRows {
    source: Rc<Path>,
    records: csv::StringRecordsIntoIter<File>,
}

impl VisitRows {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = open_csv(path)?;
        debug!("Opened visits file {}", path.display());
        Ok(Self {
            source: Rc::from(path),
            records: reader.into_records(),
        })
    }
}

impl Iterator for VisitRows {
    type Item = Result<VisitRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        if record.len() < RawVisit::MIN_COLUMNS {
            return Some(Ok(VisitRow::Incomplete {
                line: record_line(&record),
                columns: record.len(),
            }));
        }

        Some(Ok(VisitRow::Visit(RawVisit::new(Rc::clone(&self.source), record))))
    }
}
