//! The migration pipeline: BuildMappings → Clear → Insert

use std::fmt;
use std::path::PathBuf;

use log::{debug, info};

use crate::error::Result;
use crate::legacy::{VisitRow, VisitRows, read_legacy_patients};
use crate::store::VisitStore;
use crate::transform::VisitRecord;

/// Inputs and switches for a run
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub patients_csv: PathBuf,
    pub visits_csv: PathBuf,
    /// Emit [`MigrationEvent::Progress`] every this many inserts (0 disables)
    pub progress_interval: usize,
    /// Resolve and transform without touching the target table
    pub dry_run: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            patients_csv: PathBuf::from(crate::DEFAULT_PATIENTS_CSV),
            visits_csv: PathBuf::from(crate::DEFAULT_VISITS_CSV),
            progress_interval: crate::DEFAULT_PROGRESS_INTERVAL,
            dry_run: false,
        }
    }
}

/// Row counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Rows inserted
    pub imported: usize,
    /// Rows whose patient could not be resolved to a new id
    pub unmatched: usize,
    /// Rows with too few columns to migrate
    pub incomplete: usize,
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "importadas={}, sem_gestante={}, incompletas={}",
            self.imported, self.unmatched, self.incomplete
        )
    }
}

/// Milestones reported while the run advances
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    LegacyPatientsRead(usize),
    PatientsFound(usize),
    VisitsCleared(u64),
    Progress(usize),
}

pub struct Migrator {
    options: MigrationOptions,
}

impl Migrator {
    pub fn new(options: MigrationOptions) -> Self {
        Self { options }
    }

    /// Run the migration against `store`, reporting milestones to `on_event`.
    ///
    /// Any error aborts the run. The clear is committed on its own, so an
    /// error during the insert phase leaves the target table empty.
    pub fn run<S, F>(&self, store: &mut S, mut on_event: F) -> Result<MigrationSummary>
    where
        S: VisitStore + ?Sized,
        F: FnMut(MigrationEvent),
    {
        let legacy = read_legacy_patients(&self.options.patients_csv)?;
        on_event(MigrationEvent::LegacyPatientsRead(legacy.len()));

        let patients = store.patients_by_name()?;
        on_event(MigrationEvent::PatientsFound(patients.len()));

        if self.options.dry_run {
            info!("Dry run: target table left untouched");
        } else {
            let removed = store.clear_visits()?;
            on_event(MigrationEvent::VisitsCleared(removed));
            store.begin_load()?;
        }

        let mut summary = MigrationSummary::default();

        for row in VisitRows::open(&self.options.visits_csv)? {
            let raw = match row? {
                VisitRow::Visit(raw) => raw,
                VisitRow::Incomplete { line, columns } => {
                    debug!("line {}: {} columns, skipping", line, columns);
                    summary.incomplete += 1;
                    continue;
                }
            };

            let legacy_id = raw.legacy_patient_id()?;
            // Empty names and id 0 count as unresolved
            let Some(patient_id) = legacy
                .get(&legacy_id)
                .filter(|name| !name.is_empty())
                .and_then(|name| patients.get(name))
                .copied()
                .filter(|&id| id != 0)
            else {
                debug!("line {}: no patient for legacy id {}", raw.line(), legacy_id);
                summary.unmatched += 1;
                continue;
            };

            let visit = VisitRecord::from_raw(patient_id, &raw)?;
            if !self.options.dry_run {
                store.insert_visit(&visit)?;
            }

            summary.imported += 1;
            if self.options.progress_interval > 0 && summary.imported % self.options.progress_interval == 0 {
                on_event(MigrationEvent::Progress(summary.imported));
            }
        }

        if !self.options.dry_run {
            store.commit_load()?;
        }

        info!("Migration finished: {}", summary);
        Ok(summary)
    }
}
