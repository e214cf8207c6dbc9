//! Prenatal visit migration
//!
//! Moves the legacy `consultasPrenatal` CSV export into the new database.
//! Legacy patient ids are meaningless in the new schema, so every visit is
//! re-keyed through the patient's name:
//!
//! ```text
//! visits.csv[1] ──► gestantes.csv (old id → nome) ──► gestantes table (nome → id)
//! ```
//!
//! The run is linear: connect, build both mappings, clear the target table,
//! insert every resolved visit in a single transaction.
//!
//! # Example
//!
//! ```ignore
//! use prenatal_migrate::{DatabaseUrl, MigrationOptions, Migrator, MySqlStore};
//!
//! let url = DatabaseUrl::from_env("DATABASE_URL")?;
//! let mut store = MySqlStore::connect(&url)?;
//! let summary = Migrator::new(MigrationOptions::default()).run(&mut store, |_| {})?;
//! println!("{summary}");
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod legacy;
pub mod migrate;
pub mod store;
pub mod transform;

pub use connection::DatabaseUrl;
pub use error::{MigrateError, Result};
pub use legacy::{LegacyIdToName, RawVisit};
pub use migrate::{MigrationEvent, MigrationOptions, MigrationSummary, Migrator};
pub use store::{MySqlStore, NameToNewId, VisitStore};
pub use transform::VisitRecord;

/// Legacy patients export
pub const DEFAULT_PATIENTS_CSV: &str = "/home/ubuntu/upload/gestantes_20251209_210138.csv";

/// Legacy prenatal visits export
pub const DEFAULT_VISITS_CSV: &str = "/home/ubuntu/upload/consultasPrenatal_20251210_091102.csv";

/// Environment variable holding the MySQL connection string
pub const DEFAULT_DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Report progress after this many inserts
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;
