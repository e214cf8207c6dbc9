//! Target database access
//!
//! [`VisitStore`] is the seam between the migration pipeline and the
//! database. [`MySqlStore`] is the production implementation.

use std::collections::HashMap;

use log::{debug, info};
use mysql::prelude::*;
use mysql::{Conn, Statement};

use crate::connection::DatabaseUrl;
use crate::error::Result;
use crate::transform::VisitRecord;

/// Patient name → id in the new database
pub type NameToNewId = HashMap<String, i64>;

const SELECT_PATIENTS: &str = "SELECT id, nome FROM gestantes";

const DELETE_VISITS: &str = "DELETE FROM consultasPrenatal";

const INSERT_VISIT: &str = "INSERT INTO consultasPrenatal \
     (gestanteId, dataConsulta, igSemanas, igDias, peso, \
      pressaoArterial, alturaUterina, bcf, mf, observacoes) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Operations the migration needs from the target database
pub trait VisitStore {
    /// Every patient of the new database keyed by name; a repeated name keeps
    /// the last id returned
    fn patients_by_name(&mut self) -> Result<NameToNewId>;

    /// Delete every visit and commit. Returns the number of rows removed.
    fn clear_visits(&mut self) -> Result<u64>;

    /// Open the transaction that wraps all inserts
    fn begin_load(&mut self) -> Result<()>;

    fn insert_visit(&mut self, visit: &VisitRecord) -> Result<()>;

    /// Commit every insert since [`VisitStore::begin_load`]
    fn commit_load(&mut self) -> Result<()>;
}

/// Single blocking MySQL connection held for the whole run
pub struct MySqlStore {
    conn: Conn,
    insert: Option<Statement>,
}

impl MySqlStore {
    pub fn connect(url: &DatabaseUrl) -> Result<Self> {
        let conn = Conn::new(url.opts())?;
        info!("Connected to {}", url);
        Ok(Self { conn, insert: None })
    }
}

impl VisitStore for MySqlStore {
    fn patients_by_name(&mut self) -> Result<NameToNewId> {
        let rows: Vec<(i64, String)> = self.conn.query(SELECT_PATIENTS)?;
        debug!("gestantes returned {} rows", rows.len());
        Ok(rows.into_iter().map(|(id, nome)| (nome, id)).collect())
    }

    fn clear_visits(&mut self) -> Result<u64> {
        // Autocommit: the delete is durable before any insert is attempted
        self.conn.query_drop(DELETE_VISITS)?;
        let removed = self.conn.affected_rows();
        info!("Deleted {} existing visits", removed);
        Ok(removed)
    }

    fn begin_load(&mut self) -> Result<()> {
        self.conn.query_drop("START TRANSACTION")?;
        self.insert = Some(self.conn.prep(INSERT_VISIT)?);
        Ok(())
    }

    fn insert_visit(&mut self, visit: &VisitRecord) -> Result<()> {
        let stmt = match &self.insert {
            Some(stmt) => stmt.clone(),
            None => {
                let stmt = self.conn.prep(INSERT_VISIT)?;
                self.insert = Some(stmt.clone());
                stmt
            }
        };
        self.conn.exec_drop(
            &stmt,
            (
                visit.patient_id,
                visit.visit_date.as_deref(),
                visit.gestational_weeks,
                visit.gestational_days,
                visit.weight_grams,
                visit.blood_pressure.as_deref(),
                visit.fundal_height,
                visit.fetal_heartbeat,
                visit.fetal_movement,
                visit.notes.as_deref(),
            ),
        )?;
        Ok(())
    }

    fn commit_load(&mut self) -> Result<()> {
        self.conn.query_drop("COMMIT")?;
        self.insert = None;
        debug!("Load transaction committed");
        Ok(())
    }
}
