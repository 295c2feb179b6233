//! The data link: the single entry point for invoking a named procedure.
//!
//! Explicitly constructed and shared via `Arc` (one instance per process,
//! owned by `AppState`) rather than a lazy global. Every per-call failure is
//! wrapped as `DataLinkError::Operation` so repositories never handle driver
//! types.

use rusqlite::types::FromSql;
use rusqlite::types::Value;

use crate::db::procedures;
use crate::db::row::{ProcParams, ProcRow};
use crate::db::DbPool;
use crate::error::DataLinkError;

#[derive(Clone)]
pub struct DataLink {
    pool: DbPool,
}

impl DataLink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn with_statement<T>(
        &self,
        procedure: &str,
        run: impl FnOnce(&mut rusqlite::Statement<'_>) -> Result<T, rusqlite::Error>,
    ) -> Result<T, DataLinkError> {
        let sql = procedures::sql_for(procedure)
            .ok_or_else(|| DataLinkError::UnknownProcedure(procedure.to_string()))?;
        let conn = self
            .pool
            .get()
            .map_err(|e| DataLinkError::operation(procedure, e))?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DataLinkError::operation(procedure, e))?;
        run(&mut stmt).map_err(|e| DataLinkError::operation(procedure, e))
    }

    /// Run a procedure that returns a result set.
    pub fn execute_reader(
        &self,
        procedure: &str,
        params: &ProcParams,
    ) -> Result<Vec<ProcRow>, DataLinkError> {
        self.with_statement(procedure, |stmt| {
            let names: Vec<String> = stmt
                .column_names()
                .iter()
                .map(|name| name.to_string())
                .collect();
            let bindings = params.bindings();
            let mut rows = stmt.query(bindings.as_slice())?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut columns = Vec::with_capacity(names.len());
                for (index, name) in names.iter().enumerate() {
                    let value: Value = row.get(index)?;
                    columns.push((name.clone(), value));
                }
                out.push(ProcRow::new(columns));
            }
            Ok(out)
        })
    }

    /// Run a procedure that returns a single value (first column of the
    /// first row). A procedure returning no rows is an operation error.
    pub fn execute_scalar<T: FromSql>(
        &self,
        procedure: &str,
        params: &ProcParams,
    ) -> Result<T, DataLinkError> {
        self.with_statement(procedure, |stmt| {
            let bindings = params.bindings();
            stmt.query_row(bindings.as_slice(), |row| row.get::<_, T>(0))
        })
    }

    /// Run a procedure that returns no rows; yields the affected-row count.
    pub fn execute_non_query(
        &self,
        procedure: &str,
        params: &ProcParams,
    ) -> Result<usize, DataLinkError> {
        self.with_statement(procedure, |stmt| {
            let bindings = params.bindings();
            stmt.execute(bindings.as_slice())
        })
    }

    // Async variants with identical semantics; the blocking call moves to the
    // runtime's blocking pool.

    pub async fn execute_reader_async(
        &self,
        procedure: &str,
        params: ProcParams,
    ) -> Result<Vec<ProcRow>, DataLinkError> {
        let link = self.clone();
        let name = procedure.to_string();
        let join_name = name.clone();
        tokio::task::spawn_blocking(move || link.execute_reader(&name, &params))
            .await
            .map_err(|e| DataLinkError::operation(&join_name, e))?
    }

    pub async fn execute_scalar_async<T: FromSql + Send + 'static>(
        &self,
        procedure: &str,
        params: ProcParams,
    ) -> Result<T, DataLinkError> {
        let link = self.clone();
        let name = procedure.to_string();
        let join_name = name.clone();
        tokio::task::spawn_blocking(move || link.execute_scalar::<T>(&name, &params))
            .await
            .map_err(|e| DataLinkError::operation(&join_name, e))?
    }

    pub async fn execute_non_query_async(
        &self,
        procedure: &str,
        params: ProcParams,
    ) -> Result<usize, DataLinkError> {
        let link = self.clone();
        let name = procedure.to_string();
        let join_name = name.clone();
        tokio::task::spawn_blocking(move || link.execute_non_query(&name, &params))
            .await
            .map_err(|e| DataLinkError::operation(&join_name, e))?
    }
}
