//! [`CatalogExecutor`] over the DM ODBC driver.
//!
//! Every query opens its own connection from a shared environment, so one executor can
//! serve concurrent table loads. Values are fetched as text, which is how every catalog
//! loader consumes them.

use crate::config::CatalogConfig;
use crate::executor::{CatalogExecutor, ExecutorError};
use crate::row::{CatalogRow, RowCase};
use odbc_api::{
    buffers::TextRowSet, ConnectionOptions, Cursor, Environment, IntoParameter, ResultSetMetadata,
};

const BATCH_SIZE: usize = 1000;
const MAX_TEXT_LEN: usize = 4096;
const IDENTITY_SQL: &str = "SELECT USER FROM DUAL";

pub struct OdbcExecutor {
    env: Environment,
    connection_string: String,
    identity: Option<String>,
}

impl OdbcExecutor {
    /// Connect once to verify the connection string and capture the session user.
    pub fn connect(connection_string: impl Into<String>) -> Result<Self, ExecutorError> {
        let env = Environment::new().map_err(|e| {
            ExecutorError::Connection(format!(
                "Failed to create ODBC environment: {}. Make sure unixODBC and the DM ODBC driver are installed.",
                e
            ))
        })?;
        let mut executor = Self {
            env,
            connection_string: connection_string.into(),
            identity: None,
        };
        executor.identity = executor.query_scalar(IDENTITY_SQL, &[])?;
        log::info!(
            "Connected to DM via ODBC as {}",
            executor.identity.as_deref().unwrap_or("<unknown>")
        );
        Ok(executor)
    }

    /// Connect with `odbc_connection_string` from `config`.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, ExecutorError> {
        let connection_string = config.odbc_connection_string.clone().ok_or_else(|| {
            ExecutorError::Connection("catalog.odbc_connection_string is not configured".to_string())
        })?;
        Self::connect(connection_string)
    }

    fn connection(&self) -> Result<odbc_api::Connection<'_>, ExecutorError> {
        self.env
            .connect_with_connection_string(&self.connection_string, ConnectionOptions::default())
            .map_err(|e| ExecutorError::Connection(format!("ODBC connection failed: {}", e)))
    }
}

fn query_error(sql: &str, message: impl ToString) -> ExecutorError {
    ExecutorError::Query {
        sql: sql.trim().to_string(),
        message: message.to_string(),
    }
}

impl CatalogExecutor for OdbcExecutor {
    fn query_all(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>, ExecutorError> {
        let conn = self.connection()?;
        let params: Vec<_> = params.iter().map(|p| p.into_parameter()).collect();

        let mut rows = Vec::new();
        let Some(mut cursor) = conn
            .execute(sql, params.as_slice())
            .map_err(|e| query_error(sql, e))?
        else {
            return Ok(rows);
        };

        let num_cols = cursor.num_result_cols().map_err(|e| query_error(sql, e))? as u16;
        let mut labels = Vec::with_capacity(num_cols as usize);
        for col in 1..=num_cols {
            labels.push(cursor.col_name(col).map_err(|e| query_error(sql, e))?);
        }

        let mut buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_TEXT_LEN))
            .map_err(|e| query_error(sql, e))?;
        let mut row_cursor = cursor.bind_buffer(&mut buffers).map_err(|e| query_error(sql, e))?;

        while let Some(batch) = row_cursor.fetch().map_err(|e| query_error(sql, e))? {
            for row_idx in 0..batch.num_rows() {
                let mut row = CatalogRow::new();
                for (col_idx, label) in labels.iter().enumerate() {
                    let value = batch
                        .at(col_idx, row_idx)
                        .map(|bytes| String::from_utf8_lossy(bytes).to_string());
                    row.push(label.clone(), value);
                }
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn session_identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn active_row_case(&self) -> RowCase {
        RowCase::Natural
    }
}
