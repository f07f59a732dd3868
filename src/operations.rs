//! Schema, data and query operations over named databases.
//!
//! Every public operation converts its failures into a value: callers get a
//! [`Response`] or a [`QueryResult`], never an `Err`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::paths::PathResolver;
use crate::sqlite::{
    self, check_identifier, ColumnSpec, Params, QueryResult, Record, SqlQuery, TableDefinition,
};
use crate::translate;

/// Outcome of a schema or data operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Message { message: String },
    Error { error: String },
}

impl Response {
    pub fn message(msg: impl Into<String>) -> Self {
        Response::Message {
            message: msg.into(),
        }
    }

    pub fn error(err: impl fmt::Display) -> Self {
        Response::Error {
            error: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

impl From<Result<String>> for Response {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(msg) => Response::message(msg),
            Err(e) => Response::error(e),
        }
    }
}

/// Provisions and queries SQLite databases addressed by name.
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    paths: PathResolver,
}

impl DatabaseManager {
    /// Creates a manager rooted at `config.root_dir`, creating the directory if needed.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let paths = PathResolver::new(config)?;
        info!(root = %paths.root().display(), "database root ready");
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Resolves an existing database, failing with `NotFound` otherwise.
    fn existing(&self, db_name: &str) -> Result<PathBuf> {
        PathResolver::check_name(db_name)?;
        let path = self.paths.path_for(db_name);
        if !path.exists() {
            return Err(StoreError::NotFound(db_name.to_string()));
        }
        Ok(path)
    }

    /// Creates an empty database file. An existing file is left untouched.
    pub fn create_database(&self, db_name: &str) -> Response {
        let result = self.try_create_database(db_name);
        if let Err(e) = &result {
            warn!(db = db_name, error = %e, "create_database failed");
        }
        result.into()
    }

    fn try_create_database(&self, db_name: &str) -> Result<String> {
        PathResolver::check_name(db_name)?;
        let path = self.paths.path_for(db_name);
        if path.exists() {
            info!(db = db_name, "database already exists");
            return Ok(format!("Database '{}' already exists", db_name));
        }
        sqlite::create_database_file(&path)?;
        info!(db = db_name, path = %path.display(), "database created");
        Ok(format!("Database '{}' created successfully!", db_name))
    }

    /// Runs `CREATE TABLE IF NOT EXISTS` with the given columns.
    pub fn create_table(&self, db_name: &str, table_name: &str, columns: &[ColumnSpec]) -> Response {
        let result = self.try_create_table(db_name, table_name, columns);
        if let Err(e) = &result {
            warn!(db = db_name, table = table_name, error = %e, "create_table failed");
        }
        result.into()
    }

    fn try_create_table(&self, db_name: &str, table_name: &str, columns: &[ColumnSpec]) -> Result<String> {
        let path = self.existing(db_name)?;
        let table = columns
            .iter()
            .fold(TableDefinition::new(table_name), |table, column| {
                table.with_column(&column.name, &column.column_type)
            });
        table.validate()?;

        if let QueryResult::Error { error } =
            sqlite::execute(&path, &SqlQuery::new(table.create_statement()), false)
        {
            return Err(StoreError::Rejected(error));
        }
        info!(db = db_name, table = table_name, columns = columns.len(), "table created");
        Ok(format!("Table '{}' created.", table_name))
    }

    /// Inserts `records` in one transaction.
    ///
    /// The column list comes from the first record. Every other record must
    /// carry exactly the same keys (in any order); otherwise nothing is written.
    pub fn insert_records(&self, db_name: &str, table_name: &str, records: &[Record]) -> Response {
        let result = self.try_insert_records(db_name, table_name, records);
        if let Err(e) = &result {
            warn!(db = db_name, table = table_name, error = %e, "insert_records failed");
        }
        result.into()
    }

    fn try_insert_records(&self, db_name: &str, table_name: &str, records: &[Record]) -> Result<String> {
        let path = self.existing(db_name)?;
        let first = records
            .first()
            .ok_or_else(|| StoreError::invalid("No records provided"))?;

        check_identifier("table", table_name)?;
        if first.is_empty() {
            return Err(StoreError::invalid("First record has no columns"));
        }
        let columns: Vec<&str> = first.keys().collect();
        for column in &columns {
            check_identifier("column", column)?;
        }

        let mut batches = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            let params = row_params(record, &columns).ok_or_else(|| {
                StoreError::invalid(format!(
                    "Record {} does not have the same columns as the first record",
                    idx
                ))
            })?;
            batches.push(params);
        }

        let statement = sqlite::insert_statement(table_name, &columns);
        let count = sqlite::execute_many(&path, &statement, batches)?;
        info!(db = db_name, table = table_name, count, "records inserted");
        Ok(format!("{} records inserted.", count))
    }

    /// Translates `prompt` into a SELECT against `table_name` and returns its rows.
    pub fn prompt_query(&self, db_name: &str, table_name: &str, prompt: &str) -> QueryResult {
        let path = match self
            .existing(db_name)
            .and_then(|path| check_identifier("table", table_name).map(|_| path))
        {
            Ok(path) => path,
            Err(e) => {
                warn!(db = db_name, table = table_name, error = %e, "prompt_query rejected");
                return QueryResult::error(e);
            }
        };

        let statement = translate::prompt_to_sql(prompt, table_name);
        info!(db = db_name, table = table_name, statement = %statement, "prompt translated");
        sqlite::execute(&path, &SqlQuery::new(statement), true)
    }
}

/// Values of `record` in `columns` order, or `None` when the key sets differ.
fn row_params(record: &Record, columns: &[&str]) -> Option<Params> {
    if record.len() != columns.len() {
        return None;
    }
    columns
        .iter()
        .map(|column| record.get(column).cloned())
        .collect::<Option<Vec<_>>>()
        .map(Params::from_iter)
}
