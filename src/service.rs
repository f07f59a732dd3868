//! Named actions over the database manager.
//!
//! Actions take JSON arguments and produce JSON results, so any transport
//! that can carry a tool name and an argument object can drive them.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::operations::{DatabaseManager, Response};
use crate::sqlite::{ColumnSpec, QueryResult, Record};

/// Name and description of an invocable action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub const ACTIONS: &[ActionInfo] = &[
    ActionInfo {
        name: "create_database",
        description: "Create a new SQLite database dynamically.",
    },
    ActionInfo {
        name: "create_table",
        description: "Create a dynamic table.",
    },
    ActionInfo {
        name: "insert_records",
        description: "Insert rows dynamically.",
    },
    ActionInfo {
        name: "prompt_query",
        description: "Ask a plain-language question; tool converts to SQL.",
    },
];

/// A service exposing named actions with a start/stop lifecycle.
#[async_trait]
pub trait Service: Send + Sync {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn description(&self) -> &str;
    fn actions(&self) -> &[ActionInfo];

    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;

    /// Invokes `action` with JSON `params`.
    ///
    /// `Err` is reserved for requests that cannot be dispatched (unknown
    /// action, malformed arguments). Operation failures come back as an
    /// `{"error": ...}` value.
    async fn request(&self, action: &str, params: JsonValue) -> Result<JsonValue>;
}

#[derive(Debug, Deserialize)]
struct CreateDatabaseArgs {
    #[serde(alias = "name")]
    db_name: String,
}

#[derive(Debug, Deserialize)]
struct CreateTableArgs {
    db_name: String,
    table_name: String,
    columns: Vec<ColumnSpec>,
}

#[derive(Debug, Deserialize)]
struct InsertRecordsArgs {
    db_name: String,
    table_name: String,
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct PromptQueryArgs {
    db_name: String,
    table_name: String,
    prompt: String,
}

fn parse_args<T: DeserializeOwned>(action: &str, params: JsonValue) -> Result<T> {
    serde_json::from_value(params).with_context(|| format!("invalid arguments for '{}'", action))
}

pub struct SqliteDynamicService {
    manager: Arc<DatabaseManager>,
}

impl SqliteDynamicService {
    /// Create a new service rooted at the configured directory
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let manager = DatabaseManager::new(config).context("failed to prepare database root")?;
        Ok(Self {
            manager: Arc::new(manager),
        })
    }

    pub fn manager(&self) -> &DatabaseManager {
        &self.manager
    }

    /// Runs a synchronous operation on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DatabaseManager) -> T + Send + 'static,
        T: Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        Ok(tokio::task::spawn_blocking(move || f(&manager)).await?)
    }

    pub async fn create_database(&self, db_name: String) -> Result<Response> {
        self.blocking(move |m| m.create_database(&db_name)).await
    }

    pub async fn create_table(
        &self,
        db_name: String,
        table_name: String,
        columns: Vec<ColumnSpec>,
    ) -> Result<Response> {
        self.blocking(move |m| m.create_table(&db_name, &table_name, &columns))
            .await
    }

    pub async fn insert_records(
        &self,
        db_name: String,
        table_name: String,
        records: Vec<Record>,
    ) -> Result<Response> {
        self.blocking(move |m| m.insert_records(&db_name, &table_name, &records))
            .await
    }

    pub async fn prompt_query(
        &self,
        db_name: String,
        table_name: String,
        prompt: String,
    ) -> Result<QueryResult> {
        self.blocking(move |m| m.prompt_query(&db_name, &table_name, &prompt))
            .await
    }
}

#[async_trait]
impl Service for SqliteDynamicService {
    fn name(&self) -> &str {
        "sqlite-dynamic"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        "Dynamic SQLite database provisioning"
    }

    fn actions(&self) -> &[ActionInfo] {
        ACTIONS
    }

    async fn start(&self) -> Result<()> {
        info!(
            root = %self.manager.paths().root().display(),
            "starting sqlite-dynamic service"
        );
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        info!("sqlite-dynamic service stopped");
        Ok(())
    }

    async fn request(&self, action: &str, params: JsonValue) -> Result<JsonValue> {
        debug!(action, "dispatching request");
        let result = match action {
            "create_database" => {
                let args: CreateDatabaseArgs = parse_args(action, params)?;
                serde_json::to_value(self.create_database(args.db_name).await?)?
            }
            "create_table" => {
                let args: CreateTableArgs = parse_args(action, params)?;
                let response = self
                    .create_table(args.db_name, args.table_name, args.columns)
                    .await?;
                serde_json::to_value(response)?
            }
            "insert_records" => {
                let args: InsertRecordsArgs = parse_args(action, params)?;
                let response = self
                    .insert_records(args.db_name, args.table_name, args.records)
                    .await?;
                serde_json::to_value(response)?
            }
            "prompt_query" => {
                let args: PromptQueryArgs = parse_args(action, params)?;
                let result = self
                    .prompt_query(args.db_name, args.table_name, args.prompt)
                    .await?;
                serde_json::to_value(result)?
            }
            other => return Err(anyhow!("unknown action '{}'", other)),
        };
        Ok(result)
    }
}
