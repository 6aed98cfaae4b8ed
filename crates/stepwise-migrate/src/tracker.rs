//! Applied-set tracker
//!
//! One table with a single `id` primary key column. A row for an id means the
//! step with that id has been applied; nothing else is stored.

use sqlx::{AnyConnection, AnyPool};

use crate::config::validate_table_name;
use crate::dialect::Dialect;
use crate::error::ConstructionError;

/// Bookkeeping table access for one dialect
#[derive(Debug, Clone)]
pub struct Tracker {
    table: String,
    dialect: Dialect,
}

impl Tracker {
    /// The table name is spliced into SQL unquoted, so it is checked here
    pub fn new(table: impl Into<String>, dialect: Dialect) -> Result<Self, ConstructionError> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { table, dialect })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Create the table unless it already exists
    pub async fn ensure_table(&self, pool: &AnyPool) -> Result<(), sqlx::Error> {
        sqlx::query(&self.create_table_sql()).execute(pool).await?;
        Ok(())
    }

    /// Whether a row exists for `id`; a missing row is `Ok(false)`
    pub async fn is_applied(&self, pool: &AnyPool, id: &str) -> Result<bool, sqlx::Error> {
        let found: Option<String> = sqlx::query_scalar(&self.select_sql())
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;
        Ok(found.is_some())
    }

    /// Insert the row for `id` inside the caller's transaction
    pub async fn record(&self, conn: &mut AnyConnection, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query(&self.insert_sql())
            .bind(id.to_string())
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Delete the row for `id` inside the caller's transaction
    pub async fn remove(&self, conn: &mut AnyConnection, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query(&self.delete_sql())
            .bind(id.to_string())
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Every id currently recorded, sorted lexically
    pub async fn applied_ids(&self, pool: &AnyPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(&self.list_sql()).fetch_all(pool).await
    }

    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (id {} PRIMARY KEY)",
            self.table,
            self.dialect.id_column_type()
        )
    }

    pub fn select_sql(&self) -> String {
        format!(
            "SELECT id FROM {} WHERE id = {}",
            self.table,
            self.dialect.placeholder(1)
        )
    }

    pub fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (id) VALUES ({})",
            self.table,
            self.dialect.placeholder(1)
        )
    }

    pub fn delete_sql(&self) -> String {
        format!(
            "DELETE FROM {} WHERE id = {}",
            self.table,
            self.dialect.placeholder(1)
        )
    }

    fn list_sql(&self) -> String {
        format!("SELECT id FROM {} ORDER BY id", self.table)
    }
}
