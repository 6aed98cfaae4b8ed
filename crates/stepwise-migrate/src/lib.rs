//! # stepwise-migrate
//!
//! Applies an ordered list of named migration steps to a database exactly once
//! each, recording applied ids in a bookkeeping table, and reverses them in the
//! opposite order on rollback.
//!
//! ```no_run
//! use sqlx::any::{install_default_drivers, AnyPoolOptions};
//! use stepwise_migrate::{Dialect, MigrationStep, Migrator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! install_default_drivers();
//! let pool = AnyPoolOptions::new().connect("postgres://localhost/app").await?;
//!
//! let migrator = Migrator::new(vec![
//!     MigrationStep::query(
//!         "001_create_courses",
//!         "CREATE TABLE courses (id INTEGER PRIMARY KEY, name TEXT)",
//!         "DROP TABLE courses",
//!     ),
//!     MigrationStep::file("002_create_users", "sql/002.up.sql", "sql/002.down.sql")?,
//! ])?;
//!
//! migrator.apply(&pool, Dialect::Postgres).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dialect;
pub mod error;
mod executor;
pub mod migrator;
pub mod reporter;
pub mod step;
pub mod summary;
pub mod tracker;

pub use config::{MigratorConfig, DEFAULT_TABLE_NAME};
pub use dialect::{Dialect, UnknownDialect};
pub use error::{BoxError, ConstructionError, ExecutionStage, MigrateError, MigrateResult, Phase};
pub use migrator::{Migrator, MigratorBuilder};
pub use reporter::Reporter;
pub use step::{Direction, FnAction, MigrationAction, MigrationStep, SqlAction};
pub use summary::{MigrationRunResult, MigrationStatus, RollbackResult};
pub use tracker::Tracker;

/// Target used by every `tracing` event this crate emits
pub const TRACING_TARGET: &str = "stepwise_migrate::migrate";
