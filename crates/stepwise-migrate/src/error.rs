//! Error types for the migration runner
//!
//! Every runtime failure carries the id of the step that was being processed
//! and the phase (apply or rollback) it happened in. Construction failures are
//! kept in their own enum because they happen before any database is touched.

use std::fmt;
use std::path::PathBuf;

use crate::step::Direction;

/// Result type alias for migration operations
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Boxed error produced by a step action
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which sequence an error was raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Apply,
    Rollback,
    Status,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Apply => write!(f, "migration"),
            Phase::Rollback => write!(f, "rollback"),
            Phase::Status => write!(f, "status"),
        }
    }
}

/// The point inside a step's transaction where execution failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStage {
    /// The transaction could not be started
    Begin,
    /// Inserting or deleting the tracker row failed
    Bookkeeping,
    /// The step's own action failed
    Action,
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStage::Begin => write!(f, "beginning transaction"),
            ExecutionStage::Bookkeeping => write!(f, "updating tracker"),
            ExecutionStage::Action => write!(f, "executing action"),
        }
    }
}

/// Errors raised while applying or rolling back migrations
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("creating {table} table: {source}")]
    TrackerSetup {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("listing applied ids from {table}: {source}")]
    ListApplied {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("looking up {phase} by id {id}: {source}")]
    Lookup {
        phase: Phase,
        id: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("running {phase} {id}: {stage}: {source}")]
    Execution {
        phase: Phase,
        id: String,
        stage: ExecutionStage,
        #[source]
        source: BoxError,
    },

    #[error("running {phase} {id}: committing: {source}")]
    Commit {
        phase: Phase,
        id: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

impl MigrateError {
    /// Id of the step being processed when the error happened, if any
    pub fn step_id(&self) -> Option<&str> {
        match self {
            MigrateError::Lookup { id, .. }
            | MigrateError::Execution { id, .. }
            | MigrateError::Commit { id, .. } => Some(id.as_str()),
            MigrateError::Construction(ConstructionError::ReadFile { id, .. }) => Some(id.as_str()),
            MigrateError::Construction(ConstructionError::DuplicateId(id)) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Phase the error was raised from, if it happened at run time
    pub fn phase(&self) -> Option<Phase> {
        match self {
            MigrateError::Lookup { phase, .. }
            | MigrateError::Execution { phase, .. }
            | MigrateError::Commit { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Errors raised while building steps or a migrator
///
/// These are startup faults: a registry that fails to build must not be run.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("reading {direction} sql for migration {id} from {}: {source}", .path.display())]
    ReadFile {
        id: String,
        direction: Direction,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate migration id: {0}")]
    DuplicateId(String),

    #[error("invalid migrations table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },
}
