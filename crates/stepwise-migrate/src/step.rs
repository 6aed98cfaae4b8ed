//! Migration steps and the actions they run
//!
//! A step is an id plus an apply action and an optional reverse action. Both
//! actions receive the connection of the transaction the executor opened for
//! the step, so whatever they do commits or rolls back together with the
//! tracker row.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::{AnyConnection, Executor};

use crate::error::ConstructionError;

/// Direction of a step's action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Work performed by one direction of a migration step
///
/// The connection belongs to an open transaction; implementations must not
/// commit or roll it back themselves.
#[async_trait]
pub trait MigrationAction: Send + Sync {
    async fn run(&self, conn: &mut AnyConnection) -> anyhow::Result<()>;
}

/// Executes a literal SQL text verbatim
///
/// The text is sent without bind parameters, so it may hold several
/// statements separated by semicolons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlAction {
    sql: String,
}

impl SqlAction {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

#[async_trait]
impl MigrationAction for SqlAction {
    async fn run(&self, conn: &mut AnyConnection) -> anyhow::Result<()> {
        conn.execute(self.sql.as_str()).await?;
        Ok(())
    }
}

type ActionFn =
    dyn for<'c> Fn(&'c mut AnyConnection) -> BoxFuture<'c, anyhow::Result<()>> + Send + Sync;

/// Adapts a closure into a [`MigrationAction`]
///
/// ```no_run
/// use sqlx::Executor;
/// use stepwise_migrate::{FnAction, MigrationStep};
///
/// let step = MigrationStep::new(
///     "003_seed_roles",
///     FnAction::new(|conn| {
///         Box::pin(async move {
///             conn.execute("INSERT INTO roles (name) VALUES ('admin')").await?;
///             Ok(())
///         })
///     }),
/// );
/// assert!(!step.has_reverse());
/// ```
pub struct FnAction {
    f: Box<ActionFn>,
}

impl FnAction {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'c> Fn(&'c mut AnyConnection) -> BoxFuture<'c, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Self { f: Box::new(f) }
    }
}

#[async_trait]
impl MigrationAction for FnAction {
    async fn run(&self, conn: &mut AnyConnection) -> anyhow::Result<()> {
        (self.f)(conn).await
    }
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnAction")
    }
}

/// A named, ordered unit of schema change
///
/// A step without an apply action only records its id when applied. A step
/// without a reverse action is left alone by rollback.
#[derive(Clone)]
pub struct MigrationStep {
    id: String,
    apply: Option<Arc<dyn MigrationAction>>,
    reverse: Option<Arc<dyn MigrationAction>>,
}

impl MigrationStep {
    /// Create a step with an apply action and no reverse action
    pub fn new(id: impl Into<String>, apply: impl MigrationAction + 'static) -> Self {
        Self {
            id: id.into(),
            apply: Some(Arc::new(apply)),
            reverse: None,
        }
    }

    /// Attach a reverse action
    pub fn with_reverse(mut self, reverse: impl MigrationAction + 'static) -> Self {
        self.reverse = Some(Arc::new(reverse));
        self
    }

    /// Create a step that runs SQL text; an empty text means no action for
    /// that direction
    pub fn query(id: impl Into<String>, up_sql: &str, down_sql: &str) -> Self {
        Self {
            id: id.into(),
            apply: sql_action(up_sql),
            reverse: sql_action(down_sql),
        }
    }

    /// Create a step whose SQL is read from files now, not at apply time
    ///
    /// An empty path means no action for that direction. A file that cannot
    /// be read fails construction.
    pub fn file(
        id: impl Into<String>,
        up_path: impl AsRef<Path>,
        down_path: impl AsRef<Path>,
    ) -> Result<Self, ConstructionError> {
        let id = id.into();
        let apply = file_action(&id, Direction::Up, up_path.as_ref())?;
        let reverse = file_action(&id, Direction::Down, down_path.as_ref())?;
        Ok(Self { id, apply, reverse })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_apply(&self) -> bool {
        self.apply.is_some()
    }

    pub fn has_reverse(&self) -> bool {
        self.reverse.is_some()
    }

    pub(crate) fn action(&self, direction: Direction) -> Option<&Arc<dyn MigrationAction>> {
        match direction {
            Direction::Up => self.apply.as_ref(),
            Direction::Down => self.reverse.as_ref(),
        }
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("id", &self.id)
            .field("has_apply", &self.has_apply())
            .field("has_reverse", &self.has_reverse())
            .finish()
    }
}

fn sql_action(sql: &str) -> Option<Arc<dyn MigrationAction>> {
    if sql.is_empty() {
        return None;
    }
    Some(Arc::new(SqlAction::new(sql)))
}

fn file_action(
    id: &str,
    direction: Direction,
    path: &Path,
) -> Result<Option<Arc<dyn MigrationAction>>, ConstructionError> {
    if path.as_os_str().is_empty() {
        return Ok(None);
    }

    let sql = fs::read_to_string(path).map_err(|source| ConstructionError::ReadFile {
        id: id.to_string(),
        direction,
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(Arc::new(SqlAction::new(sql))))
}
