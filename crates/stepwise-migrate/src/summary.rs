//! Outcomes of migration runs and status queries

use serde::Serialize;

/// Result of applying migrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRunResult {
    /// IDs of migrations applied by this run, in execution order
    pub applied_migrations: Vec<String>,
    /// IDs of migrations that were already applied
    pub skipped_migrations: Vec<String>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

impl MigrationRunResult {
    pub fn applied_count(&self) -> usize {
        self.applied_migrations.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_migrations.len()
    }

    /// True when the run found nothing to apply
    pub fn is_no_op(&self) -> bool {
        self.applied_migrations.is_empty()
    }
}

/// Result of rolling back migrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackResult {
    /// IDs of migrations reversed by this run, in execution order
    pub rolled_back_migrations: Vec<String>,
    /// IDs skipped because they were not applied or have no reverse action
    pub skipped_migrations: Vec<String>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

impl RollbackResult {
    pub fn rolled_back_count(&self) -> usize {
        self.rolled_back_migrations.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_migrations.len()
    }

    pub fn is_no_op(&self) -> bool {
        self.rolled_back_migrations.is_empty()
    }
}

/// Applied and pending steps of a registry, both in declared order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }

    /// Share of registry steps already applied, from 0.0 to 1.0
    pub fn progress_ratio(&self) -> f64 {
        let total = self.applied.len() + self.pending.len();
        if total == 0 {
            1.0
        } else {
            self.applied.len() as f64 / total as f64
        }
    }

    pub fn last_applied(&self) -> Option<&str> {
        self.applied.last().map(String::as_str)
    }

    pub fn next_pending(&self) -> Option<&str> {
        self.pending.first().map(String::as_str)
    }
}
