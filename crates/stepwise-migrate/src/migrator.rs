//! Migrator - applies and rolls back an ordered registry of steps
//!
//! Steps run strictly one after another, each in its own transaction. The
//! first failure stops the sequence; steps committed before it stay applied.
//!
//! Two runners pointed at the same database are not coordinated. The lookup
//! before each insert is not locked, so the primary key on the tracker table
//! is the only thing that stops a step from being applied twice.

use std::collections::HashSet;
use std::time::Instant;

use sqlx::AnyPool;

use crate::config::MigratorConfig;
use crate::dialect::Dialect;
use crate::error::{ConstructionError, MigrateError, MigrateResult, Phase};
use crate::executor;
use crate::reporter::Reporter;
use crate::step::MigrationStep;
use crate::summary::{MigrationRunResult, MigrationStatus, RollbackResult};
use crate::tracker::Tracker;
use crate::TRACING_TARGET;

/// Ordered migration registry plus the configuration used to run it
#[derive(Debug, Clone)]
pub struct Migrator {
    steps: Vec<MigrationStep>,
    config: MigratorConfig,
}

impl Migrator {
    /// Create a migrator with the default configuration
    pub fn new(steps: Vec<MigrationStep>) -> Result<Self, ConstructionError> {
        Self::with_config(steps, MigratorConfig::default())
    }

    /// Create a migrator, rejecting duplicate step ids and unsafe table names
    pub fn with_config(
        steps: Vec<MigrationStep>,
        config: MigratorConfig,
    ) -> Result<Self, ConstructionError> {
        config.validate()?;

        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id()) {
                return Err(ConstructionError::DuplicateId(step.id().to_string()));
            }
        }

        Ok(Self { steps, config })
    }

    pub fn builder() -> MigratorBuilder {
        MigratorBuilder::default()
    }

    /// Steps in declared order
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Apply every step not yet recorded, in declared order
    pub async fn apply(
        &self,
        pool: &AnyPool,
        dialect: Dialect,
    ) -> MigrateResult<MigrationRunResult> {
        let start_time = Instant::now();
        let tracker = self.ensure_tracker(pool, dialect).await?;

        tracing::info!(
            target: TRACING_TARGET,
            steps = self.steps.len(),
            %dialect,
            "Applying migrations"
        );

        let mut applied_migrations = Vec::new();
        let mut skipped_migrations = Vec::new();

        for step in &self.steps {
            let id = step.id();

            if self.lookup(pool, &tracker, id, Phase::Apply).await? {
                self.report(format_args!("Skipping migration: {}", id));
                skipped_migrations.push(id.to_string());
                continue;
            }

            self.report(format_args!("Running migration: {}", id));
            if let Err(e) = executor::run_apply(pool, &tracker, step).await {
                tracing::error!(target: TRACING_TARGET, id, "Migration failed: {}", e);
                return Err(e);
            }
            applied_migrations.push(id.to_string());
        }

        let result = MigrationRunResult {
            applied_migrations,
            skipped_migrations,
            execution_time_ms: start_time.elapsed().as_millis(),
        };

        tracing::info!(
            target: TRACING_TARGET,
            applied = result.applied_count(),
            skipped = result.skipped_count(),
            elapsed_ms = result.execution_time_ms,
            "Migrations applied"
        );

        Ok(result)
    }

    /// Reverse every recorded step that has a reverse action, last first
    pub async fn rollback(
        &self,
        pool: &AnyPool,
        dialect: Dialect,
    ) -> MigrateResult<RollbackResult> {
        let start_time = Instant::now();
        let tracker = self.ensure_tracker(pool, dialect).await?;

        tracing::info!(
            target: TRACING_TARGET,
            steps = self.steps.len(),
            %dialect,
            "Rolling back migrations"
        );

        let mut rolled_back_migrations = Vec::new();
        let mut skipped_migrations = Vec::new();

        for step in self.steps.iter().rev() {
            let id = step.id();

            if !step.has_reverse() {
                self.report(format_args!("Rollback not provided: {}", id));
                skipped_migrations.push(id.to_string());
                continue;
            }

            if !self.lookup(pool, &tracker, id, Phase::Rollback).await? {
                self.report(format_args!("Skipping rollback: {}", id));
                skipped_migrations.push(id.to_string());
                continue;
            }

            self.report(format_args!("Running rollback: {}", id));
            if let Err(e) = executor::run_reverse(pool, &tracker, step).await {
                tracing::error!(target: TRACING_TARGET, id, "Rollback failed: {}", e);
                return Err(e);
            }
            rolled_back_migrations.push(id.to_string());
        }

        let result = RollbackResult {
            rolled_back_migrations,
            skipped_migrations,
            execution_time_ms: start_time.elapsed().as_millis(),
        };

        tracing::info!(
            target: TRACING_TARGET,
            rolled_back = result.rolled_back_count(),
            skipped = result.skipped_count(),
            elapsed_ms = result.execution_time_ms,
            "Migrations rolled back"
        );

        Ok(result)
    }

    /// Split the registry into applied and pending steps
    pub async fn status(&self, pool: &AnyPool, dialect: Dialect) -> MigrateResult<MigrationStatus> {
        let tracker = self.ensure_tracker(pool, dialect).await?;

        let mut applied = Vec::new();
        let mut pending = Vec::new();
        for step in &self.steps {
            let id = step.id().to_string();
            if self.lookup(pool, &tracker, &id, Phase::Status).await? {
                applied.push(id);
            } else {
                pending.push(id);
            }
        }

        Ok(MigrationStatus { applied, pending })
    }

    /// Every id recorded in the tracker, including ids unknown to this registry
    pub async fn applied_ids(
        &self,
        pool: &AnyPool,
        dialect: Dialect,
    ) -> MigrateResult<Vec<String>> {
        let tracker = self.ensure_tracker(pool, dialect).await?;
        tracker
            .applied_ids(pool)
            .await
            .map_err(|source| MigrateError::ListApplied {
                table: tracker.table().to_string(),
                source,
            })
    }

    async fn ensure_tracker(&self, pool: &AnyPool, dialect: Dialect) -> MigrateResult<Tracker> {
        let tracker = Tracker::new(self.config.table_name.clone(), dialect)?;

        self.report(format_args!("Creating/checking {} table...", tracker.table()));
        tracker.ensure_table(pool).await.map_err(|source| {
            tracing::error!(
                target: TRACING_TARGET,
                table = tracker.table(),
                "Failed to create tracker table: {}",
                source
            );
            MigrateError::TrackerSetup {
                table: tracker.table().to_string(),
                source,
            }
        })?;

        Ok(tracker)
    }

    async fn lookup(
        &self,
        pool: &AnyPool,
        tracker: &Tracker,
        id: &str,
        phase: Phase,
    ) -> MigrateResult<bool> {
        let found = tracker
            .is_applied(pool, id)
            .await
            .map_err(|source| MigrateError::Lookup {
                phase,
                id: id.to_string(),
                source,
            })?;

        tracing::debug!(target: TRACING_TARGET, %phase, id, found, "Looked up step");
        Ok(found)
    }

    fn report(&self, args: std::fmt::Arguments<'_>) {
        self.config.reporter.report(args);
    }
}

/// Builder for [`Migrator`]
#[derive(Debug, Default)]
pub struct MigratorBuilder {
    steps: Vec<MigrationStep>,
    config: MigratorConfig,
}

impl MigratorBuilder {
    /// Append a step to the registry
    pub fn step(mut self, step: MigrationStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = MigrationStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.config.table_name = table_name.into();
        self
    }

    pub fn reporter(mut self, reporter: Reporter) -> Self {
        self.config.reporter = reporter;
        self
    }

    pub fn build(self) -> Result<Migrator, ConstructionError> {
        Migrator::with_config(self.steps, self.config)
    }
}
