//! Runs a single step inside its own transaction
//!
//! The tracker row mutation comes first, then the step's action. Both share
//! one transaction, so a step is either fully applied (row present, schema
//! changed) or not at all.

use sqlx::{Any, AnyPool, Transaction};

use crate::error::{BoxError, ExecutionStage, MigrateError, MigrateResult, Phase};
use crate::step::{Direction, MigrationStep};
use crate::tracker::Tracker;
use crate::TRACING_TARGET;

/// Record the step as applied and run its apply action
pub(crate) async fn run_apply(
    pool: &AnyPool,
    tracker: &Tracker,
    step: &MigrationStep,
) -> MigrateResult<()> {
    run_step(pool, tracker, step, Direction::Up).await
}

/// Remove the step's tracker row and run its reverse action
pub(crate) async fn run_reverse(
    pool: &AnyPool,
    tracker: &Tracker,
    step: &MigrationStep,
) -> MigrateResult<()> {
    run_step(pool, tracker, step, Direction::Down).await
}

async fn run_step(
    pool: &AnyPool,
    tracker: &Tracker,
    step: &MigrationStep,
    direction: Direction,
) -> MigrateResult<()> {
    let id = step.id();
    let phase = match direction {
        Direction::Up => Phase::Apply,
        Direction::Down => Phase::Rollback,
    };
    let execution_error = |stage: ExecutionStage, source: BoxError| MigrateError::Execution {
        phase,
        id: id.to_string(),
        stage,
        source,
    };

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| execution_error(ExecutionStage::Begin, e.into()))?;

    let bookkeeping = match direction {
        Direction::Up => tracker.record(&mut *tx, id).await,
        Direction::Down => tracker.remove(&mut *tx, id).await,
    };
    if let Err(e) = bookkeeping {
        abort(tx, phase, id).await;
        return Err(execution_error(ExecutionStage::Bookkeeping, e.into()));
    }

    if let Some(action) = step.action(direction) {
        if let Err(e) = action.run(&mut *tx).await {
            abort(tx, phase, id).await;
            return Err(execution_error(ExecutionStage::Action, e.into()));
        }
    }

    tx.commit().await.map_err(|source| MigrateError::Commit {
        phase,
        id: id.to_string(),
        source,
    })?;

    tracing::debug!(target: TRACING_TARGET, %phase, id, "Committed step");
    Ok(())
}

async fn abort(tx: Transaction<'static, Any>, phase: Phase, id: &str) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(
            target: TRACING_TARGET,
            %phase,
            id,
            "Failed to roll back transaction: {}",
            e
        );
    }
}
