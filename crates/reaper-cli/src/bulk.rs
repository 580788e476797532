//! Best-effort sweeps applying one transition across a collection.
//!
//! # Design
//! - Targets are processed strictly in the order they were listed, one request
//!   at a time.
//! - Each item yields a tagged outcome; a failure never stops the sweep.
//! - Sweeps do not roll back, so a partial failure leaves the cluster mixed and
//!   the per-item lines are the operator's record of what happened.

use anyhow::anyhow;
use reaper_api_models::{RepairRun, RepairSchedule};

use crate::actions::Action;
use crate::client::{AppContext, CliError, CliResult};
use crate::service::ServiceError;

/// Entity a sweep acts on, with enough context for a progress line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SweepTarget {
    pub(crate) id: String,
    pub(crate) keyspace: String,
}

impl From<&RepairSchedule> for SweepTarget {
    fn from(schedule: &RepairSchedule) -> Self {
        Self {
            id: schedule.id.clone(),
            keyspace: schedule.keyspace_name.clone(),
        }
    }
}

impl From<&RepairRun> for SweepTarget {
    fn from(repair: &RepairRun) -> Self {
        Self {
            id: repair.id.clone(),
            keyspace: repair.keyspace_name.clone(),
        }
    }
}

/// Result of applying the sweep's action to one target.
#[derive(Debug)]
pub(crate) struct SweepOutcome {
    pub(crate) target: SweepTarget,
    pub(crate) action: Action,
    pub(crate) result: Result<(), ServiceError>,
}

impl SweepOutcome {
    pub(crate) const fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Ordered outcomes of one or more sweeps.
#[derive(Debug, Default)]
pub(crate) struct SweepReport {
    pub(crate) outcomes: Vec<SweepOutcome>,
}

impl SweepReport {
    pub(crate) fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub(crate) fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.succeeded())
            .count()
    }

    /// Append the outcomes of a later sweep.
    pub(crate) fn merge(&mut self, other: Self) {
        self.outcomes.extend(other.outcomes);
    }

    /// Convert the report into the command's result once every sweep ran.
    pub(crate) fn into_result(self) -> CliResult<()> {
        let failures: Vec<String> = self
            .outcomes
            .iter()
            .filter(|outcome| !outcome.succeeded())
            .map(|outcome| {
                format!(
                    "{} {} {}",
                    outcome.action.verb(),
                    outcome.action.noun(),
                    outcome.target.id
                )
            })
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CliError::failure(anyhow!(
                "{} of {} operations failed: {}",
                failures.len(),
                self.attempted(),
                failures.join(", ")
            )))
        }
    }
}

/// Apply `action` to every target, in order, continuing past failures.
///
/// `empty_notice` is reported instead when there is nothing to do; no request
/// is issued in that case.
pub(crate) async fn sweep(
    ctx: &AppContext,
    action: Action,
    targets: Vec<SweepTarget>,
    empty_notice: &str,
) -> SweepReport {
    if targets.is_empty() {
        ctx.reporter.info(empty_notice);
        return SweepReport::default();
    }

    let mut report = SweepReport {
        outcomes: Vec::with_capacity(targets.len()),
    };
    for target in targets {
        ctx.reporter.info(&format!(
            "{} {} keyspace {}...",
            action.progressive(),
            target.keyspace,
            action.noun()
        ));
        let result = action.apply(ctx.service.as_ref(), &target.id).await;
        match &result {
            Ok(()) => ctx.reporter.info(&format!(
                "{} keyspace {} {} ({})",
                target.keyspace,
                action.noun(),
                action.past(),
                target.id
            )),
            Err(err) => ctx.reporter.error(&format!(
                "failed to {} {} keyspace {} ({}): {err}",
                action.verb(),
                target.keyspace,
                action.noun(),
                target.id
            )),
        }
        report.outcomes.push(SweepOutcome {
            target,
            action,
            result,
        });
    }

    let failed = report.failed();
    if failed > 0 {
        ctx.reporter.warn(&format!(
            "{failed} of {} {} operations failed",
            report.attempted(),
            action.noun()
        ));
    }
    report
}
