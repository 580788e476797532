//! Cluster listings and the cluster-wide bulk verbs.
//!
//! Every bulk verb lists its targets first (a listing failure aborts the
//! command), sweeps them with [`sweep`], and only turns recorded failures into
//! an error once every sweep of the verb has run.

use reaper_api_models::RepairState;

use crate::actions::{RepairAction, ScheduleAction};
use crate::bulk::{SweepReport, SweepTarget, sweep};
use crate::cli::OutputFormat;
use crate::client::{AppContext, CliResult};
use crate::output::{render_cluster_tables, render_clusters};

pub(crate) async fn handle_cluster_list(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let clusters = ctx.service.list_clusters().await?;
    println!("{}", render_clusters(clusters, format)?);
    Ok(())
}

pub(crate) async fn handle_cluster_table_list(
    ctx: &AppContext,
    cluster: &str,
    keyspace: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    let tables = ctx.service.cluster_tables(cluster).await?;
    println!("{}", render_cluster_tables(&tables, keyspace, format)?);
    Ok(())
}

/// Enable or disable every schedule of the cluster.
pub(crate) async fn handle_cluster_schedule_toggle(
    ctx: &AppContext,
    cluster: &str,
    action: ScheduleAction,
) -> CliResult<()> {
    schedule_sweep(ctx, cluster, action).await?.into_result()
}

/// Disable every schedule, re-read them, then delete what was listed.
///
/// The re-read states are not checked again before deleting; a schedule that
/// another client re-enabled in between is rejected by the service and
/// recorded as a failed item.
pub(crate) async fn handle_cluster_schedule_delete(ctx: &AppContext, cluster: &str) -> CliResult<()> {
    let mut report = schedule_sweep(ctx, cluster, ScheduleAction::Disable).await?;
    report.merge(schedule_sweep(ctx, cluster, ScheduleAction::Delete).await?);
    report.into_result()
}

pub(crate) async fn handle_cluster_repair_action(
    ctx: &AppContext,
    cluster: &str,
    action: RepairAction,
) -> CliResult<()> {
    repair_sweep(ctx, cluster, action).await?.into_result()
}

/// Enable every schedule, then resume every paused repair.
pub(crate) async fn handle_cluster_enable(ctx: &AppContext, cluster: &str) -> CliResult<()> {
    ctx.reporter.info(&format!("Enabling {cluster} cluster"));
    let mut report = schedule_sweep(ctx, cluster, ScheduleAction::Enable).await?;
    report.merge(repair_sweep(ctx, cluster, RepairAction::Resume).await?);
    report.into_result()
}

/// Disable every schedule, then pause every running repair.
pub(crate) async fn handle_cluster_disable(ctx: &AppContext, cluster: &str) -> CliResult<()> {
    ctx.reporter.info(&format!("Disabling {cluster} cluster"));
    let mut report = schedule_sweep(ctx, cluster, ScheduleAction::Disable).await?;
    report.merge(repair_sweep(ctx, cluster, RepairAction::Pause).await?);
    report.into_result()
}

async fn schedule_sweep(
    ctx: &AppContext,
    cluster: &str,
    action: ScheduleAction,
) -> CliResult<SweepReport> {
    let schedules = ctx.service.list_schedules(Some(cluster)).await?;
    let targets = schedules.iter().map(SweepTarget::from).collect();
    let notice = format!("No repair schedules of {cluster} cluster");
    Ok(sweep(ctx, action.into(), targets, &notice).await)
}

async fn repair_sweep(
    ctx: &AppContext,
    cluster: &str,
    action: RepairAction,
) -> CliResult<SweepReport> {
    let (states, label) = repair_targets(action);
    let repairs = ctx.service.list_repairs(Some(cluster), states).await?;
    let targets = repairs.iter().map(SweepTarget::from).collect();
    let notice = if label.is_empty() {
        format!("No repairs of {cluster} cluster")
    } else {
        format!("No {label} repairs of {cluster} cluster")
    };
    Ok(sweep(ctx, action.into(), targets, &notice).await)
}

const RUNNING: &[RepairState] = &[RepairState::Running];
const PAUSED: &[RepairState] = &[RepairState::Paused];
const RUNNING_OR_PAUSED: &[RepairState] = &[RepairState::Running, RepairState::Paused];
const EVERY_STATE: &[RepairState] = &[];

/// Repair states a bulk action applies to, with the label used when nothing
/// matches. An empty state set selects every repair.
const fn repair_targets(action: RepairAction) -> (&'static [RepairState], &'static str) {
    match action {
        RepairAction::Pause => (RUNNING, "running"),
        RepairAction::Resume => (PAUSED, "paused"),
        RepairAction::Abort => (RUNNING_OR_PAUSED, "running or paused"),
        RepairAction::Delete | RepairAction::ChangeIntensity(_) => (EVERY_STATE, ""),
    }
}
