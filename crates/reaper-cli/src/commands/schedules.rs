use crate::actions::{Action, ScheduleAction};
use crate::cli::ListingFlags;
use crate::client::{AppContext, CliResult};
use crate::output::{ListingColumns, render_schedules, to_json};
use crate::state::{check_schedule, schedule_subject};

pub(crate) async fn handle_schedule_list(
    ctx: &AppContext,
    cluster: Option<&str>,
    flags: ListingFlags,
) -> CliResult<()> {
    let schedules = ctx.service.list_schedules(cluster).await?;
    let rendered = render_schedules(
        schedules,
        ListingColumns::for_request(cluster, flags.show_id),
        flags.format(),
    )?;
    println!("{rendered}");
    Ok(())
}

pub(crate) async fn handle_schedule_info(ctx: &AppContext, id: &str) -> CliResult<()> {
    let schedule = ctx.service.get_schedule(id).await?;
    println!("{}", to_json(&schedule)?);
    Ok(())
}

/// Fetch the schedule, apply the local gate, then request the transition.
pub(crate) async fn handle_schedule_action(
    ctx: &AppContext,
    id: &str,
    action: ScheduleAction,
) -> CliResult<()> {
    let schedule = ctx.service.get_schedule(id).await?;
    check_schedule(&schedule, action)?;

    let subject = schedule_subject(&schedule);
    ctx.reporter
        .info(&format!("{} {subject}...", action.progressive()));
    Action::from(action)
        .apply(ctx.service.as_ref(), &schedule.id)
        .await?;
    ctx.reporter.info(&format!("{subject} {}", action.past()));
    Ok(())
}
