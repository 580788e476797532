use chrono::Utc;
use reaper_api_models::RepairState;

use crate::actions::{Action, RepairAction};
use crate::cli::{ListingFlags, SegmentListArgs};
use crate::client::{AppContext, CliResult};
use crate::output::{ListingColumns, SegmentColumns, render_repairs, render_segments, to_json};
use crate::state::{check_repair, repair_subject};

pub(crate) async fn handle_repair_list(
    ctx: &AppContext,
    cluster: Option<&str>,
    states: &[RepairState],
    flags: ListingFlags,
) -> CliResult<()> {
    let repairs = ctx.service.list_repairs(cluster, states).await?;
    let rendered = render_repairs(
        repairs,
        ListingColumns::for_request(cluster, flags.show_id),
        flags.format(),
    )?;
    println!("{rendered}");
    Ok(())
}

pub(crate) async fn handle_repair_info(ctx: &AppContext, id: &str) -> CliResult<()> {
    let repair = ctx.service.get_repair(id).await?;
    println!("{}", to_json(&repair)?);
    Ok(())
}

/// Fetch the repair, apply the local gate, then request the transition.
pub(crate) async fn handle_repair_action(
    ctx: &AppContext,
    id: &str,
    action: RepairAction,
) -> CliResult<()> {
    let repair = ctx.service.get_repair(id).await?;
    check_repair(&repair, action)?;

    let subject = repair_subject(&repair);
    match action {
        RepairAction::ChangeIntensity(intensity) => ctx.reporter.info(&format!(
            "{} {subject} from {} to {intensity}...",
            action.progressive(),
            repair.intensity
        )),
        _ => ctx
            .reporter
            .info(&format!("{} {subject}...", action.progressive())),
    }
    Action::from(action)
        .apply(ctx.service.as_ref(), &repair.id)
        .await?;
    ctx.reporter.info(&format!("{subject} {}", action.past()));
    Ok(())
}

pub(crate) async fn handle_segment_list(ctx: &AppContext, args: &SegmentListArgs) -> CliResult<()> {
    let segments = ctx.service.list_segments(&args.id).await?;
    let rendered = render_segments(
        segments,
        SegmentColumns {
            id: args.show_id,
            token_ranges: args.show_token_ranges,
        },
        args.format(),
        Utc::now().timestamp_millis(),
    )?;
    println!("{rendered}");
    Ok(())
}

/// Request the abort directly; the service alone decides whether the segment
/// can still be aborted.
pub(crate) async fn handle_segment_abort(
    ctx: &AppContext,
    repair_id: &str,
    segment_id: &str,
) -> CliResult<()> {
    ctx.reporter
        .info(&format!("Aborting segment {segment_id} of repair {repair_id}..."));
    ctx.service.abort_segment(repair_id, segment_id).await?;
    ctx.reporter
        .info(&format!("segment {segment_id} of repair {repair_id} aborted"));
    Ok(())
}
