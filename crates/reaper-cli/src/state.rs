//! Local state gates evaluated before a transition is requested.
//!
//! Only two transitions are gated here: deleting a schedule and changing a
//! repair's intensity both require `PAUSED`. Everything else is sent as-is and
//! the service's verdict is surfaced verbatim.

use reaper_api_models::{RepairRun, RepairSchedule, RepairState, ScheduleState};
use thiserror::Error;

use crate::actions::{RepairAction, ScheduleAction};

/// A transition was refused locally because the entity is in the wrong state.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("can't {verb} {subject} because it's {actual}; it must be {required} first")]
pub(crate) struct PreconditionFailed {
    /// Verb of the refused transition.
    pub(crate) verb: &'static str,
    /// Human-readable entity description.
    pub(crate) subject: String,
    /// State the transition requires.
    pub(crate) required: &'static str,
    /// State the entity is in.
    pub(crate) actual: &'static str,
}

/// State a schedule must be in for `action`, if any.
pub(crate) const fn schedule_requirement(action: ScheduleAction) -> Option<ScheduleState> {
    match action {
        ScheduleAction::Delete => Some(ScheduleState::Paused),
        ScheduleAction::Enable | ScheduleAction::Disable | ScheduleAction::Start => None,
    }
}

/// State a repair must be in for `action`, if any.
pub(crate) const fn repair_requirement(action: RepairAction) -> Option<RepairState> {
    match action {
        RepairAction::ChangeIntensity(_) => Some(RepairState::Paused),
        RepairAction::Pause | RepairAction::Resume | RepairAction::Abort | RepairAction::Delete => {
            None
        }
    }
}

/// Check whether `action` may be requested for `schedule`.
pub(crate) fn check_schedule(
    schedule: &RepairSchedule,
    action: ScheduleAction,
) -> Result<(), PreconditionFailed> {
    match schedule_requirement(action) {
        Some(required) if schedule.state != required => Err(PreconditionFailed {
            verb: action.verb(),
            subject: schedule_subject(schedule),
            required: required.as_str(),
            actual: schedule.state.as_str(),
        }),
        _ => Ok(()),
    }
}

/// Check whether `action` may be requested for `repair`.
pub(crate) fn check_repair(repair: &RepairRun, action: RepairAction) -> Result<(), PreconditionFailed> {
    match repair_requirement(action) {
        Some(required) if repair.state != required => Err(PreconditionFailed {
            verb: action.verb(),
            subject: repair_subject(repair),
            required: required.as_str(),
            actual: repair.state.as_str(),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn schedule_subject(schedule: &RepairSchedule) -> String {
    format!(
        "{} cluster {} keyspace repair schedule",
        schedule.cluster_name, schedule.keyspace_name
    )
}

pub(crate) fn repair_subject(repair: &RepairRun) -> String {
    format!(
        "{} cluster {} keyspace repair",
        repair.cluster_name, repair.keyspace_name
    )
}
