//! State transitions an operator can request, and how each is issued.

use reaper_api_models::Intensity;

use crate::service::{RepairService, ServiceResult};

/// Transitions on a repair schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScheduleAction {
    Enable,
    Disable,
    Start,
    Delete,
}

/// Transitions on a repair run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RepairAction {
    Pause,
    Resume,
    Abort,
    Delete,
    ChangeIntensity(Intensity),
}

/// Any transition the orchestrator can apply to a target identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Action {
    Schedule(ScheduleAction),
    Repair(RepairAction),
}

impl ScheduleAction {
    pub(crate) const fn verb(self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Start => "start",
            Self::Delete => "delete",
        }
    }

    pub(crate) const fn progressive(self) -> &'static str {
        match self {
            Self::Enable => "Enabling",
            Self::Disable => "Disabling",
            Self::Start => "Starting",
            Self::Delete => "Deleting",
        }
    }

    pub(crate) const fn past(self) -> &'static str {
        match self {
            Self::Enable => "enabled",
            Self::Disable => "disabled",
            Self::Start => "started",
            Self::Delete => "deleted",
        }
    }
}

impl RepairAction {
    pub(crate) const fn verb(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Abort => "abort",
            Self::Delete => "delete",
            Self::ChangeIntensity(_) => "change intensity of",
        }
    }

    pub(crate) const fn progressive(self) -> &'static str {
        match self {
            Self::Pause => "Pausing",
            Self::Resume => "Resuming",
            Self::Abort => "Aborting",
            Self::Delete => "Deleting",
            Self::ChangeIntensity(_) => "Changing intensity of",
        }
    }

    pub(crate) const fn past(self) -> &'static str {
        match self {
            Self::Pause => "paused",
            Self::Resume => "resumed",
            Self::Abort => "aborted",
            Self::Delete => "deleted",
            Self::ChangeIntensity(_) => "re-throttled",
        }
    }
}

impl Action {
    /// Noun for the entity the action targets.
    pub(crate) const fn noun(self) -> &'static str {
        match self {
            Self::Schedule(_) => "repair schedule",
            Self::Repair(_) => "repair",
        }
    }

    pub(crate) const fn verb(self) -> &'static str {
        match self {
            Self::Schedule(action) => action.verb(),
            Self::Repair(action) => action.verb(),
        }
    }

    pub(crate) const fn progressive(self) -> &'static str {
        match self {
            Self::Schedule(action) => action.progressive(),
            Self::Repair(action) => action.progressive(),
        }
    }

    pub(crate) const fn past(self) -> &'static str {
        match self {
            Self::Schedule(action) => action.past(),
            Self::Repair(action) => action.past(),
        }
    }

    /// Issue the transition for `id`.
    pub(crate) async fn apply(self, service: &dyn RepairService, id: &str) -> ServiceResult<()> {
        match self {
            Self::Schedule(ScheduleAction::Enable) => service.enable_schedule(id).await,
            Self::Schedule(ScheduleAction::Disable) => service.disable_schedule(id).await,
            Self::Schedule(ScheduleAction::Start) => service.start_schedule(id).await,
            Self::Schedule(ScheduleAction::Delete) => service.delete_schedule(id).await,
            Self::Repair(RepairAction::Pause) => service.pause_repair(id).await,
            Self::Repair(RepairAction::Resume) => service.resume_repair(id).await,
            Self::Repair(RepairAction::Abort) => service.abort_repair(id).await,
            Self::Repair(RepairAction::Delete) => service.delete_repair(id).await,
            Self::Repair(RepairAction::ChangeIntensity(intensity)) => {
                service.change_repair_intensity(id, intensity).await
            }
        }
    }
}

impl From<ScheduleAction> for Action {
    fn from(action: ScheduleAction) -> Self {
        Self::Schedule(action)
    }
}

impl From<RepairAction> for Action {
    fn from(action: RepairAction) -> Self {
        Self::Repair(action)
    }
}
