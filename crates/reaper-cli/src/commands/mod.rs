//! Command handlers grouped by the entity they act on.

pub(crate) mod clusters;
pub(crate) mod repairs;
pub(crate) mod schedules;
