//! Capability boundary towards the remote repair service.
//!
//! Commands, the bulk orchestrator and the renderers only see this trait; the
//! HTTP implementation lives in `client.rs` and tests substitute an in-memory
//! fake.

use async_trait::async_trait;
use reaper_api_models::{
    ClusterTables, Intensity, RepairRun, RepairSchedule, RepairSegment, RepairState,
};
use thiserror::Error;

/// Failure of a single call against the repair service.
#[derive(Debug, Error)]
pub(crate) enum ServiceError {
    /// The service answered with a non-success status.
    #[error("{operation} rejected with status {status}: {message}")]
    Rejected {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, or the canonical reason when the body is empty.
        message: String,
    },
    /// The request never produced a response.
    #[error("{operation} request failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The response payload did not match the expected record.
    #[error("{operation} returned an unreadable payload")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying decoding failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The configured base URL cannot carry path segments.
    #[error("base URL cannot be used for {operation}")]
    InvalidBaseUrl {
        /// Operation identifier.
        operation: &'static str,
    },
}

/// Convenience alias for repair service results.
pub(crate) type ServiceResult<T> = Result<T, ServiceError>;

/// Operations exposed by the repair service.
///
/// Transitions return no payload; legality of everything except the locally
/// gated transitions is decided by the service.
#[async_trait]
pub(crate) trait RepairService: Send + Sync {
    /// Names of the registered clusters.
    async fn list_clusters(&self) -> ServiceResult<Vec<String>>;

    /// Keyspaces and tables of a cluster.
    async fn cluster_tables(&self, cluster: &str) -> ServiceResult<ClusterTables>;

    /// Repair schedules, optionally restricted to one cluster.
    async fn list_schedules(&self, cluster: Option<&str>) -> ServiceResult<Vec<RepairSchedule>>;

    /// Fetch a single schedule.
    async fn get_schedule(&self, id: &str) -> ServiceResult<RepairSchedule>;

    /// Move a schedule to `ACTIVE`.
    async fn enable_schedule(&self, id: &str) -> ServiceResult<()>;

    /// Move a schedule to `PAUSED`.
    async fn disable_schedule(&self, id: &str) -> ServiceResult<()>;

    /// Trigger a schedule immediately.
    async fn start_schedule(&self, id: &str) -> ServiceResult<()>;

    /// Remove a schedule.
    async fn delete_schedule(&self, id: &str) -> ServiceResult<()>;

    /// Repair runs, optionally restricted to one cluster and a set of states.
    /// An empty state set applies no state filter.
    async fn list_repairs(
        &self,
        cluster: Option<&str>,
        states: &[RepairState],
    ) -> ServiceResult<Vec<RepairRun>>;

    /// Fetch a single repair run.
    async fn get_repair(&self, id: &str) -> ServiceResult<RepairRun>;

    /// Suspend a running repair.
    async fn pause_repair(&self, id: &str) -> ServiceResult<()>;

    /// Resume a paused repair.
    async fn resume_repair(&self, id: &str) -> ServiceResult<()>;

    /// Abort a repair.
    async fn abort_repair(&self, id: &str) -> ServiceResult<()>;

    /// Remove a repair run.
    async fn delete_repair(&self, id: &str) -> ServiceResult<()>;

    /// Update the throttling factor of a repair.
    async fn change_repair_intensity(&self, id: &str, intensity: Intensity)
    -> ServiceResult<()>;

    /// Segments of a repair run.
    async fn list_segments(&self, repair_id: &str) -> ServiceResult<Vec<RepairSegment>>;

    /// Abort a running segment, returning it to `NOT_STARTED`.
    async fn abort_segment(&self, repair_id: &str, segment_id: &str) -> ServiceResult<()>;
}
