//! In-memory repair service and record builders shared by unit tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reaper_api_models::{
    ClusterTables, Intensity, RepairRun, RepairSchedule, RepairSegment, RepairState,
    ScheduleState,
};
use serde_json::{Map, json};

use crate::client::AppContext;
use crate::report::RecordingReporter;
use crate::service::{RepairService, ServiceError, ServiceResult};

const BASE_EPOCH_SECS: i64 = 1_704_067_200;

pub(crate) fn at(offset_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(BASE_EPOCH_SECS + offset_secs, 0).expect("valid timestamp")
}

pub(crate) fn schedule(
    id: &str,
    cluster: &str,
    keyspace: &str,
    state: ScheduleState,
    next_offset_secs: i64,
) -> RepairSchedule {
    RepairSchedule {
        id: id.to_string(),
        cluster_name: cluster.to_string(),
        keyspace_name: keyspace.to_string(),
        state,
        next_activation: at(next_offset_secs),
        extra: Map::new(),
    }
}

pub(crate) fn repair(
    id: &str,
    cluster: &str,
    keyspace: &str,
    state: RepairState,
    creation_offset_secs: i64,
) -> RepairRun {
    RepairRun {
        id: id.to_string(),
        cluster_name: cluster.to_string(),
        keyspace_name: keyspace.to_string(),
        state,
        creation_time: at(creation_offset_secs),
        end_time: None,
        estimated_time_of_arrival: None,
        segments_repaired: 3,
        total_segments: 12,
        last_event: "Triggered repair of segment".to_string(),
        intensity: 0.9,
        extra: Map::new(),
    }
}

pub(crate) fn segment(id: &str, start_time: Option<i64>, end_time: Option<i64>) -> RepairSegment {
    serde_json::from_value(json!({
        "id": id,
        "state": if end_time.is_some() { "DONE" } else { "RUNNING" },
        "failCount": 1,
        "replicas": ["10.0.0.1", "10.0.0.2"],
        "startTime": start_time,
        "endTime": end_time,
        "tokenRange": {
            "baseRange": {"start": -300, "end": 300},
            "tokenRanges": [{"start": 100, "end": 300}, {"start": -300, "end": 100}]
        }
    }))
    .expect("valid segment")
}

/// Every call issued against [`FakeReaper`], in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListClusters,
    ClusterTables(String),
    ListSchedules(Option<String>),
    GetSchedule(String),
    EnableSchedule(String),
    DisableSchedule(String),
    StartSchedule(String),
    DeleteSchedule(String),
    ListRepairs(Option<String>, Vec<RepairState>),
    GetRepair(String),
    PauseRepair(String),
    ResumeRepair(String),
    AbortRepair(String),
    DeleteRepair(String),
    ChangeIntensity(String, f64),
    ListSegments(String),
    AbortSegment(String, String),
}

impl Call {
    /// Whether the call is a state transition rather than a read.
    pub(crate) const fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::ListClusters
                | Self::ClusterTables(_)
                | Self::ListSchedules(_)
                | Self::GetSchedule(_)
                | Self::ListRepairs(..)
                | Self::GetRepair(_)
                | Self::ListSegments(_)
        )
    }
}

#[derive(Default)]
struct FakeState {
    clusters: Vec<String>,
    tables: BTreeMap<String, ClusterTables>,
    schedules: Vec<RepairSchedule>,
    repairs: Vec<RepairRun>,
    segments: BTreeMap<String, Vec<RepairSegment>>,
    failing: HashSet<String>,
    calls: Vec<Call>,
}

/// Repair service double that applies transitions to in-memory records.
#[derive(Default)]
pub(crate) struct FakeReaper {
    state: Mutex<FakeState>,
}

impl FakeReaper {
    pub(crate) fn with_schedules(self, schedules: Vec<RepairSchedule>) -> Self {
        self.lock().schedules = schedules;
        self
    }

    pub(crate) fn with_repairs(self, repairs: Vec<RepairRun>) -> Self {
        self.lock().repairs = repairs;
        self
    }

    pub(crate) fn with_segments(self, repair_id: &str, segments: Vec<RepairSegment>) -> Self {
        self.lock().segments.insert(repair_id.to_string(), segments);
        self
    }

    pub(crate) fn with_clusters(self, clusters: &[&str]) -> Self {
        self.lock().clusters = clusters.iter().map(ToString::to_string).collect();
        self
    }

    pub(crate) fn with_tables(self, cluster: &str, tables: ClusterTables) -> Self {
        self.lock().tables.insert(cluster.to_string(), tables);
        self
    }

    /// Reject every transition targeting `id`.
    pub(crate) fn failing_on(self, id: &str) -> Self {
        self.lock().failing.insert(id.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub(crate) fn schedules(&self) -> Vec<RepairSchedule> {
        self.lock().schedules.clone()
    }

    pub(crate) fn repairs(&self) -> Vec<RepairRun> {
        self.lock().repairs.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: Call) -> MutexGuard<'_, FakeState> {
        let mut state = self.lock();
        state.calls.push(call);
        state
    }

    fn transition_schedule(
        &self,
        call: Call,
        operation: &'static str,
        id: &str,
        apply: impl FnOnce(&mut Vec<RepairSchedule>, usize),
    ) -> ServiceResult<()> {
        let mut state = self.record(call);
        if state.failing.contains(id) {
            return Err(conflict(operation));
        }
        let index = state
            .schedules
            .iter()
            .position(|schedule| schedule.id == id)
            .ok_or_else(|| not_found(operation))?;
        apply(&mut state.schedules, index);
        Ok(())
    }

    fn transition_repair(
        &self,
        call: Call,
        operation: &'static str,
        id: &str,
        apply: impl FnOnce(&mut Vec<RepairRun>, usize),
    ) -> ServiceResult<()> {
        let mut state = self.record(call);
        if state.failing.contains(id) {
            return Err(conflict(operation));
        }
        let index = state
            .repairs
            .iter()
            .position(|repair| repair.id == id)
            .ok_or_else(|| not_found(operation))?;
        apply(&mut state.repairs, index);
        Ok(())
    }
}

fn conflict(operation: &'static str) -> ServiceError {
    ServiceError::Rejected {
        operation,
        status: 409,
        message: "transition refused".to_string(),
    }
}

fn not_found(operation: &'static str) -> ServiceError {
    ServiceError::Rejected {
        operation,
        status: 404,
        message: "not found".to_string(),
    }
}

#[async_trait]
impl RepairService for FakeReaper {
    async fn list_clusters(&self) -> ServiceResult<Vec<String>> {
        Ok(self.record(Call::ListClusters).clusters.clone())
    }

    async fn cluster_tables(&self, cluster: &str) -> ServiceResult<ClusterTables> {
        let state = self.record(Call::ClusterTables(cluster.to_string()));
        state
            .tables
            .get(cluster)
            .cloned()
            .ok_or_else(|| not_found("cluster_tables"))
    }

    async fn list_schedules(&self, cluster: Option<&str>) -> ServiceResult<Vec<RepairSchedule>> {
        let state = self.record(Call::ListSchedules(cluster.map(str::to_string)));
        Ok(state
            .schedules
            .iter()
            .filter(|schedule| cluster.is_none_or(|name| schedule.cluster_name == name))
            .cloned()
            .collect())
    }

    async fn get_schedule(&self, id: &str) -> ServiceResult<RepairSchedule> {
        let state = self.record(Call::GetSchedule(id.to_string()));
        state
            .schedules
            .iter()
            .find(|schedule| schedule.id == id)
            .cloned()
            .ok_or_else(|| not_found("get_schedule"))
    }

    async fn enable_schedule(&self, id: &str) -> ServiceResult<()> {
        self.transition_schedule(
            Call::EnableSchedule(id.to_string()),
            "enable_schedule",
            id,
            |schedules, index| schedules[index].state = ScheduleState::Active,
        )
    }

    async fn disable_schedule(&self, id: &str) -> ServiceResult<()> {
        self.transition_schedule(
            Call::DisableSchedule(id.to_string()),
            "disable_schedule",
            id,
            |schedules, index| schedules[index].state = ScheduleState::Paused,
        )
    }

    async fn start_schedule(&self, id: &str) -> ServiceResult<()> {
        self.transition_schedule(
            Call::StartSchedule(id.to_string()),
            "start_schedule",
            id,
            |_, _| {},
        )
    }

    async fn delete_schedule(&self, id: &str) -> ServiceResult<()> {
        self.transition_schedule(
            Call::DeleteSchedule(id.to_string()),
            "delete_schedule",
            id,
            |schedules, index| {
                schedules.remove(index);
            },
        )
    }

    async fn list_repairs(
        &self,
        cluster: Option<&str>,
        states: &[RepairState],
    ) -> ServiceResult<Vec<RepairRun>> {
        let state = self.record(Call::ListRepairs(
            cluster.map(str::to_string),
            states.to_vec(),
        ));
        Ok(state
            .repairs
            .iter()
            .filter(|repair| cluster.is_none_or(|name| repair.cluster_name == name))
            .filter(|repair| states.is_empty() || states.contains(&repair.state))
            .cloned()
            .collect())
    }

    async fn get_repair(&self, id: &str) -> ServiceResult<RepairRun> {
        let state = self.record(Call::GetRepair(id.to_string()));
        state
            .repairs
            .iter()
            .find(|repair| repair.id == id)
            .cloned()
            .ok_or_else(|| not_found("get_repair"))
    }

    async fn pause_repair(&self, id: &str) -> ServiceResult<()> {
        self.transition_repair(
            Call::PauseRepair(id.to_string()),
            "pause_repair",
            id,
            |repairs, index| repairs[index].state = RepairState::Paused,
        )
    }

    async fn resume_repair(&self, id: &str) -> ServiceResult<()> {
        self.transition_repair(
            Call::ResumeRepair(id.to_string()),
            "resume_repair",
            id,
            |repairs, index| repairs[index].state = RepairState::Running,
        )
    }

    async fn abort_repair(&self, id: &str) -> ServiceResult<()> {
        self.transition_repair(
            Call::AbortRepair(id.to_string()),
            "abort_repair",
            id,
            |repairs, index| repairs[index].state = RepairState::Aborted,
        )
    }

    async fn delete_repair(&self, id: &str) -> ServiceResult<()> {
        self.transition_repair(
            Call::DeleteRepair(id.to_string()),
            "delete_repair",
            id,
            |repairs, index| {
                repairs.remove(index);
            },
        )
    }

    async fn change_repair_intensity(
        &self,
        id: &str,
        intensity: Intensity,
    ) -> ServiceResult<()> {
        self.transition_repair(
            Call::ChangeIntensity(id.to_string(), intensity.get()),
            "change_repair_intensity",
            id,
            |repairs, index| repairs[index].intensity = intensity.get(),
        )
    }

    async fn list_segments(&self, repair_id: &str) -> ServiceResult<Vec<RepairSegment>> {
        let state = self.record(Call::ListSegments(repair_id.to_string()));
        Ok(state.segments.get(repair_id).cloned().unwrap_or_default())
    }

    async fn abort_segment(&self, repair_id: &str, segment_id: &str) -> ServiceResult<()> {
        let state = self.record(Call::AbortSegment(
            repair_id.to_string(),
            segment_id.to_string(),
        ));
        if state.failing.contains(segment_id) {
            return Err(conflict("abort_segment"));
        }
        Ok(())
    }
}

/// Application context wired to a fake service and a recording reporter.
pub(crate) fn context(fake: FakeReaper) -> (AppContext, Arc<FakeReaper>, Arc<RecordingReporter>) {
    let fake = Arc::new(fake);
    let reporter = Arc::new(RecordingReporter::default());
    let ctx = AppContext {
        service: fake.clone(),
        reporter: reporter.clone(),
    };
    (ctx, fake, reporter)
}
