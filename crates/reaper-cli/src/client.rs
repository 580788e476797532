//! Shared client utilities, error types, and the HTTP repair service client.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use reaper_api_models::{
    ClusterTables, Intensity, RepairRun, RepairSchedule, RepairSegment, RepairState,
    ScheduleState,
};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::report::Reporter;
use crate::service::{RepairService, ServiceError, ServiceResult};
use crate::state::PreconditionFailed;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type separating bad input, refused transitions and
/// operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Precondition(PreconditionFailed),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Precondition(_) => 1,
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Precondition(failure) => failure.to_string(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

impl From<ServiceError> for CliError {
    fn from(error: ServiceError) -> Self {
        Self::Failure(error.into())
    }
}

impl From<PreconditionFailed> for CliError {
    fn from(failure: PreconditionFailed) -> Self {
        Self::Precondition(failure)
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) service: Arc<dyn RepairService>,
    pub(crate) reporter: Arc<dyn Reporter>,
}

/// Connection settings resolved from flags and environment variables.
#[derive(Debug, Clone)]
pub(crate) struct ConnectionSettings {
    pub(crate) base_url: Url,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) verify_tls: bool,
    pub(crate) timeout: Duration,
}

/// Parse the service URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Repair service reached over HTTP with a cookie-backed session.
pub(crate) struct ReaperClient {
    http: Client,
    base_url: Url,
    username: String,
}

impl ReaperClient {
    /// Build the HTTP client without opening a session.
    pub(crate) fn new(settings: &ConnectionSettings, trace_id: &str) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let http = Client::builder()
            .timeout(settings.timeout)
            .default_headers(default_headers)
            .cookie_store(true)
            .danger_accept_invalid_certs(!settings.verify_tls)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
            username: settings.username.clone(),
        })
    }

    /// Build the client and log in once; the session cookie is reused by every
    /// later request.
    pub(crate) async fn connect(settings: &ConnectionSettings, trace_id: &str) -> CliResult<Self> {
        let client = Self::new(settings, trace_id)?;
        client.login(&settings.password).await?;
        Ok(client)
    }

    async fn login(&self, password: &str) -> ServiceResult<()> {
        const OPERATION: &str = "login";
        let url = self.endpoint(OPERATION, &["login"])?;
        let form = [
            ("username", self.username.as_str()),
            ("password", password),
            ("rememberMe", "false"),
        ];
        self.send(OPERATION, self.http.post(url).form(&form))
            .await
            .map(drop)
    }

    fn endpoint(&self, operation: &'static str, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidBaseUrl { operation })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn owned_endpoint(&self, operation: &'static str, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = self.endpoint(operation, segments)?;
        url.query_pairs_mut().append_pair("owner", &self.username);
        Ok(url)
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> ServiceResult<Response> {
        let response = request.send().await.map_err(|err| ServiceError::Transport {
            operation,
            source: Box::new(err),
        })?;
        tracing::debug!(
            operation,
            url = %response.url(),
            status = response.status().as_u16(),
            "repair service responded"
        );
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify_rejection(operation, response).await)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &'static str, url: Url) -> ServiceResult<T> {
        let response = self.send(operation, self.http.get(url)).await?;
        let bytes = response.bytes().await.map_err(|err| ServiceError::Transport {
            operation,
            source: Box::new(err),
        })?;
        serde_json::from_slice(&bytes).map_err(|err| ServiceError::Decode {
            operation,
            source: Box::new(err),
        })
    }

    async fn execute(&self, operation: &'static str, method: Method, url: Url) -> ServiceResult<()> {
        self.send(operation, self.http.request(method, url))
            .await
            .map(drop)
    }

    async fn set_schedule_state(
        &self,
        operation: &'static str,
        id: &str,
        state: ScheduleState,
    ) -> ServiceResult<()> {
        let mut url = self.endpoint(operation, &["repair_schedule", id])?;
        url.query_pairs_mut().append_pair("state", state.as_str());
        self.execute(operation, Method::PUT, url).await
    }

    async fn set_repair_state(
        &self,
        operation: &'static str,
        id: &str,
        state: RepairState,
    ) -> ServiceResult<()> {
        let url = self.endpoint(operation, &["repair_run", id, "state", state.as_str()])?;
        self.execute(operation, Method::PUT, url).await
    }
}

/// Map a non-success response onto a rejection carrying the body text, or the
/// canonical reason when the body is empty.
async fn classify_rejection(operation: &'static str, response: Response) -> ServiceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    let message = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body.to_string()
    };
    ServiceError::Rejected {
        operation,
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl RepairService for ReaperClient {
    async fn list_clusters(&self) -> ServiceResult<Vec<String>> {
        const OPERATION: &str = "list_clusters";
        let url = self.endpoint(OPERATION, &["cluster"])?;
        self.get_json(OPERATION, url).await
    }

    async fn cluster_tables(&self, cluster: &str) -> ServiceResult<ClusterTables> {
        const OPERATION: &str = "cluster_tables";
        let url = self.endpoint(OPERATION, &["cluster", cluster, "tables"])?;
        self.get_json(OPERATION, url).await
    }

    async fn list_schedules(&self, cluster: Option<&str>) -> ServiceResult<Vec<RepairSchedule>> {
        const OPERATION: &str = "list_schedules";
        let mut url = self.endpoint(OPERATION, &["repair_schedule"])?;
        if let Some(cluster) = cluster {
            url.query_pairs_mut().append_pair("clusterName", cluster);
        }
        self.get_json(OPERATION, url).await
    }

    async fn get_schedule(&self, id: &str) -> ServiceResult<RepairSchedule> {
        const OPERATION: &str = "get_schedule";
        let url = self.endpoint(OPERATION, &["repair_schedule", id])?;
        self.get_json(OPERATION, url).await
    }

    async fn enable_schedule(&self, id: &str) -> ServiceResult<()> {
        self.set_schedule_state("enable_schedule", id, ScheduleState::Active).await
    }

    async fn disable_schedule(&self, id: &str) -> ServiceResult<()> {
        self.set_schedule_state("disable_schedule", id, ScheduleState::Paused).await
    }

    async fn start_schedule(&self, id: &str) -> ServiceResult<()> {
        const OPERATION: &str = "start_schedule";
        let url = self.endpoint(OPERATION, &["repair_schedule", "start", id])?;
        self.execute(OPERATION, Method::POST, url).await
    }

    async fn delete_schedule(&self, id: &str) -> ServiceResult<()> {
        const OPERATION: &str = "delete_schedule";
        let url = self.owned_endpoint(OPERATION, &["repair_schedule", id])?;
        self.execute(OPERATION, Method::DELETE, url).await
    }

    async fn list_repairs(
        &self,
        cluster: Option<&str>,
        states: &[RepairState],
    ) -> ServiceResult<Vec<RepairRun>> {
        const OPERATION: &str = "list_repairs";
        let mut url = self.endpoint(OPERATION, &["repair_run"])?;
        if let Some(cluster) = cluster {
            url.query_pairs_mut().append_pair("cluster_name", cluster);
        }
        if !states.is_empty() {
            let joined = states
                .iter()
                .map(|state| state.as_str())
                .collect::<Vec<_>>()
                .join(",");
            url.query_pairs_mut().append_pair("state", &joined);
        }
        self.get_json(OPERATION, url).await
    }

    async fn get_repair(&self, id: &str) -> ServiceResult<RepairRun> {
        const OPERATION: &str = "get_repair";
        let url = self.endpoint(OPERATION, &["repair_run", id])?;
        self.get_json(OPERATION, url).await
    }

    async fn pause_repair(&self, id: &str) -> ServiceResult<()> {
        self.set_repair_state("pause_repair", id, RepairState::Paused)
            .await
    }

    async fn resume_repair(&self, id: &str) -> ServiceResult<()> {
        self.set_repair_state("resume_repair", id, RepairState::Running)
            .await
    }

    async fn abort_repair(&self, id: &str) -> ServiceResult<()> {
        self.set_repair_state("abort_repair", id, RepairState::Aborted)
            .await
    }

    async fn delete_repair(&self, id: &str) -> ServiceResult<()> {
        const OPERATION: &str = "delete_repair";
        let url = self.owned_endpoint(OPERATION, &["repair_run", id])?;
        self.execute(OPERATION, Method::DELETE, url).await
    }

    async fn change_repair_intensity(
        &self,
        id: &str,
        intensity: Intensity,
    ) -> ServiceResult<()> {
        const OPERATION: &str = "change_repair_intensity";
        let value = intensity.to_string();
        let url = self.endpoint(OPERATION, &["repair_run", id, "intensity", &value])?;
        self.execute(OPERATION, Method::PUT, url).await
    }

    async fn list_segments(&self, repair_id: &str) -> ServiceResult<Vec<RepairSegment>> {
        const OPERATION: &str = "list_segments";
        let url = self.endpoint(OPERATION, &["repair_run", repair_id, "segments"])?;
        self.get_json(OPERATION, url).await
    }

    async fn abort_segment(&self, repair_id: &str, segment_id: &str) -> ServiceResult<()> {
        const OPERATION: &str = "abort_segment";
        let url = self.endpoint(
            OPERATION,
            &["repair_run", repair_id, "segments", "abort", segment_id],
        )?;
        self.execute(OPERATION, Method::POST, url).await
    }
}
