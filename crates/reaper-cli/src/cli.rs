//! Command-line surface for operating a Cassandra Reaper instance.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use reaper_api_models::{Intensity, RepairState};
use reaper_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use reqwest::Url;
use tracing::Instrument;
use uuid::Uuid;

use crate::actions::{RepairAction, ScheduleAction};
use crate::client::{AppContext, CliResult, ConnectionSettings, ReaperClient, parse_url};
use crate::commands::clusters::{
    handle_cluster_disable, handle_cluster_enable, handle_cluster_list,
    handle_cluster_repair_action, handle_cluster_schedule_delete, handle_cluster_schedule_toggle,
    handle_cluster_table_list,
};
use crate::commands::repairs::{
    handle_repair_action, handle_repair_info, handle_repair_list, handle_segment_abort,
    handle_segment_list,
};
use crate::commands::schedules::{
    handle_schedule_action, handle_schedule_info, handle_schedule_list,
};
use crate::report::TracingReporter;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const ALL_CLUSTERS: &str = "ALL";
const BIN_NAME: &str = "reaper-cli";

#[derive(Parser)]
#[command(
    name = BIN_NAME,
    version,
    about = "Operate repair schedules and repair runs of a Cassandra Reaper instance"
)]
pub(crate) struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[arg(
        long,
        global = true,
        env = "REAPER_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter directive; RUST_LOG takes precedence"
    )]
    log_level: String,
    #[arg(
        long,
        global = true,
        env = "REAPER_LOG_FORMAT",
        value_parser = parse_log_format,
        default_value = "text",
        help = "Log line format (text or json)"
    )]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ConnectionArgs {
    #[arg(long, global = true, env = "REAPER_URL", value_parser = parse_url)]
    url: Option<Url>,
    #[arg(long, global = true, env = "REAPER_USER")]
    username: Option<String>,
    #[arg(long, global = true, env = "REAPER_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long, global = true, help = "Accept invalid TLS certificates")]
    disable_ssl_verify: bool,
    #[arg(
        long,
        global = true,
        env = "REAPER_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
}

impl ConnectionArgs {
    /// Resolve the connection settings, or name every missing flag.
    pub(crate) fn resolve(&self) -> Result<ConnectionSettings, Vec<&'static str>> {
        match (&self.url, &self.username, &self.password) {
            (Some(url), Some(username), Some(password)) => Ok(ConnectionSettings {
                base_url: url.clone(),
                username: username.clone(),
                password: password.clone(),
                verify_tls: !self.disable_ssl_verify,
                timeout: Duration::from_secs(self.timeout),
            }),
            _ => Err([
                ("--url", self.url.is_none()),
                ("--username", self.username.is_none()),
                ("--password", self.password.is_none()),
            ]
            .into_iter()
            .filter_map(|(flag, absent)| absent.then_some(flag))
            .collect()),
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    #[command(flatten)]
    Remote(RemoteCommand),
    /// Print a shell completion script.
    CompletionPrint(CompletionArgs),
}

/// Verbs that talk to the service.
#[derive(Subcommand)]
pub(crate) enum RemoteCommand {
    /// List repair schedules.
    ScheduleList(ClusterListingArgs),
    /// Show a repair schedule as JSON.
    ScheduleInfo(IdArgs),
    ScheduleEnable(IdArgs),
    ScheduleDisable(IdArgs),
    /// Trigger a repair schedule immediately.
    ScheduleStart(IdArgs),
    /// Delete a paused repair schedule.
    ScheduleDelete(IdArgs),
    /// List repair runs.
    RepairList(RepairListArgs),
    /// Show a repair run as JSON.
    RepairInfo(IdArgs),
    RepairPause(IdArgs),
    RepairResume(IdArgs),
    RepairAbort(IdArgs),
    RepairDelete(IdArgs),
    /// Change the intensity of a paused repair run.
    RepairIntensityChange(IntensityArgs),
    /// List the segments of a repair run.
    RepairSegmentList(SegmentListArgs),
    /// Abort a running segment of a repair run.
    RepairSegmentAbort(SegmentAbortArgs),
    /// List cluster names.
    ClusterList(JsonArgs),
    /// List the keyspaces and tables of a cluster.
    ClusterTableList(ClusterTableListArgs),
    ClusterScheduleList(SingleClusterListingArgs),
    ClusterScheduleEnable(ClusterArgs),
    ClusterScheduleDisable(ClusterArgs),
    /// Disable, then delete, every repair schedule of a cluster.
    ClusterScheduleDelete(ClusterArgs),
    ClusterRepairList(RepairListArgs),
    ClusterRepairPause(ClusterArgs),
    ClusterRepairResume(ClusterArgs),
    ClusterRepairAbort(ClusterArgs),
    ClusterRepairDelete(ClusterArgs),
    /// Enable every schedule and resume every paused repair of a cluster.
    ClusterEnable(ClusterArgs),
    /// Disable every schedule and pause every running repair of a cluster.
    ClusterDisable(ClusterArgs),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    const fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Table }
    }
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub(crate) struct ListingFlags {
    #[arg(short = 'i', long, help = "Show identifiers")]
    pub(crate) show_id: bool,
    #[arg(short = 'j', long, help = "Print JSON instead of a table")]
    pub(crate) json: bool,
}

impl ListingFlags {
    pub(crate) const fn format(self) -> OutputFormat {
        OutputFormat::from_json_flag(self.json)
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ClusterListingArgs {
    #[arg(default_value = ALL_CLUSTERS)]
    cluster: String,
    #[command(flatten)]
    flags: ListingFlags,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct SingleClusterListingArgs {
    cluster: String,
    #[command(flatten)]
    flags: ListingFlags,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RepairListArgs {
    #[arg(default_value = ALL_CLUSTERS)]
    cluster: String,
    #[arg(
        long,
        value_enum,
        num_args = 1..,
        value_delimiter = ',',
        default_values_t = [StateFilter::Running, StateFilter::Paused, StateFilter::NotStarted]
    )]
    states: Vec<StateFilter>,
    #[command(flatten)]
    flags: ListingFlags,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct IdArgs {
    id: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct IntensityArgs {
    id: String,
    #[arg(value_parser = parse_intensity, help = "New intensity in (0.0, 1.0]")]
    intensity: Intensity,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct SegmentListArgs {
    pub(crate) id: String,
    #[arg(short = 'i', long, help = "Show segment identifiers")]
    pub(crate) show_id: bool,
    #[arg(short = 't', long, help = "Show the token sub-ranges of each segment")]
    pub(crate) show_token_ranges: bool,
    #[arg(short = 'j', long, help = "Print JSON instead of a table")]
    pub(crate) json: bool,
}

impl SegmentListArgs {
    pub(crate) const fn format(&self) -> OutputFormat {
        OutputFormat::from_json_flag(self.json)
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct SegmentAbortArgs {
    repair_id: String,
    segment_id: String,
}

#[derive(Args, Debug, Clone, Copy)]
pub(crate) struct JsonArgs {
    #[arg(short = 'j', long, help = "Print JSON instead of plain lines")]
    json: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ClusterTableListArgs {
    cluster: String,
    keyspace: Option<String>,
    #[arg(short = 'j', long, help = "Print JSON instead of plain lines")]
    json: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ClusterArgs {
    cluster: String,
}

#[derive(Args, Debug, Clone, Copy)]
pub(crate) struct CompletionArgs {
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum CompletionShell {
    Bash,
    Zsh,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Self::Bash,
            CompletionShell::Zsh => Self::Zsh,
        }
    }
}

/// Repair state accepted by `--states`; `ALL` lifts the filter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum StateFilter {
    Running,
    Paused,
    NotStarted,
    Done,
    Error,
    Aborted,
    Deleted,
    All,
}

/// Expand the filters into the state set sent to the service; an empty set
/// means every state.
pub(crate) fn resolve_states(filters: &[StateFilter]) -> Vec<RepairState> {
    if filters.contains(&StateFilter::All) {
        return Vec::new();
    }
    let mut states = Vec::with_capacity(filters.len());
    for filter in filters {
        let state = match filter {
            StateFilter::Running => RepairState::Running,
            StateFilter::Paused => RepairState::Paused,
            StateFilter::NotStarted => RepairState::NotStarted,
            StateFilter::Done => RepairState::Done,
            StateFilter::Error => RepairState::Error,
            StateFilter::Aborted => RepairState::Aborted,
            StateFilter::Deleted => RepairState::Deleted,
            StateFilter::All => continue,
        };
        if !states.contains(&state) {
            states.push(state);
        }
    }
    states
}

fn requested_cluster(cluster: &str) -> Option<&str> {
    (cluster != ALL_CLUSTERS).then_some(cluster)
}

fn parse_intensity(input: &str) -> Result<Intensity, String> {
    input.parse::<Intensity>().map_err(|err| err.to_string())
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input.parse::<LogFormat>().map_err(|err| err.to_string())
}

/// Parses CLI arguments, executes the requested command, and logs the
/// outcome. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format,
    }) {
        eprintln!("error: {err}");
        return 3;
    }

    let trace_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "command",
        command = command_label(&cli.command),
        trace_id = %trace_id
    );

    let result = execute(cli, &trace_id).instrument(span.clone()).await;
    span.in_scope(|| exit_code(&result))
}

fn exit_code(result: &CliResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            let exit_code = err.exit_code();
            tracing::error!(exit_code, "{}", err.display_message());
            exit_code
        }
    }
}

async fn execute(cli: Cli, trace_id: &str) -> CliResult<()> {
    let command = match cli.command {
        Command::CompletionPrint(args) => {
            print_completion(args.shell);
            return Ok(());
        }
        Command::Remote(command) => command,
    };

    let settings = match cli.connection.resolve() {
        Ok(settings) => settings,
        Err(missing) => {
            tracing::warn!(missing = %missing.join(", "), "connection settings missing");
            println!("{}", Cli::command().render_help());
            return Ok(());
        }
    };
    let client = ReaperClient::connect(&settings, trace_id).await?;
    tracing::debug!(url = %settings.base_url, "session established");

    let ctx = AppContext {
        service: Arc::new(client),
        reporter: Arc::new(TracingReporter),
    };
    dispatch(&ctx, command).await
}

fn print_completion(shell: CompletionShell) {
    clap_complete::generate(
        Shell::from(shell),
        &mut Cli::command(),
        BIN_NAME,
        &mut io::stdout(),
    );
}

pub(crate) async fn dispatch(ctx: &AppContext, command: RemoteCommand) -> CliResult<()> {
    match command {
        RemoteCommand::ScheduleList(args) => {
            handle_schedule_list(ctx, requested_cluster(&args.cluster), args.flags).await
        }
        RemoteCommand::ScheduleInfo(args) => handle_schedule_info(ctx, &args.id).await,
        RemoteCommand::ScheduleEnable(args) => {
            handle_schedule_action(ctx, &args.id, ScheduleAction::Enable).await
        }
        RemoteCommand::ScheduleDisable(args) => {
            handle_schedule_action(ctx, &args.id, ScheduleAction::Disable).await
        }
        RemoteCommand::ScheduleStart(args) => {
            handle_schedule_action(ctx, &args.id, ScheduleAction::Start).await
        }
        RemoteCommand::ScheduleDelete(args) => {
            handle_schedule_action(ctx, &args.id, ScheduleAction::Delete).await
        }
        RemoteCommand::RepairList(args) | RemoteCommand::ClusterRepairList(args) => {
            handle_repair_list(
                ctx,
                requested_cluster(&args.cluster),
                &resolve_states(&args.states),
                args.flags,
            )
            .await
        }
        RemoteCommand::RepairInfo(args) => handle_repair_info(ctx, &args.id).await,
        RemoteCommand::RepairPause(args) => handle_repair_action(ctx, &args.id, RepairAction::Pause).await,
        RemoteCommand::RepairResume(args) => {
            handle_repair_action(ctx, &args.id, RepairAction::Resume).await
        }
        RemoteCommand::RepairAbort(args) => handle_repair_action(ctx, &args.id, RepairAction::Abort).await,
        RemoteCommand::RepairDelete(args) => {
            handle_repair_action(ctx, &args.id, RepairAction::Delete).await
        }
        RemoteCommand::RepairIntensityChange(args) => {
            handle_repair_action(
                ctx,
                &args.id,
                RepairAction::ChangeIntensity(args.intensity),
            )
            .await
        }
        RemoteCommand::RepairSegmentList(args) => handle_segment_list(ctx, &args).await,
        RemoteCommand::RepairSegmentAbort(args) => {
            handle_segment_abort(ctx, &args.repair_id, &args.segment_id).await
        }
        RemoteCommand::ClusterList(args) => {
            handle_cluster_list(ctx, OutputFormat::from_json_flag(args.json)).await
        }
        RemoteCommand::ClusterTableList(args) => {
            handle_cluster_table_list(
                ctx,
                &args.cluster,
                args.keyspace.as_deref(),
                OutputFormat::from_json_flag(args.json),
            )
            .await
        }
        RemoteCommand::ClusterScheduleList(args) => {
            handle_schedule_list(ctx, Some(&args.cluster), args.flags).await
        }
        RemoteCommand::ClusterScheduleEnable(args) => {
            handle_cluster_schedule_toggle(ctx, &args.cluster, ScheduleAction::Enable).await
        }
        RemoteCommand::ClusterScheduleDisable(args) => {
            handle_cluster_schedule_toggle(ctx, &args.cluster, ScheduleAction::Disable).await
        }
        RemoteCommand::ClusterScheduleDelete(args) => {
            handle_cluster_schedule_delete(ctx, &args.cluster).await
        }
        RemoteCommand::ClusterRepairPause(args) => {
            handle_cluster_repair_action(ctx, &args.cluster, RepairAction::Pause).await
        }
        RemoteCommand::ClusterRepairResume(args) => {
            handle_cluster_repair_action(ctx, &args.cluster, RepairAction::Resume).await
        }
        RemoteCommand::ClusterRepairAbort(args) => {
            handle_cluster_repair_action(ctx, &args.cluster, RepairAction::Abort).await
        }
        RemoteCommand::ClusterRepairDelete(args) => {
            handle_cluster_repair_action(ctx, &args.cluster, RepairAction::Delete).await
        }
        RemoteCommand::ClusterEnable(args) => handle_cluster_enable(ctx, &args.cluster).await,
        RemoteCommand::ClusterDisable(args) => handle_cluster_disable(ctx, &args.cluster).await,
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Remote(remote) => remote_label(remote),
        Command::CompletionPrint(_) => "completion_print",
    }
}

const fn remote_label(command: &RemoteCommand) -> &'static str {
    match command {
        RemoteCommand::ScheduleList(_) => "schedule_list",
        RemoteCommand::ScheduleInfo(_) => "schedule_info",
        RemoteCommand::ScheduleEnable(_) => "schedule_enable",
        RemoteCommand::ScheduleDisable(_) => "schedule_disable",
        RemoteCommand::ScheduleStart(_) => "schedule_start",
        RemoteCommand::ScheduleDelete(_) => "schedule_delete",
        RemoteCommand::RepairList(_) => "repair_list",
        RemoteCommand::RepairInfo(_) => "repair_info",
        RemoteCommand::RepairPause(_) => "repair_pause",
        RemoteCommand::RepairResume(_) => "repair_resume",
        RemoteCommand::RepairAbort(_) => "repair_abort",
        RemoteCommand::RepairDelete(_) => "repair_delete",
        RemoteCommand::RepairIntensityChange(_) => "repair_intensity_change",
        RemoteCommand::RepairSegmentList(_) => "repair_segment_list",
        RemoteCommand::RepairSegmentAbort(_) => "repair_segment_abort",
        RemoteCommand::ClusterList(_) => "cluster_list",
        RemoteCommand::ClusterTableList(_) => "cluster_table_list",
        RemoteCommand::ClusterScheduleList(_) => "cluster_schedule_list",
        RemoteCommand::ClusterScheduleEnable(_) => "cluster_schedule_enable",
        RemoteCommand::ClusterScheduleDisable(_) => "cluster_schedule_disable",
        RemoteCommand::ClusterScheduleDelete(_) => "cluster_schedule_delete",
        RemoteCommand::ClusterRepairList(_) => "cluster_repair_list",
        RemoteCommand::ClusterRepairPause(_) => "cluster_repair_pause",
        RemoteCommand::ClusterRepairResume(_) => "cluster_repair_resume",
        RemoteCommand::ClusterRepairAbort(_) => "cluster_repair_abort",
        RemoteCommand::ClusterRepairDelete(_) => "cluster_repair_delete",
        RemoteCommand::ClusterEnable(_) => "cluster_enable",
        RemoteCommand::ClusterDisable(_) => "cluster_disable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeReaper, context, repair};

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once(BIN_NAME).chain(args.iter().copied()))
    }

    fn remote(args: &[&str]) -> anyhow::Result<RemoteCommand> {
        match parse(args)?.command {
            Command::Remote(command) => Ok(command),
            Command::CompletionPrint(_) => anyhow::bail!("expected a remote verb"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbs_use_kebab_case() -> anyhow::Result<()> {
        let cli = parse(&["cluster-schedule-delete", "c1"])?;
        assert_eq!(command_label(&cli.command), "cluster_schedule_delete");
        let cli = parse(&["repair-segment-list", "r1", "-i", "-t", "-j"])?;
        assert!(matches!(
            cli.command,
            Command::Remote(RemoteCommand::RepairSegmentList(SegmentListArgs {
                show_id: true,
                show_token_ranges: true,
                json: true,
                ..
            }))
        ));
        Ok(())
    }

    #[test]
    fn repair_list_defaults_to_all_clusters_and_active_states() -> anyhow::Result<()> {
        let cli = parse(&["repair-list"])?;
        let Command::Remote(RemoteCommand::RepairList(args)) = cli.command else {
            anyhow::bail!("unexpected command");
        };
        assert_eq!(requested_cluster(&args.cluster), None);
        assert_eq!(
            resolve_states(&args.states),
            vec![
                RepairState::Running,
                RepairState::Paused,
                RepairState::NotStarted
            ]
        );
        Ok(())
    }

    #[test]
    fn all_state_filter_lifts_the_filter() -> anyhow::Result<()> {
        let cli = parse(&["repair-list", "c1", "--states", "RUNNING,ALL"])?;
        let Command::Remote(RemoteCommand::RepairList(args)) = cli.command else {
            anyhow::bail!("unexpected command");
        };
        assert_eq!(requested_cluster(&args.cluster), Some("c1"));
        assert!(resolve_states(&args.states).is_empty());

        let cli = parse(&["repair-list", "--states", "DONE", "ERROR"])?;
        let Command::Remote(RemoteCommand::RepairList(args)) = cli.command else {
            anyhow::bail!("unexpected command");
        };
        assert_eq!(
            resolve_states(&args.states),
            vec![RepairState::Done, RepairState::Error]
        );
        Ok(())
    }

    #[test]
    fn intensity_outside_bounds_is_a_usage_error() {
        for value in ["0.0", "1.5", "-0.1", "NaN", "fast"] {
            let err = parse(&["repair-intensity-change", "r1", value])
                .err()
                .unwrap_or_else(|| panic!("{value} should be rejected"));
            assert_eq!(err.exit_code(), 2, "{value}");
        }
        assert!(parse(&["repair-intensity-change", "r1", "1.0"]).is_ok());
    }

    #[test]
    fn missing_connection_settings_are_named() -> anyhow::Result<()> {
        let args = ConnectionArgs {
            url: Some(parse_url("http://localhost:8080").map_err(anyhow::Error::msg)?),
            username: None,
            password: None,
            disable_ssl_verify: false,
            timeout: DEFAULT_TIMEOUT_SECS,
        };
        let missing = args.resolve().expect_err("missing settings");
        assert_eq!(missing, vec!["--username", "--password"]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_connection_settings_print_help_and_succeed() -> anyhow::Result<()> {
        let mut cli = parse(&["cluster-list"])?;
        cli.connection = ConnectionArgs {
            url: None,
            username: Some("admin".into()),
            password: None,
            disable_ssl_verify: false,
            timeout: DEFAULT_TIMEOUT_SECS,
        };
        let result = execute(cli, "trace").await;
        assert!(result.is_ok());
        assert_eq!(exit_code(&result), 0);
        Ok(())
    }

    #[test]
    fn complete_connection_settings_resolve() -> anyhow::Result<()> {
        let args = ConnectionArgs {
            url: Some(parse_url("https://reaper:8080/").map_err(anyhow::Error::msg)?),
            username: Some("admin".into()),
            password: Some("secret".into()),
            disable_ssl_verify: true,
            timeout: 3,
        };
        let settings = args.resolve().map_err(|e| anyhow::anyhow!("{}", e.join("; ")))?;
        assert!(!settings.verify_tls);
        assert_eq!(settings.timeout, Duration::from_secs(3));
        Ok(())
    }

    #[test]
    fn log_format_is_parsed() -> anyhow::Result<()> {
        let cli = parse(&["--log-format", "json", "cluster-list"])?;
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(parse(&["--log-format", "xml", "cluster-list"]).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn completion_print_needs_no_connection() -> anyhow::Result<()> {
        let cli = parse(&["completion-print", "zsh"])?;
        assert!(matches!(
            cli.command,
            Command::CompletionPrint(CompletionArgs {
                shell: CompletionShell::Zsh
            })
        ));
        assert!(remote(&["completion-print", "bash"]).is_err());

        let mut cli = parse(&["completion-print", "bash"])?;
        cli.connection.url = None;
        execute(cli, "trace").await?;
        Ok(())
    }

    #[tokio::test]
    async fn dispatch_routes_intensity_change() -> anyhow::Result<()> {
        let fake = FakeReaper::default().with_repairs(vec![repair(
            "r1",
            "c1",
            "ks",
            RepairState::Paused,
            0,
        )]);
        let (ctx, fake, _) = context(fake);

        dispatch(&ctx, remote(&["repair-intensity-change", "r1", "0.5"])?).await?;
        assert_eq!(
            fake.mutations(),
            vec![Call::ChangeIntensity("r1".into(), 0.5)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn dispatch_routes_cluster_repair_list_with_filter() -> anyhow::Result<()> {
        let (ctx, fake, _) = context(FakeReaper::default());

        dispatch(
            &ctx,
            remote(&["cluster-repair-list", "c1", "--states", "PAUSED"])?,
        )
        .await?;
        assert_eq!(
            fake.calls(),
            vec![Call::ListRepairs(
                Some("c1".into()),
                vec![RepairState::Paused]
            )]
        );
        Ok(())
    }
}
