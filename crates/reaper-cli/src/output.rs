//! Output renderers and formatting helpers for CLI commands.
//!
//! Renderers return the text to print so the column contract can be asserted
//! directly. Collections are always sorted before rendering, whatever the
//! output format.

use anyhow::anyhow;
use chrono::{DateTime, SecondsFormat, Utc};
use reaper_api_models::{
    ClusterTables, RepairRun, RepairSchedule, RepairSegment, compare_segment_start,
};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

const ETA_PLACEHOLDER: &str = "TBD";

/// Optional columns of the repair and schedule listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListingColumns {
    pub(crate) cluster: bool,
    pub(crate) id: bool,
}

impl ListingColumns {
    /// The cluster column is redundant when a single cluster was requested.
    pub(crate) const fn for_request(cluster: Option<&str>, show_id: bool) -> Self {
        Self {
            cluster: cluster.is_none(),
            id: show_id,
        }
    }
}

/// Optional parts of the segment listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SegmentColumns {
    pub(crate) id: bool,
    pub(crate) token_ranges: bool,
}

pub(crate) fn sort_repairs(repairs: &mut [RepairRun]) {
    repairs.sort_by_key(|repair| repair.creation_time);
}

pub(crate) fn sort_schedules(schedules: &mut [RepairSchedule]) {
    schedules.sort_by_key(|schedule| schedule.next_activation);
}

pub(crate) fn sort_segments(segments: &mut [RepairSegment]) {
    segments.sort_by(compare_segment_start);
}

pub(crate) fn render_repairs(
    mut repairs: Vec<RepairRun>,
    columns: ListingColumns,
    format: OutputFormat,
) -> CliResult<String> {
    sort_repairs(&mut repairs);
    match format {
        OutputFormat::Json => to_json(&repairs),
        OutputFormat::Table => Ok(repair_table(&repairs, columns)),
    }
}

pub(crate) fn render_schedules(
    mut schedules: Vec<RepairSchedule>,
    columns: ListingColumns,
    format: OutputFormat,
) -> CliResult<String> {
    sort_schedules(&mut schedules);
    match format {
        OutputFormat::Json => to_json(&schedules),
        OutputFormat::Table => Ok(schedule_table(&schedules, columns)),
    }
}

pub(crate) fn render_segments(
    mut segments: Vec<RepairSegment>,
    columns: SegmentColumns,
    format: OutputFormat,
    now_ms: i64,
) -> CliResult<String> {
    sort_segments(&mut segments);
    match format {
        OutputFormat::Json => to_json(&segments),
        OutputFormat::Table => Ok(segment_table(&segments, columns, now_ms)),
    }
}

pub(crate) fn render_clusters(mut clusters: Vec<String>, format: OutputFormat) -> CliResult<String> {
    clusters.sort();
    match format {
        OutputFormat::Json => to_json(&clusters),
        OutputFormat::Table => Ok(clusters.join("\n")),
    }
}

pub(crate) fn render_cluster_tables(
    tables: &ClusterTables,
    keyspace: Option<&str>,
    format: OutputFormat,
) -> CliResult<String> {
    match (keyspace, format) {
        (Some(keyspace), _) => {
            let names = tables.get(keyspace).ok_or_else(|| {
                CliError::validation(format!("keyspace '{keyspace}' not found"))
            })?;
            match format {
                OutputFormat::Json => to_json(names),
                OutputFormat::Table => Ok(names.join("\n")),
            }
        }
        (None, OutputFormat::Json) => to_json(tables),
        (None, OutputFormat::Table) => {
            let mut lines = Vec::new();
            for (keyspace, names) in tables {
                lines.push(format!("{keyspace}:"));
                lines.extend(names.iter().map(|name| format!("  {name}")));
            }
            Ok(lines.join("\n"))
        }
    }
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

pub(crate) fn repair_table(repairs: &[RepairRun], columns: ListingColumns) -> String {
    let mut header = format!("{:22}{:22}", "CREATION_TIME", "ETA");
    if columns.cluster {
        header.push_str(&format!("{:30}", "CLUSTER"));
    }
    header.push_str(&format!("{:40}", "KEYSPACE"));
    if columns.id {
        header.push_str(&format!("{:40}", "ID"));
    }
    header.push_str(&format!("{:10}{:10}{}", "STATE", "REPAIRED", "LAST_EVENT"));

    let mut lines = vec![header];
    for repair in repairs {
        let mut line = format!(
            "{:22}{:22}",
            format_timestamp(repair.creation_time),
            repair_eta(repair)
        );
        if columns.cluster {
            line.push_str(&format!("{:30}", repair.cluster_name));
        }
        line.push_str(&format!("{:40}", repair.keyspace_name));
        if columns.id {
            line.push_str(&format!("{:40}", repair.id));
        }
        line.push_str(&format!(
            "{:10}{:10}{}",
            repair.state.as_str(),
            repair_progress(repair),
            repair.last_event
        ));
        lines.push(line);
    }
    lines.join("\n")
}

pub(crate) fn schedule_table(schedules: &[RepairSchedule], columns: ListingColumns) -> String {
    let mut header = String::new();
    if columns.cluster {
        header.push_str(&format!("{:30}", "CLUSTER"));
    }
    header.push_str(&format!("{:40}", "KEYSPACE"));
    if columns.id {
        header.push_str(&format!("{:40}", "ID"));
    }
    header.push_str(&format!("{:10}{}", "STATE", "NEXT_ACTIVATION"));

    let mut lines = vec![header];
    for schedule in schedules {
        let mut line = String::new();
        if columns.cluster {
            line.push_str(&format!("{:30}", schedule.cluster_name));
        }
        line.push_str(&format!("{:40}", schedule.keyspace_name));
        if columns.id {
            line.push_str(&format!("{:40}", schedule.id));
        }
        line.push_str(&format!(
            "{:10}{}",
            schedule.state.as_str(),
            format_timestamp(schedule.next_activation)
        ));
        lines.push(line);
    }
    lines.join("\n")
}

pub(crate) fn segment_table(
    segments: &[RepairSegment],
    columns: SegmentColumns,
    now_ms: i64,
) -> String {
    let mut header = format!("{:>22}{:>22}", "START_TOKEN", "END_TOKEN");
    if columns.id {
        header.push_str(&format!("{:>40}", "ID"));
    }
    header.push_str(&format!(
        "{:^15}{:<15}{:<92}{}",
        "FAIL_COUNT", "STATE", "REPLICAS", "SEGMENT_DURATION"
    ));

    let mut lines = vec![header];
    for segment in segments {
        let base = segment.token_range.base_range;
        let mut line = format!("{:>22}{:>22}", base.start, base.end);
        if columns.id {
            line.push_str(&format!("{:>40}", segment.id));
        }
        line.push_str(&format!(
            "{:^15}{:<15}{:<92}",
            segment.fail_count,
            segment.state.as_str(),
            segment.replicas.hosts().join(", ")
        ));
        if let Some(elapsed) = segment.duration_ms(now_ms) {
            line.push_str(&format_duration_ms(elapsed));
        }
        lines.push(line.trim_end().to_string());

        if columns.token_ranges {
            lines.push(format!("{:>30}{:>22}", "RANGE_START", "RANGE_END"));
            for range in segment.token_range.sorted_ranges() {
                lines.push(format!("{:>30}{:>22}", range.start, range.end));
            }
        }
    }
    lines.join("\n")
}

/// RFC 3339 UTC timestamp with second precision.
pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Finish time if known, else the service estimate, else `TBD`.
pub(crate) fn repair_eta(repair: &RepairRun) -> String {
    repair
        .end_time
        .or(repair.estimated_time_of_arrival)
        .map_or_else(|| ETA_PLACEHOLDER.to_string(), format_timestamp)
}

pub(crate) fn repair_progress(repair: &RepairRun) -> String {
    format!("{}/{}", repair.segments_repaired, repair.total_segments)
}

/// Elapsed milliseconds as `H:MM:SS`; negative spans clamp to zero.
pub(crate) fn format_duration_ms(elapsed_ms: i64) -> String {
    let total_secs = elapsed_ms.max(0) / 1_000;
    format!(
        "{}:{:02}:{:02}",
        total_secs / 3_600,
        (total_secs % 3_600) / 60,
        total_secs % 60
    )
}
