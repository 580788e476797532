#![forbid(unsafe_code)]
#![deny(
    warnings,
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
//! Typed records for the Cassandra Reaper REST API.
//!
//! The CLI never owns these entities; it decodes transient copies from the
//! service and renders or acts on them. Required fields are plain fields so a
//! missing or renamed attribute fails decoding instead of surfacing later as an
//! empty value. Attributes the CLI does not model are kept in `extra` so JSON
//! output reproduces the full payload.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, MapAccess, Unexpected, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Keyspace name to table names, as returned by `GET /cluster/{name}/tables`.
pub type ClusterTables = BTreeMap<String, Vec<String>>;

/// Lifecycle of a repair schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleState {
    /// Schedule triggers repairs at `next_activation`.
    Active,
    /// Schedule is disabled; the only state in which it may be deleted.
    Paused,
}

impl ScheduleState {
    /// Wire label, e.g. `PAUSED`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
        }
    }
}

impl Display for ScheduleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle of a repair run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairState {
    /// Segments are being repaired.
    Running,
    /// Suspended by an operator; intensity may be changed.
    Paused,
    /// Created but not yet picked up.
    NotStarted,
    /// All segments repaired.
    Done,
    /// Terminated by a failure.
    Error,
    /// Terminated by an operator.
    Aborted,
    /// Marked for removal.
    Deleted,
}

impl RepairState {
    /// Wire label, e.g. `NOT_STARTED`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::NotStarted => "NOT_STARTED",
            Self::Done => "DONE",
            Self::Error => "ERROR",
            Self::Aborted => "ABORTED",
            Self::Deleted => "DELETED",
        }
    }
}

impl Display for RepairState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle of a single repair segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentState {
    /// Waiting to be scheduled.
    NotStarted,
    /// Claimed by a coordinator but not yet streaming.
    Started,
    /// Repair in progress.
    Running,
    /// Repaired.
    Done,
}

impl SegmentState {
    /// Wire label, e.g. `RUNNING`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Started => "STARTED",
            Self::Running => "RUNNING",
            Self::Done => "DONE",
        }
    }
}

impl Display for SegmentState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Recurring repair definition for one cluster/keyspace pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepairSchedule {
    /// Opaque schedule identifier.
    pub id: String,
    /// Owning cluster.
    pub cluster_name: String,
    /// Keyspace repaired by the schedule.
    pub keyspace_name: String,
    /// Current lifecycle state.
    pub state: ScheduleState,
    /// Next time the schedule fires.
    pub next_activation: DateTime<Utc>,
    /// Remaining attributes, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One execution of a repair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepairRun {
    /// Opaque run identifier.
    pub id: String,
    /// Owning cluster.
    pub cluster_name: String,
    /// Keyspace under repair.
    pub keyspace_name: String,
    /// Current lifecycle state.
    pub state: RepairState,
    /// When the run was created.
    pub creation_time: DateTime<Utc>,
    /// When the run finished, if it has.
    pub end_time: Option<DateTime<Utc>>,
    /// Service-side completion estimate, if available.
    pub estimated_time_of_arrival: Option<DateTime<Utc>>,
    /// Segments completed so far.
    pub segments_repaired: u64,
    /// Segments in the run.
    pub total_segments: u64,
    /// Most recent event reported by the service.
    pub last_event: String,
    /// Throttling factor in `(0, 1]`.
    pub intensity: f64,
    /// Remaining attributes, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Position on the token ring.
///
/// Murmur3 tokens fit in an `i64` but `RandomPartitioner` tokens reach
/// `2^127 - 1`, so the full signed 128-bit width is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub i128);

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i128(self.0)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Asking for i128 makes serde_json parse the digits exactly instead of
        // widening large integers to f64.
        deserializer.deserialize_i128(TokenVisitor)
    }
}

struct TokenVisitor;

impl Visitor<'_> for TokenVisitor {
    type Value = Token;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("an integer ring token")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Token, E> {
        Ok(Token(value.into()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Token, E> {
        Ok(Token(value.into()))
    }

    fn visit_i128<E: de::Error>(self, value: i128) -> Result<Token, E> {
        Ok(Token(value))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<Token, E> {
        i128::try_from(value)
            .map(Token)
            .map_err(|_| E::invalid_value(Unexpected::Other("token above i128 range"), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Token, E> {
        value
            .parse()
            .map(Token)
            .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
    }
}

/// Token interval `[start, end)` on the ring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RingRange {
    /// First token.
    pub start: Token,
    /// Last token.
    pub end: Token,
}

/// Token range of a segment: the base range plus the sub-ranges it covers.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentTokenRange {
    /// Range the segment was cut from.
    pub base_range: RingRange,
    /// Sub-ranges repaired as part of the segment.
    pub token_ranges: Vec<RingRange>,
    /// Remaining attributes, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SegmentTokenRange {
    /// Sub-ranges ordered by their start token.
    #[must_use]
    pub fn sorted_ranges(&self) -> Vec<RingRange> {
        let mut ranges = self.token_ranges.clone();
        ranges.sort_by_key(|range| range.start);
        ranges
    }
}

/// Replicas of a segment. Older services send a host list, newer ones map
/// each host to its datacenter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Replicas {
    /// Plain host list.
    Hosts(Vec<String>),
    /// Host to datacenter mapping.
    ByDatacenter(BTreeMap<String, String>),
}

impl Replicas {
    /// Host names regardless of the payload shape.
    #[must_use]
    pub fn hosts(&self) -> Vec<&str> {
        match self {
            Self::Hosts(hosts) => hosts.iter().map(String::as_str).collect(),
            Self::ByDatacenter(hosts) => hosts.keys().map(String::as_str).collect(),
        }
    }
}

impl Default for Replicas {
    fn default() -> Self {
        Self::Hosts(Vec::new())
    }
}

/// One token-range unit of work within a repair run.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepairSegment {
    /// Opaque segment identifier.
    pub id: String,
    /// Current lifecycle state.
    pub state: SegmentState,
    /// Failed attempts so far.
    pub fail_count: u32,
    /// Nodes holding the segment's data.
    pub replicas: Replicas,
    /// Start of the current or last attempt, epoch milliseconds.
    pub start_time: Option<i64>,
    /// End of the last attempt, epoch milliseconds.
    pub end_time: Option<i64>,
    /// Token range covered by the segment.
    pub token_range: SegmentTokenRange,
    /// Remaining attributes, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Segments and their token ranges are decoded by hand rather than through
// `#[serde(flatten)]`: flattening buffers every value through `deserialize_any`,
// which turns tokens wider than 64 bits into lossy floats.

fn required<T, E: de::Error>(value: Option<T>, field: &'static str) -> Result<T, E> {
    value.ok_or_else(|| E::missing_field(field))
}

impl<'de> Deserialize<'de> for SegmentTokenRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SegmentTokenRangeVisitor)
    }
}

struct SegmentTokenRangeVisitor;

impl<'de> Visitor<'de> for SegmentTokenRangeVisitor {
    type Value = SegmentTokenRange;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a segment token range")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut base_range = None;
        let mut token_ranges = None;
        let mut extra = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "baseRange" => base_range = Some(map.next_value()?),
                "tokenRanges" => token_ranges = Some(map.next_value()?),
                other => {
                    let value = map.next_value()?;
                    extra.insert(other.to_owned(), value);
                }
            }
        }
        Ok(SegmentTokenRange {
            base_range: required(base_range, "baseRange")?,
            token_ranges: token_ranges.unwrap_or_default(),
            extra,
        })
    }
}

impl<'de> Deserialize<'de> for RepairSegment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RepairSegmentVisitor)
    }
}

struct RepairSegmentVisitor;

impl<'de> Visitor<'de> for RepairSegmentVisitor {
    type Value = RepairSegment;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a repair segment")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut id = None;
        let mut state = None;
        let mut fail_count = None;
        let mut replicas = None;
        let mut start_time = None;
        let mut end_time = None;
        let mut token_range = None;
        let mut extra = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "id" => id = Some(map.next_value()?),
                "state" => state = Some(map.next_value()?),
                "failCount" => fail_count = Some(map.next_value()?),
                "replicas" => replicas = Some(map.next_value()?),
                "startTime" => start_time = map.next_value()?,
                "endTime" => end_time = map.next_value()?,
                "tokenRange" => token_range = Some(map.next_value()?),
                other => {
                    let value = map.next_value()?;
                    extra.insert(other.to_owned(), value);
                }
            }
        }
        Ok(RepairSegment {
            id: required(id, "id")?,
            state: required(state, "state")?,
            fail_count: required(fail_count, "failCount")?,
            replicas: replicas.unwrap_or_default(),
            start_time,
            end_time,
            token_range: required(token_range, "tokenRange")?,
            extra,
        })
    }
}

impl RepairSegment {
    /// Elapsed milliseconds of the current or last attempt.
    ///
    /// Open segments are measured against `now_ms`; segments that never
    /// started have no duration.
    #[must_use]
    pub fn duration_ms(&self, now_ms: i64) -> Option<i64> {
        let start = self.start_time?;
        let end = self.end_time.unwrap_or(now_ms);
        Some(end.saturating_sub(start))
    }
}

/// Ordering of segments by start time with never-started segments last.
#[must_use]
pub fn compare_segment_start(left: &RepairSegment, right: &RepairSegment) -> Ordering {
    let key = |segment: &RepairSegment| segment.start_time.unwrap_or(i64::MAX);
    key(left).cmp(&key(right))
}

/// Repair throttling factor, guaranteed to lie in `(0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, PartialOrd)]
#[serde(transparent)]
pub struct Intensity(f64);

/// Rejections produced while validating an intensity.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidIntensity {
    /// Input was not a floating point number.
    #[error("intensity must be a floating point number, got '{input}'")]
    NotANumber {
        /// Raw input.
        input: String,
    },
    /// Value lies outside `(0.0, 1.0]`.
    #[error("intensity must be greater than 0.0 and at most 1.0, got {value}")]
    OutOfRange {
        /// Rejected value.
        value: f64,
    },
}

impl Intensity {
    /// Validate a raw intensity.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIntensity::OutOfRange`] unless `0.0 < value <= 1.0`
    /// (which also rejects NaN).
    pub fn new(value: f64) -> Result<Self, InvalidIntensity> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(InvalidIntensity::OutOfRange { value })
        }
    }

    /// Underlying value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl FromStr for Intensity {
    type Err = InvalidIntensity;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let value = input
            .trim()
            .parse::<f64>()
            .map_err(|_| InvalidIntensity::NotANumber {
                input: input.to_string(),
            })?;
        Self::new(value)
    }
}

impl Display for Intensity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
