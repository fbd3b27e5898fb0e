//! Pure filters over a SIRI stop-monitoring snapshot
//!
//! Every function tolerates missing keys at any level: an absent field is
//! treated as "no match", never as an error.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Location of the visit array inside the snapshot
const VISITS_POINTER: &str = "/Siri/ServiceDelivery/StopMonitoringDelivery/0/MonitoredStopVisit";

/// One predicted vehicle arrival at a stop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleVisit {
    /// `MonitoringRef`: the stop code
    pub stop_ref: Option<String>,
    /// `LineRef`: feed-internal route id
    pub line_ref: Option<String>,
    /// `DirectionRef`
    pub direction_ref: Option<String>,
    /// `PublishedLineName`: the number shown to riders
    pub published_line_name: Option<String>,
    /// `OperatorRef`: agency id
    pub operator_ref: Option<String>,
    /// `MonitoredCall.ExpectedArrivalTime`, unparsed
    pub expected_arrival_time: Option<String>,
}

impl VehicleVisit {
    /// Read a visit from one `MonitoredStopVisit` element
    pub fn from_value(element: &Value) -> Self {
        let journey = element.get("MonitoredVehicleJourney");
        let journey_field = |key: &str| journey.and_then(|j| j.get(key)).and_then(scalar_string);
        Self {
            stop_ref: element.get("MonitoringRef").and_then(scalar_string),
            line_ref: journey_field("LineRef"),
            direction_ref: journey_field("DirectionRef"),
            published_line_name: journey_field("PublishedLineName"),
            operator_ref: journey_field("OperatorRef"),
            expected_arrival_time: journey
                .and_then(|j| j.get("MonitoredCall"))
                .and_then(|call| call.get("ExpectedArrivalTime"))
                .and_then(scalar_string),
        }
    }

    fn matches(&self, stop: &str, line: &str) -> bool {
        self.stop_ref.as_deref() == Some(stop) && self.published_line_name.as_deref() == Some(line)
    }
}

/// Feeds are inconsistent about quoting ids; numbers are accepted as strings
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// All visits in the snapshot, in feed order
pub fn monitored_visits(snapshot: &Value) -> Vec<VehicleVisit> {
    snapshot
        .pointer(VISITS_POINTER)
        .and_then(Value::as_array)
        .map(|elements| elements.iter().map(VehicleVisit::from_value).collect())
        .unwrap_or_default()
}

/// Distinct (line, operator) pairs serving `line` at `stop`
///
/// Pairs appear in first-seen feed order. Visits without an operator are
/// ignored since they cannot be selected later.
pub fn operators_for_line(visits: &[VehicleVisit], stop: &str, line: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for visit in visits.iter().filter(|v| v.matches(stop, line)) {
        let Some(operator) = visit.operator_ref.as_ref() else {
            continue;
        };
        let pair = (line.to_string(), operator.clone());
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }
    pairs
}

/// Visits matching stop, line and operator exactly, in feed order
pub fn visits_for<'a>(
    visits: &'a [VehicleVisit],
    stop: &str,
    line: &str,
    operator: &str,
) -> Vec<&'a VehicleVisit> {
    visits
        .iter()
        .filter(|v| v.matches(stop, line) && v.operator_ref.as_deref() == Some(operator))
        .collect()
}

/// Parse an arrival timestamp
///
/// RFC 3339 values are used as-is. Anything else has its fixed-width
/// six-character zone suffix removed and is read as local wall time.
pub fn parse_arrival(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let cut = raw.len().checked_sub(6)?;
    let naive_part = raw.get(..cut)?;
    let naive = NaiveDateTime::parse_from_str(naive_part, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Whole minutes until `raw`, or `None` when due, past or unparseable
///
/// # Examples
///
/// ```
/// use chrono::{DateTime, Utc};
/// use helpy::transit::visits::eta_minutes;
///
/// let now = DateTime::parse_from_rfc3339("2024-05-01T10:00:00+03:00").unwrap().with_timezone(&Utc);
/// assert_eq!(eta_minutes("2024-05-01T10:05:30+03:00", now), Some(5));
/// assert_eq!(eta_minutes("2024-05-01T10:00:00+03:00", now), None);
/// assert_eq!(eta_minutes("2024-05-01T09:58:00+03:00", now), None);
/// ```
pub fn eta_minutes(raw: &str, now: DateTime<Utc>) -> Option<i64> {
    let arrival = parse_arrival(raw)?;
    let delta_ms = (arrival - now).num_milliseconds();
    if delta_ms <= 0 {
        None
    } else {
        Some(delta_ms / 60_000)
    }
}
