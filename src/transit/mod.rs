//! Real-time transit resolution
//!
//! Turns a (stop, line, operator?) query into arrival estimates using the
//! SIRI stop-monitoring feed, with operator disambiguation when several
//! operators run the same line number at a stop.

pub mod alerts;
pub mod feed;
pub mod resolver;
pub mod visits;

pub use alerts::{AlertSource, ServiceAlertsClient};
pub use feed::{FeedClient, SiriFeedClient};
pub use resolver::TransitResolver;
pub use visits::VehicleVisit;

use crate::error::{HelpyError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request for arrival times
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitQuery {
    /// Stop code as written on the stop sign
    pub stop_number: String,
    /// Published line name
    pub line_number: String,
    /// Operator id when already known
    pub operator_id: Option<String>,
}

impl TransitQuery {
    /// Build a query, trimming every field
    ///
    /// # Errors
    ///
    /// Returns [`HelpyError::InvalidArguments`] when the stop or line is
    /// empty after trimming
    ///
    /// # Examples
    ///
    /// ```
    /// use helpy::transit::TransitQuery;
    ///
    /// let query = TransitQuery::new(" 123 ", "5", Some("  ")).unwrap();
    /// assert_eq!(query.stop_number, "123");
    /// assert_eq!(query.operator_id, None);
    /// assert!(TransitQuery::new("", "5", None).is_err());
    /// ```
    pub fn new(stop_number: &str, line_number: &str, operator_id: Option<&str>) -> Result<Self> {
        let stop_number = stop_number.trim();
        let line_number = line_number.trim();
        if stop_number.is_empty() {
            return Err(HelpyError::InvalidArguments("stop_number is required".to_string()).into());
        }
        if line_number.is_empty() {
            return Err(HelpyError::InvalidArguments("line_number is required".to_string()).into());
        }
        Ok(Self {
            stop_number: stop_number.to_string(),
            line_number: line_number.to_string(),
            operator_id: operator_id
                .map(str::trim)
                .filter(|op| !op.is_empty())
                .map(str::to_string),
        })
    }

    /// Same query with the operator fixed
    pub fn with_operator(&self, operator_id: impl Into<String>) -> Self {
        Self {
            operator_id: Some(operator_id.into()),
            ..self.clone()
        }
    }
}

/// Why a resolution failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The real-time feed errored or timed out
    FeedUnavailable,
    /// No operator runs the line at the stop within the preview window
    NoOperatorFound,
}

/// Outcome of [`TransitResolver::resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// Arrivals were found (possibly all already due)
    Success {
        /// Stop code
        stop: String,
        /// Published line name
        line: String,
        /// Operator id
        operator: String,
        /// Human-readable operator label (`local / display`, or the id)
        operator_label: String,
        /// Feed line reference of the first matching visit; keys service alerts
        line_ref: Option<String>,
        /// Minutes until each arrival in feed order; `None` when already due
        etas: Vec<Option<i64>>,
    },
    /// Several operators run this line at this stop
    AmbiguousOperator {
        /// Distinct (line, operator id) pairs in first-seen feed order
        candidates: Vec<(String, String)>,
        /// `"{idx}. {local} / {display}"`, 1-indexed, same length as `candidates`
        display_options: Vec<String>,
    },
    /// The query could not be answered
    Failure {
        /// Failure category
        kind: FailureKind,
        /// Localized user-facing reason
        reason: String,
    },
}

/// Source of the current time
///
/// Injected so ETA computation is deterministic in tests.
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
