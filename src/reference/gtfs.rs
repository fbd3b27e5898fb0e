//! Static GTFS index for "which lines serve this stop"
//!
//! Follows the chain stops.txt (stop_code to stop_id), stop_times.txt
//! (stop_id to trip_ids), trips.txt (trip_id to route_id) and routes.txt
//! (route_id to names). Only the columns needed for that chain are kept in
//! memory; stop_times.txt is streamed.

use crate::error::{HelpyError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct StopRow {
    stop_id: String,
    #[serde(default)]
    stop_code: String,
}

#[derive(Debug, Deserialize)]
struct StopTimeRow {
    trip_id: String,
    stop_id: String,
}

#[derive(Debug, Deserialize)]
struct TripRow {
    route_id: String,
    trip_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RouteRow {
    route_id: String,
    #[serde(default)]
    route_short_name: String,
    #[serde(default)]
    route_long_name: String,
}

/// A line serving a stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// GTFS route id
    pub route_id: String,
    /// Number shown to riders
    pub short_name: String,
    /// Descriptive name
    pub long_name: String,
}

/// Lines found at a stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinesAtStop {
    /// Stop code that was queried
    pub stop_number: String,
    /// Distinct lines by short name, in routes.txt order
    pub lines: Vec<Line>,
}

impl LinesAtStop {
    /// Short names only
    pub fn short_names(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.short_name.clone()).collect()
    }
}

/// In-memory index over the four GTFS tables
#[derive(Debug, Clone, Default)]
pub struct GtfsTables {
    stop_ids_by_code: HashMap<String, String>,
    trips_by_stop: HashMap<String, Vec<String>>,
    route_by_trip: HashMap<String, String>,
    routes: Vec<RouteRow>,
}

impl GtfsTables {
    /// Load the index from a GTFS directory
    ///
    /// # Errors
    ///
    /// Returns [`HelpyError::ReferenceData`] if any of the four tables is
    /// missing or malformed
    pub fn load(dir: &Path) -> Result<Self> {
        let mut tables = Self::default();

        for_each_row(&dir.join("stops.txt"), |row: StopRow| {
            let code = row.stop_code.trim().to_string();
            if !code.is_empty() {
                tables.stop_ids_by_code.entry(code).or_insert(row.stop_id);
            }
        })?;

        for_each_row(&dir.join("stop_times.txt"), |row: StopTimeRow| {
            tables
                .trips_by_stop
                .entry(row.stop_id)
                .or_default()
                .push(row.trip_id);
        })?;

        for_each_row(&dir.join("trips.txt"), |row: TripRow| {
            tables.route_by_trip.insert(row.trip_id, row.route_id);
        })?;

        for_each_row(&dir.join("routes.txt"), |row: RouteRow| {
            tables.routes.push(row);
        })?;

        tracing::info!(
            "Loaded GTFS index from {}: {} stops, {} trips, {} routes",
            dir.display(),
            tables.stop_ids_by_code.len(),
            tables.route_by_trip.len(),
            tables.routes.len()
        );
        Ok(tables)
    }

    /// Load the index, falling back to an empty one on error
    ///
    /// Every lookup on an empty index is a miss.
    pub fn load_or_empty(dir: &Path) -> Self {
        Self::load(dir).unwrap_or_else(|e| {
            tracing::warn!("GTFS tables unavailable, stop lookups will fail: {}", e);
            Self::default()
        })
    }

    /// Lines serving `stop_code`, or `None` when the stop is unknown or
    /// has no trips or routes
    pub fn lines_at_stop(&self, stop_code: &str) -> Option<LinesAtStop> {
        let stop_code = stop_code.trim();
        let stop_id = self.stop_ids_by_code.get(stop_code)?;
        let trip_ids = self.trips_by_stop.get(stop_id)?;

        let route_ids: HashSet<&str> = trip_ids
            .iter()
            .filter_map(|trip| self.route_by_trip.get(trip))
            .map(String::as_str)
            .collect();

        let mut seen = HashSet::new();
        let lines: Vec<Line> = self
            .routes
            .iter()
            .filter(|route| route_ids.contains(route.route_id.as_str()))
            .filter(|route| seen.insert(route.route_short_name.clone()))
            .map(|route| Line {
                route_id: route.route_id.clone(),
                short_name: route.route_short_name.clone(),
                long_name: route.route_long_name.clone(),
            })
            .collect();

        if lines.is_empty() {
            return None;
        }

        Some(LinesAtStop {
            stop_number: stop_code.to_string(),
            lines,
        })
    }
}

fn for_each_row<T, F>(path: &Path, mut handle: F) -> Result<()>
where
    T: DeserializeOwned,
    F: FnMut(T),
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| {
            HelpyError::ReferenceData(format!("Failed to open {}: {}", path.display(), e))
        })?;

    for row in reader.deserialize::<T>() {
        let row = row.map_err(|e| {
            HelpyError::ReferenceData(format!("Invalid row in {}: {}", path.display(), e))
        })?;
        handle(row);
    }
    Ok(())
}

/// Resolves a stop code to the lines serving it
#[derive(Debug, Clone, Default)]
pub struct LinesAtStopResolver {
    tables: std::sync::Arc<GtfsTables>,
}

impl LinesAtStopResolver {
    /// Wrap a loaded index
    pub fn new(tables: GtfsTables) -> Self {
        Self {
            tables: std::sync::Arc::new(tables),
        }
    }

    /// Lines at `stop_number`
    ///
    /// # Errors
    ///
    /// Returns [`HelpyError::NotFound`] when the stop is unknown or has no
    /// lines
    pub fn resolve(&self, stop_number: &str) -> Result<LinesAtStop> {
        self.tables.lines_at_stop(stop_number).ok_or_else(|| {
            tracing::debug!("No lines found for stop {}", stop_number);
            HelpyError::NotFound(format!("No lines found for stop {}", stop_number)).into()
        })
    }
}
