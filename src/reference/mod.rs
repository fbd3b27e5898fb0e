//! Static reference data
//!
//! Operator names from the agency table and the GTFS index used to list
//! the lines at a stop. Both are loaded once at startup and shared
//! read-only.

pub mod agency;
pub mod gtfs;

pub use agency::{OperatorDirectory, OperatorInfo};
pub use gtfs::{GtfsTables, Line, LinesAtStop, LinesAtStopResolver};
