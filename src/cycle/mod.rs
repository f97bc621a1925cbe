//! Update cycles and their schedule.
//!
//! A cycle detects rendered days, scans and scores the remaining photos,
//! groups them by day and renders every group. The schedule runs one cycle
//! at startup and one per interval after that; cycles never overlap.

mod orchestrator;
mod schedule;

pub use orchestrator::{CycleError, CycleReport, UpdateCycle};
pub use schedule::{run_periodic, run_scheduled};
