//! Average tracker angle measurements of a pendulum and derive its period
//! and gravitational acceleration from one selected cycle.

pub mod config;
pub mod cycle;
pub mod error;
pub mod plot;
pub mod reducer;
pub mod series;
pub mod table;

pub use cycle::{CycleAnalysis, CycleWindow};
pub use error::{ReduceError, WindowSide};
pub use plot::{AngleChart, PngPlotter, Plotter};
pub use reducer::{AveragedSeries, SignalReducer};
pub use series::RawSeries;
pub use table::AnalysisTable;
