use crate::cycle::{CycleAnalysis, CycleResult};
use crate::error::{ReduceError, Result};
use crate::plot::{AngleChart, Plotter};
use crate::series::{RawSeries, round_to, series_path};
use crate::table::AnalysisTable;
use std::{collections::BTreeMap, io::Write};

/// Row-wise mean of several runs on the time base of run 1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AveragedSeries {
    pub time: Vec<f64>,
    pub angle: Vec<f64>,
}

impl AveragedSeries {
    /// Average all series index by index, truncating to the shortest one.
    ///
    /// Time is taken from the lowest series index. Returns `None` if `set` is empty.
    pub fn from_set(set: &BTreeMap<usize, RawSeries>) -> Option<Self> {
        let (&ref_idx, reference) = set.iter().next()?;
        let n_rows = set.values().map(RawSeries::len).min()?;

        if set.values().any(|series| series.len() != n_rows) {
            log::warn!("series lengths differ, truncating to {n_rows} samples");
        }
        for (idx, series) in set {
            if series.time[..n_rows] != reference.time[..n_rows] {
                log::warn!("time base of series {idx} differs from series {ref_idx}");
            }
        }

        let n_series = set.len() as f64;
        let angle = (0..n_rows)
            .map(|i_row| {
                let sum: f64 = set.values().map(|series| series.angle[i_row]).sum();
                round_to(sum / n_series, 2)
            })
            .collect();

        Some(Self {
            time: reference.time[..n_rows].to_vec(),
            angle,
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Samples with `start <= time <= end`.
    pub fn restrict(&self, start: f64, end: f64) -> Self {
        let (time, angle) = self
            .time
            .iter()
            .zip(&self.angle)
            .filter(|&(&t, _)| start <= t && t <= end)
            .map(|(&t, &angle)| (t, angle))
            .unzip();
        Self { time, angle }
    }
}

/// Loads a dataset, averages its runs and optionally analyzes one cycle.
///
/// Every call renders exactly one chart through the plotter; cycle analyses
/// also write a short report to `out`.
pub struct SignalReducer<P, W> {
    plotter: P,
    out: W,
}

impl<P: Plotter, W: Write> SignalReducer<P, W> {
    pub fn new(plotter: P, out: W) -> Self {
        Self { plotter, out }
    }

    pub fn plotter(&self) -> &P {
        &self.plotter
    }

    pub fn into_parts(self) -> (P, W) {
        (self.plotter, self.out)
    }

    /// Reduce the files `location + i + format` for `i` in `1..=set_count`.
    ///
    /// # Errors
    /// Fails on the first unreadable file, on malformed or empty cycle
    /// windows, and if the plot or report cannot be written.
    pub fn reduce(
        &mut self,
        location: &str,
        format: &str,
        cycle: Option<&CycleAnalysis>,
        set_count: usize,
    ) -> Result<AnalysisTable> {
        let set = load_set(location, format, set_count)?;
        let avg = AveragedSeries::from_set(&set).ok_or(ReduceError::NoSeries)?;
        log::info!("averaged {} series into {} samples", set.len(), avg.len());

        let Some(cycle) = cycle else {
            let chart = AngleChart::full(&avg, format);
            self.render(&chart)?;
            return Ok(AnalysisTable::averaged(avg));
        };

        let res = cycle.run(&avg)?;
        self.report(&res)?;

        let chart = AngleChart::cycle(&res, format);
        self.render(&chart)?;

        Ok(AnalysisTable::cycle(res))
    }

    fn render(&mut self, chart: &AngleChart) -> Result<()> {
        self.plotter
            .plot(chart)
            .map_err(|err| ReduceError::Plot(format!("{err:#}")))
    }

    fn report(&mut self, res: &CycleResult) -> Result<()> {
        let [first, second] = res.peaks;
        log::info!("period {} s, gravity {} m/s^2", res.period, res.gravity);
        writeln!(
            self.out,
            "maxima taken in the selected cycle: [{:.2} {:.2}]",
            first.angle, second.angle
        )?;
        writeln!(self.out, "T={} s", res.period)?;
        writeln!(self.out, "g={} m / s2", res.gravity)?;
        self.out.flush()?;
        Ok(())
    }
}

fn load_set(location: &str, format: &str, set_count: usize) -> Result<BTreeMap<usize, RawSeries>> {
    if set_count == 0 {
        return Err(ReduceError::NoSeries);
    }
    let mut set = BTreeMap::new();
    for idx in 1..=set_count {
        let series = RawSeries::from_file(series_path(location, idx, format))?;
        set.insert(idx, series);
    }
    log::info!("loaded {set_count} series from {location:?}");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(time: &[f64], angle: &[f64]) -> RawSeries {
        RawSeries {
            time: time.to_vec(),
            angle: angle.to_vec(),
        }
    }

    #[test]
    fn identical_series_average_to_themselves() {
        let set: BTreeMap<_, _> = (1..=3)
            .map(|idx| (idx, raw(&[0.0, 0.01, 0.02], &[10.0, -5.0, 0.0])))
            .collect();
        let avg = AveragedSeries::from_set(&set).unwrap();
        assert_eq!(avg.time, vec![0.0, 0.01, 0.02]);
        assert_eq!(avg.angle, vec![10.0, -5.0, 0.0]);
    }

    #[test]
    fn truncates_to_shortest_series() {
        let mut set = BTreeMap::new();
        set.insert(1, raw(&[0.0, 0.01, 0.02, 0.03], &[1.0, 2.0, 3.0, 4.0]));
        set.insert(2, raw(&[0.0, 0.01], &[2.0, 3.0]));
        set.insert(3, raw(&[0.0, 0.01, 0.02], &[3.0, 4.0, 5.0]));
        let avg = AveragedSeries::from_set(&set).unwrap();
        let min_len = set.values().map(RawSeries::len).min().unwrap();
        assert_eq!(avg.len(), min_len);
        assert_eq!(avg.time, vec![0.0, 0.01]);
        assert_eq!(avg.angle, vec![2.0, 3.0]);
    }

    #[test]
    fn mean_is_rounded_to_two_decimals() {
        let mut set = BTreeMap::new();
        set.insert(1, raw(&[0.0], &[1.0]));
        set.insert(2, raw(&[0.0], &[1.0]));
        set.insert(3, raw(&[0.0], &[2.0]));
        let avg = AveragedSeries::from_set(&set).unwrap();
        assert_eq!(avg.angle, vec![1.33]);
    }

    #[test]
    fn mean_halves_round_to_even() {
        let mut set = BTreeMap::new();
        set.insert(1, raw(&[0.0], &[0.25]));
        set.insert(2, raw(&[0.0], &[0.0]));
        let avg = AveragedSeries::from_set(&set).unwrap();
        assert_eq!(avg.angle, vec![0.12]);
    }

    #[test]
    fn empty_set_has_no_average() {
        assert!(AveragedSeries::from_set(&BTreeMap::new()).is_none());
    }

    #[test]
    fn restrict_is_inclusive() {
        let avg = AveragedSeries {
            time: vec![0.0, 0.5, 1.0, 1.5],
            angle: vec![1.0, 2.0, 3.0, 4.0],
        };
        let sub = avg.restrict(0.5, 1.0);
        assert_eq!(sub.time, vec![0.5, 1.0]);
        assert_eq!(sub.angle, vec![2.0, 3.0]);
        assert!(avg.restrict(2.0, 3.0).is_empty());
    }

    #[test]
    fn zero_set_count_is_rejected() {
        assert!(matches!(
            load_set("nowhere/set", ".csv", 0),
            Err(ReduceError::NoSeries)
        ));
    }
}
