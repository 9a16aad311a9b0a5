use crate::error::{ReduceError, Result, WindowSide};
use crate::reducer::AveragedSeries;
use crate::series::round_to;
use std::f64::consts::PI;

/// Two time ranges, each bounding one peak of the same oscillation cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleWindow {
    first: (f64, f64),
    second: (f64, f64),
}

impl CycleWindow {
    /// Create a window pair, requiring `a1 < a2 <= b1 < b2`.
    ///
    /// # Errors
    /// Returns [`ReduceError::InvalidWindow`] if a bound is not finite or
    /// the ordering is violated.
    pub fn new(first: (f64, f64), second: (f64, f64)) -> Result<Self> {
        let (a1, a2) = first;
        let (b1, b2) = second;
        if [a1, a2, b1, b2].iter().any(|bound| !bound.is_finite()) {
            return Err(ReduceError::InvalidWindow(format!(
                "bounds must be finite, but are {first:?} and {second:?}"
            )));
        }
        if !(a1 < a2 && a2 <= b1 && b1 < b2) {
            return Err(ReduceError::InvalidWindow(format!(
                "bounds must satisfy a1 < a2 <= b1 < b2, but are {first:?} and {second:?}"
            )));
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> (f64, f64) {
        self.first
    }

    pub fn second(&self) -> (f64, f64) {
        self.second
    }

    fn start(&self) -> f64 {
        self.first.0
    }

    fn end(&self) -> f64 {
        self.second.1
    }
}

/// Parameters of a two-peak cycle analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleAnalysis {
    pub window: CycleWindow,
    /// Configuration scale of the pendulum entering `g = 4 pi^2 scale / T^2`.
    pub scale: u32,
}

/// A located peak: its time and angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub time: f64,
    pub angle: f64,
}

/// Outcome of a cycle analysis over the windowed averaged series.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleResult {
    pub windowed: AveragedSeries,
    pub peaks: [Peak; 2],
    /// Seconds, rounded to 1 decimal.
    pub period: f64,
    /// m/s^2, rounded to 2 decimals.
    pub gravity: f64,
}

impl CycleAnalysis {
    /// Locate both peaks of the cycle and derive period and gravity.
    ///
    /// # Errors
    /// Returns [`ReduceError::EmptyWindow`] if a peak window holds no
    /// samples and [`ReduceError::InvalidWindow`] if both peaks coincide.
    pub fn run(&self, avg: &AveragedSeries) -> Result<CycleResult> {
        let window = &self.window;
        let windowed = avg.restrict(window.start(), window.end());
        log::debug!(
            "{} samples in [{}, {}]",
            windowed.len(),
            window.start(),
            window.end()
        );

        let first = find_peak(&windowed, |t| t <= window.first.1)
            .ok_or(ReduceError::EmptyWindow(WindowSide::First))?;
        let second = find_peak(&windowed, |t| t >= window.second.0)
            .ok_or(ReduceError::EmptyWindow(WindowSide::Second))?;

        let period = round_to(second.time - first.time, 1);
        if period <= 0.0 {
            return Err(ReduceError::InvalidWindow(format!(
                "peaks at {} s and {} s do not resolve a period",
                first.time, second.time
            )));
        }
        let gravity = round_to(gravity_from_period(period, self.scale), 2);

        Ok(CycleResult {
            windowed,
            peaks: [first, second],
            period,
            gravity,
        })
    }
}

/// Simple-pendulum relation `g = 4 pi^2 scale / T^2`.
pub fn gravity_from_period(period: f64, scale: u32) -> f64 {
    4.0 * PI.powi(2) * scale as f64 / period.powi(2)
}

/// Maximum angle among samples whose time passes `in_range`.
///
/// Ties resolve to the earliest sample.
fn find_peak<F>(series: &AveragedSeries, in_range: F) -> Option<Peak>
where
    F: Fn(f64) -> bool,
{
    series
        .time
        .iter()
        .zip(&series.angle)
        .filter(|&(&time, _)| in_range(time))
        .fold(None, |best: Option<Peak>, (&time, &angle)| match best {
            Some(peak) if peak.angle >= angle => Some(peak),
            _ => Some(Peak { time, angle }),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(time: &[f64], angle: &[f64]) -> AveragedSeries {
        AveragedSeries {
            time: time.to_vec(),
            angle: angle.to_vec(),
        }
    }

    fn analysis(first: (f64, f64), second: (f64, f64), scale: u32) -> CycleAnalysis {
        CycleAnalysis {
            window: CycleWindow::new(first, second).unwrap(),
            scale,
        }
    }

    #[test]
    fn locates_peaks_and_period() {
        let avg = series(
            &[0.9, 1.0, 1.1, 1.2, 1.3, 1.5, 1.8, 2.0, 2.2, 2.3, 2.4, 2.5, 2.6],
            &[40.0, 5.0, 20.0, 30.0, 10.0, 0.0, -30.0, 0.0, 20.0, 28.0, 15.0, 1.0, 50.0],
        );
        let res = analysis((1.0, 1.5), (2.0, 2.5), 1).run(&avg).unwrap();

        assert_eq!(res.peaks[0], Peak { time: 1.2, angle: 30.0 });
        assert_eq!(res.peaks[1], Peak { time: 2.3, angle: 28.0 });
        assert_eq!(res.period, 1.1);
        assert_eq!(res.windowed.time.first(), Some(&1.0));
        assert_eq!(res.windowed.time.last(), Some(&2.5));

        let expected = round_to(4.0 * PI * PI / (1.1 * 1.1), 2);
        assert_eq!(res.gravity, expected);
        assert!(res.peaks[0].time < res.peaks[1].time);
    }

    #[test]
    fn ties_resolve_to_first_sample() {
        let avg = series(
            &[0.0, 0.1, 0.2, 0.3, 1.0, 1.1, 1.2],
            &[1.0, 5.0, 5.0, 2.0, 4.0, 4.0, 3.0],
        );
        let res = analysis((0.0, 0.3), (1.0, 1.2), 2).run(&avg).unwrap();
        assert_eq!(res.peaks[0].time, 0.1);
        assert_eq!(res.peaks[1].time, 1.0);
        assert_eq!(res.period, 0.9);
    }

    #[test]
    fn period_halves_round_to_even() {
        let avg = series(&[0.25, 0.3, 1.4, 1.5], &[9.0, 0.0, 0.0, 9.0]);
        let res = analysis((0.2, 0.4), (1.4, 1.6), 1).run(&avg).unwrap();
        assert_eq!(res.period, 1.2);
        assert_eq!(res.gravity, 27.42);
    }

    #[test]
    fn empty_windows_are_reported() {
        let avg = series(&[0.0, 0.5, 1.0], &[1.0, 2.0, 3.0]);

        let err = analysis((5.0, 6.0), (7.0, 8.0), 1).run(&avg).unwrap_err();
        assert!(matches!(err, ReduceError::EmptyWindow(WindowSide::First)));

        let err = analysis((0.0, 0.5), (2.0, 3.0), 1).run(&avg).unwrap_err();
        assert!(matches!(err, ReduceError::EmptyWindow(WindowSide::Second)));
    }

    #[test]
    fn coinciding_peaks_are_rejected() {
        let avg = series(&[0.9, 1.0, 1.1], &[0.0, 9.0, 0.0]);
        let err = analysis((0.9, 1.0), (1.0, 1.1), 1).run(&avg).unwrap_err();
        assert!(matches!(err, ReduceError::InvalidWindow(_)));
    }

    #[test]
    fn window_ordering_is_validated() {
        assert!(CycleWindow::new((1.0, 1.5), (1.5, 2.0)).is_ok());
        for (first, second) in [
            ((1.5, 1.0), (2.0, 2.5)),
            ((1.0, 1.5), (1.4, 2.5)),
            ((1.0, 1.5), (2.5, 2.0)),
            ((1.0, 1.0), (2.0, 2.5)),
            ((f64::NAN, 1.5), (2.0, 2.5)),
        ] {
            assert!(matches!(
                CycleWindow::new(first, second),
                Err(ReduceError::InvalidWindow(_))
            ));
        }
    }

    #[test]
    fn gravity_follows_pendulum_relation() {
        let g = gravity_from_period(2.0, 1);
        assert!((g - PI * PI).abs() < 1e-12);
        assert!((gravity_from_period(1.0, 3) - 12.0 * PI * PI).abs() < 1e-9);
    }
}
