use crate::cycle::CycleResult;
use crate::reducer::AveragedSeries;
use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::{FontStyle, IntoFont};
use std::{
    ops::Range,
    path::{Path, PathBuf},
};

const PLOT_WIDTH: u32 = 1280;
const PLOT_HEIGHT: u32 = 720;
const FONT_SIZE_TITLE: i32 = 28;
const FONT_SIZE_AXIS_LABEL: i32 = 18;

/// Description of an angle-vs-time chart, independent of any backend.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleChart {
    pub title: String,
    pub points: Vec<(f64, f64)>,
    pub x_range: Range<f64>,
    /// Times of vertical reference lines (the located peaks).
    pub markers: Vec<f64>,
}

impl AngleChart {
    /// Whole averaged series, plotted from t = 0 to the last sample.
    pub fn full(avg: &AveragedSeries, format: &str) -> Self {
        let end = avg.time.last().copied().unwrap_or(0.0);
        Self {
            title: chart_title(format),
            points: zip_points(avg),
            x_range: 0.0..end,
            markers: Vec::new(),
        }
    }

    /// Windowed series of a cycle analysis with both peaks marked.
    pub fn cycle(res: &CycleResult, format: &str) -> Self {
        let time = &res.windowed.time;
        let start = time.first().copied().unwrap_or(0.0);
        let end = time.last().copied().unwrap_or(start);
        Self {
            title: chart_title(format),
            points: zip_points(&res.windowed),
            x_range: start..end,
            markers: res.peaks.iter().map(|peak| peak.time).collect(),
        }
    }

    fn y_range(&self) -> Range<f64> {
        let (min, max) = self
            .points
            .iter()
            .fold((0.0f64, 0.0f64), |(min, max), &(_, y)| (min.min(y), max.max(y)));
        let span = max - min;
        let padding = if span < 1e-6 { 1.0 } else { span * 0.1 };
        (min - padding)..(max + padding)
    }
}

/// Renders charts somewhere.
pub trait Plotter {
    fn plot(&mut self, chart: &AngleChart) -> Result<()>;
}

/// Writes each chart to a PNG file, replacing the previous one.
pub struct PngPlotter {
    file: PathBuf,
}

impl PngPlotter {
    pub fn new<P: AsRef<Path>>(file: P) -> Self {
        Self {
            file: file.as_ref().to_path_buf(),
        }
    }
}

impl Plotter for PngPlotter {
    fn plot(&mut self, chart: &AngleChart) -> Result<()> {
        let root = BitMapBackend::new(&self.file, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut x_range = chart.x_range.clone();
        if x_range.end <= x_range.start {
            x_range.end = x_range.start + 1.0;
        }
        let y_range = chart.y_range();

        let mut ctx = ChartBuilder::on(&root)
            .caption(
                &chart.title,
                ("sans-serif", FONT_SIZE_TITLE)
                    .into_font()
                    .style(FontStyle::Oblique),
            )
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;

        ctx.configure_mesh()
            .x_desc("Time (s)")
            .y_desc("θ (deg)")
            .light_line_style(BLACK.mix(0.05))
            .bold_line_style(BLACK.mix(0.15))
            .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL))
            .draw()?;

        ctx.draw_series(LineSeries::new(
            [(x_range.start, 0.0), (x_range.end, 0.0)],
            BLACK.mix(0.5).stroke_width(1),
        ))?;

        for &time in &chart.markers {
            ctx.draw_series(LineSeries::new(
                [(time, y_range.start), (time, y_range.end)],
                RED.mix(0.8).stroke_width(1),
            ))?;
        }

        ctx.draw_series(LineSeries::new(
            chart.points.iter().copied(),
            GREEN.stroke_width(2),
        ))?;

        root.present()
            .with_context(|| format!("failed to write {:?}", self.file))?;
        log::info!("wrote {:?}", self.file);
        Ok(())
    }
}

/// Title with the dataset descriptor embedded.
///
/// The descriptor is `format` without leading separators and file extension,
/// e.g. `_L1m.csv` gives `L1m`.
pub fn chart_title(format: &str) -> String {
    let descriptor = format.trim_start_matches(['_', '-', ' ', '.']);
    let descriptor = match descriptor.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => descriptor,
    };
    format!("Angular position vs. time ({descriptor})")
}

fn zip_points(series: &AveragedSeries) -> Vec<(f64, f64)> {
    series
        .time
        .iter()
        .copied()
        .zip(series.angle.iter().copied())
        .collect()
}
