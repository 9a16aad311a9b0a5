use crate::cycle::CycleResult;
use crate::reducer::AveragedSeries;
use anyhow::{Context, Result};
use serde::Serialize;
use std::{fs::File, io::Write, path::Path};

/// One row of the result table.
///
/// `g` and `Per` are only present after a cycle analysis and then hold the
/// same value on every row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub t: f64,
    pub theta: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub g: Option<f64>,
    #[serde(rename = "Per", skip_serializing_if = "Option::is_none")]
    pub per: Option<f64>,
}

/// Result of a reduction: the averaged (or windowed) series, plus period
/// and gravity in cycle mode.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTable {
    series: AveragedSeries,
    cycle: Option<(f64, f64)>,
}

impl AnalysisTable {
    pub fn averaged(series: AveragedSeries) -> Self {
        Self {
            series,
            cycle: None,
        }
    }

    pub fn cycle(res: CycleResult) -> Self {
        Self {
            series: res.windowed,
            cycle: Some((res.period, res.gravity)),
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.series.time
    }

    pub fn angle(&self) -> &[f64] {
        &self.series.angle
    }

    /// Period in seconds, if a cycle was analyzed.
    pub fn period(&self) -> Option<f64> {
        self.cycle.map(|(period, _)| period)
    }

    /// Gravitational acceleration in m/s^2, if a cycle was analyzed.
    pub fn gravity(&self) -> Option<f64> {
        self.cycle.map(|(_, gravity)| gravity)
    }

    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.series
            .time
            .iter()
            .zip(&self.series.angle)
            .map(|(&t, &theta)| Row {
                t,
                theta,
                g: self.gravity(),
                per: self.period(),
            })
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in self.rows() {
            writer.serialize(row).context("failed to serialize row")?;
        }
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let writer = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        self.write_csv(writer)
            .with_context(|| format!("failed to write {file:?}"))
    }
}
