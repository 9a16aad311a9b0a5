use crate::error::{ReduceError, Result};
use csv::ReaderBuilder;
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

/// Header rows written by the tracker before the data.
const HEADER_ROWS: usize = 2;

/// Field delimiter of tracker exports; numbers use a decimal comma.
const FIELD_DELIMITER: u8 = b'.';

/// Tracker angles are measured from the horizontal with the wrong sign.
const ANGLE_OFFSET_DEG: f64 = 90.0;

/// One experimental run: time (s) and angle (deg) samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSeries {
    pub time: Vec<f64>,
    pub angle: Vec<f64>,
}

impl RawSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Load a series from a tracker export.
    ///
    /// # Errors
    /// Returns [`ReduceError::DataLoad`] if the file cannot be read or
    /// contains no parseable samples.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let reader = fs::File::open(file).map_err(|err| ReduceError::data_load(file, err))?;
        let series = Self::from_reader(reader, file)?;
        log::debug!("loaded {} samples from {file:?}", series.len());
        Ok(series)
    }

    /// Parse a tracker export from any reader; `origin` only labels errors.
    pub fn from_reader<R: Read>(mut reader: R, origin: &Path) -> Result<Self> {
        let mut contents = String::new();
        reader
            .read_to_string(&mut contents)
            .map_err(|err| ReduceError::data_load(origin, err))?;

        let body: String = contents.split_inclusive('\n').skip(HEADER_ROWS).collect();

        let mut csv_reader = ReaderBuilder::new()
            .delimiter(FIELD_DELIMITER)
            .has_headers(false)
            .flexible(true)
            .from_reader(body.as_bytes());

        let mut series = Self::default();
        for record in csv_reader.records() {
            let record = record.map_err(|err| ReduceError::data_load(origin, err))?;
            let line = record.position().map_or(0, |pos| pos.line()) as usize + HEADER_ROWS;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            if record.len() < 2 {
                return Err(ReduceError::data_load(
                    origin,
                    format!("line {line}: expected time and angle fields"),
                ));
            }

            let time = parse_decimal(&record[0]).ok_or_else(|| {
                ReduceError::data_load(origin, format!("line {line}: bad time {:?}", &record[0]))
            })?;
            let angle = parse_decimal(&record[1]).ok_or_else(|| {
                ReduceError::data_load(origin, format!("line {line}: bad angle {:?}", &record[1]))
            })?;

            series.time.push(round_to(time, 2));
            series.angle.push(correct_angle(angle));
        }

        if series.is_empty() {
            return Err(ReduceError::data_load(origin, "no samples after header"));
        }
        Ok(series)
    }
}

/// Path of series `idx` of a dataset: `location`, index and `format` concatenated.
pub fn series_path(location: &str, idx: usize, format: &str) -> PathBuf {
    PathBuf::from(format!("{location}{idx}{format}"))
}

/// Parse a decimal-comma number, ignoring a trailing unit marker such as `°`.
pub fn parse_decimal(field: &str) -> Option<f64> {
    let field = field
        .trim()
        .trim_end_matches(|c: char| !c.is_ascii_digit())
        .replace(',', ".");
    field.parse().ok()
}

pub fn correct_angle(raw_deg: f64) -> f64 {
    -(raw_deg + ANGLE_OFFSET_DEG)
}

/// Round to `digits` decimals, resolving exact halves to even.
pub fn round_to(val: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (val * scale).round_ties_even() / scale
}
