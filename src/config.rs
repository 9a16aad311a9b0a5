use crate::cycle::{CycleAnalysis, CycleWindow};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    ops::RangeBounds,
    path::{Path, PathBuf},
};

/// Dataset description.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path prefix shared by all files of the dataset.
    pub location: String,
    /// File-name suffix following the run index, also used in plot titles.
    pub format: String,
    /// Number of runs, numbered from 1.
    #[serde(default = "default_set_count")]
    pub set_count: usize,

    /// Cycle to analyze (optional).
    pub cycle: Option<CycleConfig>,

    /// Output files.
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CycleConfig {
    /// Time ranges `[[a1, a2], [b1, b2]]` bounding the two peaks.
    pub window: [[f64; 2]; 2],
    /// Configuration scale of the pendulum.
    pub scale: u32,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_plot_file")]
    pub plot_file: PathBuf,
    pub table_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plot_file: default_plot_file(),
            table_file: None,
        }
    }
}

fn default_set_count() -> usize {
    10
}

fn default_plot_file() -> PathBuf {
    PathBuf::from("angle.png")
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded. Relative paths are resolved against
    /// the directory containing the file. Performs validation on all
    /// parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let mut config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        if let Some(base_dir) = file.parent() {
            config.resolve_paths(base_dir);
        }

        Ok(config)
    }

    /// The cycle analysis requested by this dataset, if any.
    pub fn cycle_analysis(&self) -> Result<Option<CycleAnalysis>> {
        let Some(cycle) = &self.cycle else {
            return Ok(None);
        };
        let [[a1, a2], [b1, b2]] = cycle.window;
        let window = CycleWindow::new((a1, a2), (b1, b2))?;
        Ok(Some(CycleAnalysis {
            window,
            scale: cycle.scale,
        }))
    }

    fn validate(&self) -> Result<()> {
        if self.format.is_empty() {
            bail!("format must not be empty");
        }
        check_num(self.set_count, 1..1000).context("invalid number of sets")?;

        if let Some(cycle) = &self.cycle {
            check_num(cycle.scale, 1..10_000).context("invalid configuration scale")?;
        }
        self.cycle_analysis().context("invalid cycle")?;

        Ok(())
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        let location = Path::new(&self.location);
        if location.is_relative() {
            self.location = base_dir.join(location).to_string_lossy().into_owned();
        }
        if self.output.plot_file.is_relative() {
            self.output.plot_file = base_dir.join(&self.output.plot_file);
        }
        if let Some(table_file) = &mut self.output.table_file {
            if table_file.is_relative() {
                *table_file = base_dir.join(&table_file);
            }
        }
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse("location = \"data/set\"\nformat = \"_1m.csv\"\n").unwrap();
        assert_eq!(config.set_count, 10);
        assert_eq!(config.cycle, None);
        assert_eq!(config.output, OutputConfig::default());
        assert!(config.cycle_analysis().unwrap().is_none());
    }

    #[test]
    fn cycle_section_builds_analysis() {
        let text = r#"
location = "data/set"
format = "_1m.csv"
set_count = 3

[cycle]
window = [[1.0, 1.5], [2.0, 2.5]]
scale = 1
"#;
        let config = parse(text).unwrap();
        let analysis = config.cycle_analysis().unwrap().unwrap();
        assert_eq!(analysis.scale, 1);
        assert_eq!(analysis.window.first(), (1.0, 1.5));
        assert_eq!(analysis.window.second(), (2.0, 2.5));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse("location = \"a\"\nformat = \".csv\"\nset_count = 0\n").is_err());
        assert!(parse("location = \"a\"\nformat = \"\"\n").is_err());

        let bad_window = r#"
location = "a"
format = ".csv"
[cycle]
window = [[2.0, 1.5], [2.0, 2.5]]
scale = 1
"#;
        assert!(parse(bad_window).is_err());

        let bad_scale = r#"
location = "a"
format = ".csv"
[cycle]
window = [[1.0, 1.5], [2.0, 2.5]]
scale = 0
"#;
        assert!(parse(bad_scale).is_err());
    }

    #[test]
    fn resolves_relative_paths() {
        let mut config = parse(
            "location = \"runs/set\"\nformat = \".csv\"\n[output]\ntable_file = \"out.csv\"\n",
        )
        .unwrap();
        config.resolve_paths(Path::new("/data"));
        assert_eq!(config.location, "/data/runs/set");
        assert_eq!(config.output.plot_file, PathBuf::from("/data/angle.png"));
        assert_eq!(config.output.table_file, Some(PathBuf::from("/data/out.csv")));
    }
}
