//! On-disk layout of sampled data
//!
//! ```text
//! <data_dir>/Data_<d>d_<model>_<algorithm>_N=<N>_K=<K>/<T>/<stamp>_<trial>.txt
//! ```
//!
//! The main file holds one whitespace-delimited row per majority-aligned unit
//! (discrete models) or one `coords angle` row per site (rotor models).
//! `_series.txt` and `_config.txt` companions hold the observable series and
//! the raw configuration.

use color_eyre::eyre::{Result, WrapErr};
use spinlab::model::SnapshotValues;
use spinlab::{Lattice, RunParameters, TrialOutcome};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Identity of a run folder, parsed from or rendered into its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLabel {
    pub dimension: usize,
    pub model: String,
    pub algorithm: String,
    pub size: usize,
    pub sweeps: usize,
}

impl RunLabel {
    pub fn of(params: &RunParameters) -> Self {
        Self {
            dimension: params.dimension,
            model: params.model.name().to_string(),
            algorithm: params.algorithm.name().to_string(),
            size: params.size,
            sweeps: params.sweeps,
        }
    }

    /// Parse a folder name such as `Data_2d_square_ice_metropolis_N=16_K=1000`.
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("Data_")?;
        let mut tail = rest.rsplitn(3, '_');
        let sweeps = tail.next()?.strip_prefix("K=")?.parse().ok()?;
        let size = tail.next()?.strip_prefix("N=")?.parse().ok()?;
        let head = tail.next()?;

        let (dimension, head) = head.split_once('_')?;
        let dimension = dimension.strip_suffix('d')?.parse().ok()?;
        let (model, algorithm) = head.rsplit_once('_')?;
        Some(Self {
            dimension,
            model: model.to_string(),
            algorithm: algorithm.to_string(),
            size,
            sweeps,
        })
    }

    /// Spins per site: one for vertex models, one per axis for edge models.
    pub fn arity(&self) -> usize {
        match self.model.as_str() {
            "gauge" | "square_ice" => self.dimension,
            _ => 1,
        }
    }

    pub fn lattice(&self) -> Result<Lattice> {
        Ok(Lattice::hypercubic(self.dimension, self.size)?)
    }
}

impl fmt::Display for RunLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Data_{}d_{}_{}_N={}_K={}",
            self.dimension, self.model, self.algorithm, self.size, self.sweeps
        )
    }
}

/// Which companion files to write next to each trial
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    pub series: bool,
    pub configuration: bool,
}

/// Writes trial results below a data directory
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
    options: SaveOptions,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>, options: SaveOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_dir(&self, params: &RunParameters) -> PathBuf {
        self.root.join(RunLabel::of(params).to_string())
    }

    pub fn temperature_dir(&self, params: &RunParameters) -> PathBuf {
        self.run_dir(params).join(params.temperature.to_string())
    }

    /// Write one trial, returning the path of its main file.
    pub fn save_trial(&self, params: &RunParameters, outcome: &TrialOutcome, stamp: u64) -> Result<PathBuf> {
        let dir = self.temperature_dir(params);
        fs::create_dir_all(&dir)
            .wrap_err_with(|| format!("Unable to create data folder: {}", dir.display()))?;

        let stem = format!("{}_{}", stamp, outcome.trial);
        let main = dir.join(format!("{stem}.txt"));
        let body = match (&outcome.majority, &outcome.snapshot.values) {
            (Some(partition), _) => partition.to_rows(),
            (None, SnapshotValues::Angles(angles)) => angle_rows(&params.lattice()?, angles),
            (None, SnapshotValues::Discrete(_)) => String::new(),
        };
        write_file(&main, &body)?;

        if self.options.series {
            write_file(&dir.join(format!("{stem}_series.txt")), &series_rows(outcome))?;
        }
        if self.options.configuration {
            write_file(&dir.join(format!("{stem}_config.txt")), &configuration_rows(outcome))?;
        }
        Ok(main)
    }
}

/// Seconds since the Unix epoch, used to stamp trial files
pub fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Majority files of one temperature folder, sorted by name
pub fn majority_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = fs::read_dir(dir)
        .wrap_err_with(|| format!("Unable to read data folder: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_majority_file(path))
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

fn is_majority_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file()
        && name.ends_with(".txt")
        && !name.ends_with("_series.txt")
        && !name.ends_with("_config.txt")
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    let mut file = fs::File::create(path)
        .wrap_err_with(|| format!("Unable to create file: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .wrap_err_with(|| format!("Unable to write file: {}", path.display()))?;
    Ok(())
}

fn angle_rows(lattice: &Lattice, angles: &[f64]) -> String {
    let mut out = String::new();
    for (site, theta) in angles.iter().enumerate() {
        for c in lattice.coords(site) {
            out.push_str(&format!("{c} "));
        }
        out.push_str(&format!("{theta:.4}\n"));
    }
    out
}

fn series_rows(outcome: &TrialOutcome) -> String {
    let series = &outcome.series;
    let mut out = String::from("# magnetization susceptibility");
    if series.tracks_energy() {
        out.push_str(" energy");
    }
    out.push('\n');
    for k in 0..series.len() {
        out.push_str(&format!(
            "{:.6} {:.6}",
            series.magnetization()[k],
            series.susceptibility()[k]
        ));
        if let Some(e) = series.energy().get(k) {
            out.push_str(&format!(" {e:.6}"));
        }
        out.push('\n');
    }
    out
}

fn configuration_rows(outcome: &TrialOutcome) -> String {
    let snapshot = &outcome.snapshot;
    let shape: Vec<String> = snapshot.shape.iter().map(|n| n.to_string()).collect();
    let mut out = format!("# shape {} arity {}\n", shape.join(" "), snapshot.arity);
    match &snapshot.values {
        SnapshotValues::Discrete(values) => {
            for chunk in values.chunks(snapshot.arity) {
                let row: Vec<String> = chunk.iter().map(|s| s.to_string()).collect();
                out.push_str(&row.join(" "));
                out.push('\n');
            }
        }
        SnapshotValues::Angles(values) => {
            for theta in values {
                out.push_str(&format!("{theta:.4}\n"));
            }
        }
    }
    out
}
