//! Magnetization analysis over previously saved majority files

use crate::io::{majority_files, RunLabel};
use color_eyre::eyre::{eyre, Result, WrapErr};
use spinlab::analysis::{
    ising_critical_temperature, magnetization_from_majority, onsager_magnetization,
};
use spinlab::observables::{mean, std_error};
use spinlab::partition::parse_rows;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Magnetization estimate at one temperature
#[derive(Debug, Clone, PartialEq)]
pub struct TemperaturePoint {
    pub temperature: f64,
    pub samples: usize,
    pub magnetization: f64,
    pub error: f64,
    /// Exact spontaneous magnetization, 2D Ising only
    pub onsager: Option<f64>,
}

/// Analyse every temperature sub-folder of a run folder.
///
/// A missing folder, or one without any majority files, is reported and
/// yields no points whatever its name.
pub fn analyze_folder(dir: &Path) -> Result<Vec<TemperaturePoint>> {
    if !dir.is_dir() {
        warn!("Data folder {} does not exist, nothing to analyse", dir.display());
        return Ok(Vec::new());
    }

    let mut sampled = Vec::new();
    for (temperature, folder) in temperature_folders(dir)? {
        let files = majority_files(&folder)?;
        if files.is_empty() {
            debug!("No majority files at T = {}", temperature);
            continue;
        }
        sampled.push((temperature, files));
    }
    if sampled.is_empty() {
        warn!("No sampled configurations found in {}", dir.display());
        return Ok(Vec::new());
    }

    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| eyre!("Invalid data folder name: {}", dir.display()))?;
    let label = RunLabel::parse(name)
        .ok_or_else(|| eyre!("Folder {} does not look like a run folder", name))?;
    if label.model == "xy" || label.model == "ffxy" {
        warn!("Rotor models have no majority partition, nothing to analyse");
        return Ok(Vec::new());
    }
    let units = label.lattice()?.volume() * label.arity();
    if label.model == "ising" {
        if let Some(tc) = ising_critical_temperature(label.dimension) {
            info!("Reference critical temperature T_c = {:.4}", tc);
        }
    }

    let mut points = Vec::new();
    for (temperature, files) in sampled {
        let magnetizations = files
            .iter()
            .map(|file| {
                let text = fs::read_to_string(file)
                    .wrap_err_with(|| format!("Unable to read {}", file.display()))?;
                let rows = parse_rows(&text)?;
                Ok(magnetization_from_majority(rows.len(), units))
            })
            .collect::<Result<Vec<f64>>>()?;

        points.push(TemperaturePoint {
            temperature,
            samples: magnetizations.len(),
            magnetization: mean(&magnetizations),
            error: std_error(&magnetizations),
            onsager: (label.model == "ising" && label.dimension == 2)
                .then(|| onsager_magnetization(temperature)),
        });
    }
    Ok(points)
}

/// Sub-folders named by a temperature, in increasing temperature order
fn temperature_folders(dir: &Path) -> Result<Vec<(f64, PathBuf)>> {
    let mut folders = fs::read_dir(dir)
        .wrap_err_with(|| format!("Unable to read data folder: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .filter_map(|path| {
            let t = path.file_name()?.to_str()?.parse::<f64>().ok()?;
            Some((t, path))
        })
        .collect::<Vec<_>>();
    folders.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(folders)
}
