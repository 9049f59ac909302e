use crate::app::analysis::TemperaturePoint;
use spinlab::simulation::SamplerStats;
use spinlab::TrialOutcome;
use tracing::info;

pub fn report_trial(outcome: &TrialOutcome) {
    let summary = outcome.summary();
    match outcome.stats {
        SamplerStats::Metropolis(stats) => info!(
            "  Trial {:>3}: acceptance {:.3}",
            outcome.trial,
            stats.acceptance_rate()
        ),
        SamplerStats::Wolff(stats) => info!(
            "  Trial {:>3}: {} clusters, mean size {:.2}",
            outcome.trial,
            stats.clusters,
            stats.mean_cluster_size()
        ),
    }
    info!(
        "             <|m|> = {:.6} ± {:.6}, chi = {:.6}",
        summary.mean_abs_magnetization, summary.abs_magnetization_error, summary.susceptibility
    );
    if let (Some(e), Some(de), Some(c)) =
        (summary.mean_energy, summary.energy_error, summary.specific_heat)
    {
        info!("             <e> = {:.6} ± {:.6}, C = {:.6}", e, de, c);
    }
}

pub fn report_temperature(temperature: f64, outcomes: &[TrialOutcome]) {
    let magnetizations: Vec<f64> = outcomes
        .iter()
        .map(|o| o.summary().mean_abs_magnetization)
        .collect();
    info!(
        "T = {:<8} <|m|> over {} trial(s): {:.6}",
        temperature,
        outcomes.len(),
        spinlab::observables::mean(&magnetizations)
    );
}

pub fn report_analysis(points: &[TemperaturePoint]) {
    if points.is_empty() {
        return;
    }
    info!("\n{:>8} {:>7} {:>10} {:>10} {:>10}", "T", "samples", "m", "error", "onsager");
    for p in points {
        let onsager = p
            .onsager
            .map(|m| format!("{m:.6}"))
            .unwrap_or_else(|| "-".to_string());
        info!(
            "{:>8.3} {:>7} {:>10.6} {:>10.6} {:>10}",
            p.temperature, p.samples, p.magnetization, p.error, onsager
        );
    }
}
