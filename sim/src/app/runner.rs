use crate::app::report::{report_temperature, report_trial};
use crate::config::Config;
use crate::io::{timestamp, DataStore, SaveOptions};
use color_eyre::eyre::Result;
use spinlab::Simulation;
use tracing::info;

pub fn data_store(config: &Config) -> DataStore {
    DataStore::new(
        config.output.data_dir.as_deref().unwrap_or("data"),
        SaveOptions {
            series: config.output.save_series.unwrap_or(true),
            configuration: config.output.save_configuration.unwrap_or(false),
        },
    )
}

/// Sample every configured temperature and persist each trial.
pub fn run_sampling(config: &Config, store: &DataStore) -> Result<usize> {
    let temperatures = config.temperatures()?;
    // fail on bad parameters before the first temperature is sampled
    let plans = temperatures
        .iter()
        .map(|&t| config.run_parameters(t))
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Sampling {} temperature(s), {} trial(s) each, into {}",
        plans.len(),
        config.trials(),
        store.root().display()
    );

    let mut written = 0;
    for params in plans {
        let simulation = Simulation::new(params)?;
        let outcomes = simulation.run_trials(config.trials(), config.parallel());
        let stamp = timestamp();
        for outcome in &outcomes {
            report_trial(outcome);
            let path = store.save_trial(simulation.params(), outcome, stamp)?;
            info!("  Saved {}", path.display());
            written += 1;
        }
        report_temperature(simulation.params().temperature, &outcomes);
    }
    Ok(written)
}
