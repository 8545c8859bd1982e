use anyhow::{anyhow, Context};
use tracing_subscriber::EnvFilter;

use po_autotranslate::model::config::Config;
use po_autotranslate::services::{catalog::CatalogUpdater, driver};

fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_logging(&config.log_level)?;

    let updater =
        CatalogUpdater::from_config(&config).context("failed to set up translation backends")?;

    // Per-locale failures are already logged; they do not change the exit status.
    driver::run(&config, &updater).context("failed to start the worker pool")?;

    Ok(())
}

fn init_logging(default_level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("invalid log_level {default_level:?}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}
