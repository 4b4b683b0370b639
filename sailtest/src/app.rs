use anyhow::{Context, Result};
use sailtest_core::config::Config;
use sailtest_core::mode::RunMode;
use sailtest_driver::run_session;
use tracing::{error, info};

pub async fn run(config: Config, mode: RunMode) -> Result<()> {
    let fixtures = config.fixture_paths();
    info!("Running {} fixture(s)", fixtures.len());

    let report = match run_session(&config, mode, &fixtures).await {
        Ok(report) => report,
        Err(e) => {
            if e.is_mismatch() {
                error!("Conformance failure: {}", e);
            } else {
                error!("Run aborted: {}", e);
            }
            return Err(e).context("sailtest run failed");
        }
    };

    if mode.is_generate() {
        let regenerated = report.completed.iter().filter(|o| o.regenerated).count();
        info!("Regenerated {} fixture(s)", regenerated);
    }
    Ok(())
}
