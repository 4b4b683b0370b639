//! A complete harness run: launch, replay, tear down.

use crate::launcher::{ServerLauncher, ServerProcess};
use crate::runner::{FixtureRunner, RunReport};
use camino::Utf8PathBuf;
use sailtest_core::config::Config;
use sailtest_core::error::Result;
use sailtest_core::mode::RunMode;
use tracing::info;

/// Launch the configured server, run `fixtures` against it and terminate it.
///
/// The server is terminated on every path out of this function, whether the
/// fixtures passed, a fixture failed or the server never announced itself.
pub async fn run_session(config: &Config, mode: RunMode, fixtures: &[Utf8PathBuf]) -> Result<RunReport> {
    let mut server = ServerLauncher::from_config(&config.server).spawn()?;

    let result = replay(&mut server, config, mode, fixtures).await;

    let status = server.terminate().await;
    info!("Server terminated ({:?})", status);
    result
}

async fn replay(
    server: &mut ServerProcess,
    config: &Config,
    mode: RunMode,
    fixtures: &[Utf8PathBuf],
) -> Result<RunReport> {
    let address = server.read_banner().await?;
    info!("Server listening on {}", address);

    FixtureRunner::new(address, mode)
        .with_read_timeout(config.read_timeout())
        .run(fixtures)
        .await
}
