//! Runs fixture files against a listening server, one connection each.

use crate::driver::ConversationDriver;
use crate::transport::LineConnection;
use camino::{Utf8Path, Utf8PathBuf};
use sailtest_core::ServerAddress;
use sailtest_core::error::Result;
use sailtest_core::fixture::Conversation;
use sailtest_core::mode::RunMode;
use std::time::Duration;
use tracing::{debug, info};

/// What happened to one fixture that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureOutcome {
    pub path: Utf8PathBuf,
    pub exchanges: usize,
    /// The fixture file was rewritten with the captured replies
    pub regenerated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub completed: Vec<FixtureOutcome>,
}

impl RunReport {
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

pub struct FixtureRunner {
    address: ServerAddress,
    mode: RunMode,
    read_timeout: Option<Duration>,
}

impl FixtureRunner {
    pub fn new(address: ServerAddress, mode: RunMode) -> Self {
        Self {
            address,
            mode,
            read_timeout: None,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Run every fixture in order, stopping at the first failure.
    pub async fn run<P: AsRef<Utf8Path>>(&self, fixtures: &[P]) -> Result<RunReport> {
        let mut report = RunReport::default();
        for path in fixtures {
            let outcome = self.run_fixture(path.as_ref()).await?;
            report.completed.push(outcome);
        }
        info!("All {} fixture(s) passed", report.len());
        Ok(report)
    }

    /// Drive one fixture over a fresh connection. In generate mode the
    /// fixture file is rewritten once the conversation has completed.
    pub async fn run_fixture(&self, path: &Utf8Path) -> Result<FixtureOutcome> {
        let name = path.file_name().unwrap_or(path.as_str());
        let mut conversation = Conversation::load(path).await?;

        let mut connection = LineConnection::connect(&self.address)
            .await?
            .with_read_timeout(self.read_timeout);
        let result = ConversationDriver::new(&mut connection, self.mode, name)
            .drive(&mut conversation)
            .await;
        if let Err(e) = connection.shutdown().await {
            debug!("{}: closing connection failed: {}", name, e);
        }
        drop(connection);
        result?;

        let regenerated = self.mode.is_generate();
        if regenerated {
            let text = conversation.unparse();
            info!("Writing following text to {}:\n\n{}", path, text);
            conversation.store(path).await?;
        }

        info!("Completed test {} with no problems", name);
        Ok(FixtureOutcome {
            path: path.to_owned(),
            exchanges: conversation.exchanges.len(),
            regenerated,
        })
    }
}
