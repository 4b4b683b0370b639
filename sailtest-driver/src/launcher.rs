//! Launching the server under test
//!
//! The server is started as a child process and must announce its listening
//! address as the first line on stdout. The returned [`ServerProcess`] owns
//! the child; callers end every run with [`ServerProcess::terminate`].

use camino::Utf8PathBuf;
use sailtest_core::banner::{ServerAddress, parse_banner};
use sailtest_core::config::ServerConfig;
use sailtest_core::error::{HarnessError, Result};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ServerLauncher {
    program: String,
    args: Vec<String>,
    working_directory: Option<Utf8PathBuf>,
    banner_prefix: String,
}

impl ServerLauncher {
    pub fn new(program: impl Into<String>, banner_prefix: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_directory: None,
            banner_prefix: banner_prefix.into(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            program: config.command.clone(),
            args: config.args.clone(),
            working_directory: config.working_directory.clone(),
            banner_prefix: config.banner_prefix.clone(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Start the server. Its stdout is kept for the banner; stderr is
    /// forwarded to the log.
    pub fn spawn(&self) -> Result<ServerProcess> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_directory {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            HarnessError::Launch(format!("failed to start {}: {}", self.program, e))
        })?;
        info!("Started {} (pid {:?})", self.program, child.id());

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output("stderr", BufReader::new(stderr)));
        }
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Launch("server stdout unavailable".to_owned()))?;

        Ok(ServerProcess {
            child,
            stdout: Some(BufReader::new(stdout)),
            banner_prefix: self.banner_prefix.clone(),
        })
    }
}

/// A running server under test
pub struct ServerProcess {
    child: Child,
    stdout: Option<BufReader<ChildStdout>>,
    banner_prefix: String,
}

impl ServerProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the startup banner and return the address it announces.
    ///
    /// Output after the banner is drained into the log so the server never
    /// stalls on a full pipe.
    pub async fn read_banner(&mut self) -> Result<ServerAddress> {
        let mut stdout = self
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Launch("banner already consumed".to_owned()))?;

        let mut line = String::new();
        let read = stdout
            .read_line(&mut line)
            .await
            .map_err(|e| HarnessError::Launch(format!("failed to read banner: {}", e)))?;
        if read == 0 {
            return Err(HarnessError::Launch(
                "server closed stdout before printing its banner".to_owned(),
            ));
        }

        let address = parse_banner(&line, &self.banner_prefix)?;
        tokio::spawn(forward_output("stdout", stdout));
        Ok(address)
    }

    /// Kill the server and reap it. Consumes the handle, so the signal is
    /// sent once.
    pub async fn terminate(mut self) -> Option<ExitStatus> {
        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill server: {}", e);
        }
        match self.child.try_wait() {
            Ok(status) => {
                debug!("Server exited: {:?}", status);
                status
            }
            Err(e) => {
                warn!("Failed to reap server: {}", e);
                None
            }
        }
    }
}

async fn forward_output<R>(stream: &'static str, reader: R)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "sailtest::server", "[{}] {}", stream, line);
    }
}
