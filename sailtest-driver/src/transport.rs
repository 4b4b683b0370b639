//! Line-oriented transport to the server under test
//!
//! `LineConnection` wraps any bidirectional byte stream: a TCP socket in
//! normal runs, an in-memory `tokio::io::duplex` pipe in tests.

use sailtest_core::ServerAddress;
use sailtest_core::fixture::LINE_TERMINATOR;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

pub struct LineConnection<S> {
    stream: BufStream<S>,
    read_timeout: Option<Duration>,
}

impl LineConnection<TcpStream> {
    /// Open a TCP connection to the server.
    pub async fn connect(address: &ServerAddress) -> io::Result<Self> {
        let stream = TcpStream::connect((address.host.as_str(), address.port)).await?;
        stream.set_nodelay(true)?;
        debug!("Connected to {}", address);
        Ok(Self::new(stream))
    }
}

impl<S> LineConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufStream::new(stream),
            read_timeout: None,
        }
    }

    /// Bound how long `read_line` waits. `None` blocks until data arrives.
    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Queue one line followed by CRLF. Call [`flush`](Self::flush) to send.
    pub async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.write_all(LINE_TERMINATOR.as_bytes()).await
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        self.stream.flush().await
    }

    /// Read one line without its terminator.
    ///
    /// A closed peer yields an empty line. A configured deadline that passes
    /// yields an error of kind `TimedOut`.
    pub async fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let read = self.stream.read_line(&mut line);
        let bytes = match self.read_timeout {
            Some(limit) => timeout(limit, read).await.map_err(|_| {
                io::Error::new(io::ErrorKind::TimedOut, format!("no data within {limit:?}"))
            })??,
            None => read.await?,
        };

        if bytes == 0 {
            warn!("Connection closed by server");
        }

        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(line)
    }

    /// Flush pending output and close the write side.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}
