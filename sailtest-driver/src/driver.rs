//! Replays one conversation over a live connection.

use crate::transport::LineConnection;
use sailtest_core::compare::is_continuation;
use sailtest_core::error::{HarnessError, Result};
use sailtest_core::fixture::{Conversation, Exchange};
use sailtest_core::mode::RunMode;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace, warn};

/// Progress of a conversation through the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    AwaitingGreeting,
    ReadyForExchange,
    Done,
    Failed,
}

pub struct ConversationDriver<'c, S> {
    connection: &'c mut LineConnection<S>,
    mode: RunMode,
    fixture: String,
    state: DriverState,
}

impl<'c, S> ConversationDriver<'c, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(connection: &'c mut LineConnection<S>, mode: RunMode, fixture: impl Into<String>) -> Self {
        Self {
            connection,
            mode,
            fixture: fixture.into(),
            state: DriverState::AwaitingGreeting,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Run the whole conversation: greeting first, then every exchange in
    /// order. The first failure stops the conversation.
    ///
    /// In generate mode the greeting and replies received are written into
    /// `conversation` instead of being compared.
    pub async fn drive(&mut self, conversation: &mut Conversation) -> Result<()> {
        let result = self.drive_exchanges(conversation).await;
        self.state = match result {
            Ok(()) => DriverState::Done,
            Err(_) => DriverState::Failed,
        };
        result
    }

    async fn drive_exchanges(&mut self, conversation: &mut Conversation) -> Result<()> {
        self.greet(conversation).await?;

        let total = conversation.exchanges.len();
        for (index, exchange) in conversation.exchanges.iter_mut().enumerate() {
            debug!("{}: exchange {}/{}", self.fixture, index + 1, total);
            self.exchange(index, exchange).await?;
        }
        Ok(())
    }

    async fn greet(&mut self, conversation: &mut Conversation) -> Result<()> {
        let greeting = self.read_line().await?;
        trace!("S: {}", greeting);

        match self.mode {
            RunMode::Generate => conversation.initial_response = greeting,
            RunMode::Verify(_) if greeting != conversation.initial_response => {
                return Err(HarnessError::GreetingMismatch {
                    fixture: self.fixture.clone(),
                    expected: conversation.initial_response.clone(),
                    actual: greeting,
                });
            }
            RunMode::Verify(_) => {}
        }

        self.state = DriverState::ReadyForExchange;
        Ok(())
    }

    async fn exchange(&mut self, index: usize, exchange: &mut Exchange) -> Result<()> {
        for line in &exchange.command_lines {
            trace!("C: {}", line);
            self.connection.write_line(line).await?;
        }
        self.connection.flush().await?;

        let reply = self.read_reply().await?;

        match self.mode {
            RunMode::Generate => exchange.response_lines = reply,
            RunMode::Verify(policy) => {
                if reply.len() != exchange.response_lines.len() {
                    warn!(
                        "{}: exchange {} received {} line(s), fixture has {}; comparing the overlap only",
                        self.fixture,
                        index,
                        reply.len(),
                        exchange.response_lines.len()
                    );
                }
                if !policy.responses_match(&reply, &exchange.response_lines) {
                    return Err(HarnessError::ExchangeMismatch {
                        fixture: self.fixture.clone(),
                        exchange: index,
                        expected: exchange.response_lines.clone(),
                        actual: reply,
                    });
                }
            }
        }
        Ok(())
    }

    /// Read one reply block: lines are collected until one arrives without
    /// the continuation marker after its status code.
    pub async fn read_reply(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await?.trim().to_owned();
            trace!("S: {}", line);
            let more = is_continuation(&line);
            lines.push(line);
            if !more {
                return Ok(lines);
            }
        }
    }

    async fn read_line(&mut self) -> Result<String> {
        match self.connection.read_line().await {
            Ok(line) => Ok(line),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(HarnessError::ReadTimeout {
                fixture: self.fixture.clone(),
                after: self.connection.read_timeout().unwrap_or_default(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
