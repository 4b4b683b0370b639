//! Conversation fixtures
//!
//! A fixture file records one full client/server conversation. Every line
//! carries a role prefix: `S: ` for lines the server sends and `C: ` for
//! lines the client sends. The first line is always the greeting the server
//! emits on connect; the rest are grouped into [`Exchange`]s by run length.
//!
//! ```text
//! S: 220 mail.example.org ESMTP
//! C: EHLO client.example.org
//! S: 250-mail.example.org
//! S: 250 8BITMIME
//! ```
//!
//! Parsing is lenient: lines without a known prefix are dropped.

use std::path::Path;

use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::rest;

use crate::error::{HarnessError, Result};

pub const CLIENT_PREFIX: &str = "C: ";
pub const SERVER_PREFIX: &str = "S: ";

/// Line terminator used on the wire and in fixture files.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Who authored a fixture line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

impl Role {
    pub fn prefix(self) -> &'static str {
        match self {
            Role::Client => CLIENT_PREFIX,
            Role::Server => SERVER_PREFIX,
        }
    }
}

/// One client turn and the server's reply to it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
    /// Lines sent by the client, without terminators. May be empty.
    pub command_lines: Vec<String>,
    /// Lines the server replies with, including continuation lines.
    pub response_lines: Vec<String>,
}

impl Exchange {
    pub fn new<C, R>(command_lines: C, response_lines: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            command_lines: command_lines.into_iter().map(Into::into).collect(),
            response_lines: response_lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// The full expected (or captured) exchange for one fixture file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    /// Single line the server sends before any command
    pub initial_response: String,
    pub exchanges: Vec<Exchange>,
}

impl Conversation {
    /// Parse the text of a fixture file. Never fails.
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// Build a conversation from raw prefixed lines.
    ///
    /// The first line is taken as the greeting whatever its prefix. Each
    /// following run of `C: ` lines and the run of `S: ` lines after it form
    /// one exchange; unrecognized lines are skipped and end the current run.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut lines = lines.into_iter();
        let initial_response = lines.next().map(greeting_text).unwrap_or_default();

        let mut lines = lines.map(classify_line).peekable();
        let mut exchanges = Vec::new();

        while let Some(line) = lines.peek() {
            if line.is_none() {
                lines.next();
                continue;
            }

            let mut exchange = Exchange::default();
            while let Some(Some((Role::Client, text))) = lines.peek() {
                exchange.command_lines.push(text.trim().to_owned());
                lines.next();
            }
            while let Some(Some((Role::Server, text))) = lines.peek() {
                exchange.response_lines.push(text.trim().to_owned());
                lines.next();
            }
            exchanges.push(exchange);
        }

        Self {
            initial_response,
            exchanges,
        }
    }

    /// Serialize back into fixture text, CRLF-terminated.
    pub fn unparse(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, Role::Server, &self.initial_response);
        for exchange in &self.exchanges {
            for line in &exchange.command_lines {
                push_line(&mut out, Role::Client, line);
            }
            for line in &exchange.response_lines {
                push_line(&mut out, Role::Server, line);
            }
        }
        out
    }

    /// Read and parse a fixture file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| HarnessError::Fixture {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::parse(&text))
    }

    /// Overwrite a fixture file with this conversation.
    pub async fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        tokio::fs::write(path, self.unparse())
            .await
            .map_err(|source| HarnessError::Fixture {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Split a fixture line into its role and text, if it carries a known prefix.
pub fn classify_line(line: &str) -> Option<(Role, &str)> {
    prefixed_line.parse(line).ok()
}

fn role(input: &mut &str) -> ModalResult<Role> {
    alt((
        CLIENT_PREFIX.value(Role::Client),
        SERVER_PREFIX.value(Role::Server),
    ))
    .parse_next(input)
}

fn prefixed_line<'i>(input: &mut &'i str) -> ModalResult<(Role, &'i str)> {
    (role, rest).parse_next(input)
}

// The greeting line loses its first three characters unconditionally.
fn greeting_text(line: &str) -> String {
    let text = match line.char_indices().nth(3) {
        Some((offset, _)) => &line[offset..],
        None => "",
    };
    text.trim_end_matches(['\r', '\n']).to_owned()
}

fn push_line(out: &mut String, role: Role, text: &str) {
    out.push_str(role.prefix());
    out.push_str(text);
    out.push_str(LINE_TERMINATOR);
}
