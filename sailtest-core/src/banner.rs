//! Startup banner of the server under test.
//!
//! The server announces where it listens with a single stdout line such as
//! `saild started 127.0.0.1:2525`.

use std::fmt;

use winnow::combinator::preceded;
use winnow::prelude::*;
use winnow::token::rest;

use crate::error::{HarnessError, Result};

pub const DEFAULT_BANNER_PREFIX: &str = "saild started ";

/// Address the server under test listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Extract the listening address from a banner line.
pub fn parse_banner(line: &str, prefix: &str) -> Result<ServerAddress> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut input = line;
    let announced = banner_body(&mut input, prefix)
        .map_err(|_| HarnessError::Launch(format!("error initializing: {line:?}")))?;

    let token = announced.rsplit(' ').next().unwrap_or_default();
    let (host, port) = token
        .rsplit_once(':')
        .ok_or_else(|| HarnessError::Launch(format!("no address in banner: {line:?}")))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| HarnessError::Launch(format!("bad port in banner: {line:?}")))?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(HarnessError::Launch(format!("no host in banner: {line:?}")));
    }

    Ok(ServerAddress::new(host, port))
}

fn banner_body<'i>(input: &mut &'i str, prefix: &str) -> ModalResult<&'i str> {
    preceded(prefix, rest).parse_next(input)
}
