#![allow(clippy::cargo_common_metadata)]

pub mod banner;
pub mod compare;
pub mod config;
pub mod error;
pub mod fixture;
pub mod mode;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use banner::ServerAddress;
pub use compare::ComparePolicy;
pub use error::{HarnessError, Result};
pub use fixture::{Conversation, Exchange};
pub use mode::RunMode;
