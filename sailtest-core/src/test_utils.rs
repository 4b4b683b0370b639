//! Shared test utilities for the sailtest workspace
//!
//! Only available when the "test-utils" feature is enabled.

use crate::fixture::{Conversation, Exchange};

/// Build a conversation from a greeting and `(commands, replies)` turns
///
/// # Examples
///
/// ```
/// # use sailtest_core::test_utils::conversation;
/// let conv = conversation("220 ready", &[(&["HELO a"], &["250 ok"])]);
/// assert_eq!(conv.exchanges.len(), 1);
/// ```
pub fn conversation(greeting: &str, turns: &[(&[&str], &[&str])]) -> Conversation {
    Conversation {
        initial_response: greeting.to_owned(),
        exchanges: turns
            .iter()
            .map(|(commands, replies)| Exchange::new(commands.iter().copied(), replies.iter().copied()))
            .collect(),
    }
}

/// The conversation used by most end-to-end tests: greet, HELLO, QUIT.
pub fn hello_conversation() -> Conversation {
    conversation(
        "220 ready",
        &[(&["HELLO"], &["250 ok"]), (&["QUIT"], &["221 bye"])],
    )
}
