//! Response comparison and reply-block framing.

/// Width of the status code that leads every reply line.
pub const CODE_WIDTH: usize = 3;

/// Marker at offset [`CODE_WIDTH`] announcing that more lines follow.
pub const CONTINUATION_MARKER: u8 = b'-';

/// How received reply lines are checked against the fixture
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ComparePolicy {
    /// Lines must be identical
    #[default]
    Full,
    /// Only the leading status code must match
    CodeOnly,
}

impl ComparePolicy {
    pub fn lines_match(self, actual: &str, expected: &str) -> bool {
        match self {
            ComparePolicy::Full => actual == expected,
            ComparePolicy::CodeOnly => status_code(actual) == status_code(expected),
        }
    }

    /// Compare two replies line by line.
    ///
    /// Only the overlapping prefix is checked: a reply with extra or missing
    /// lines still matches as long as the lines both sides have agree.
    pub fn responses_match<A, E>(self, actual: &[A], expected: &[E]) -> bool
    where
        A: AsRef<str>,
        E: AsRef<str>,
    {
        actual
            .iter()
            .zip(expected)
            .all(|(a, e)| self.lines_match(a.as_ref(), e.as_ref()))
    }
}

/// The leading status code of a reply line, shorter if the line is.
pub fn status_code(line: &str) -> &str {
    match line.char_indices().nth(CODE_WIDTH) {
        Some((offset, _)) => &line[..offset],
        None => line,
    }
}

/// Whether another line of the same reply block follows this one.
pub fn is_continuation(line: &str) -> bool {
    line.as_bytes().get(CODE_WIDTH) == Some(&CONTINUATION_MARKER)
}
