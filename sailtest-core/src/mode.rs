use crate::compare::ComparePolicy;

/// What a run does with the replies it receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Compare replies against the fixture
    Verify(ComparePolicy),
    /// Record replies into the fixture
    Generate,
}

impl RunMode {
    /// Pick the mode from the two command line switches, which are mutually
    /// exclusive. With both set, generation wins.
    pub fn from_flags(generate: bool, codes_only: bool) -> Self {
        if generate {
            RunMode::Generate
        } else if codes_only {
            RunMode::Verify(ComparePolicy::CodeOnly)
        } else {
            RunMode::Verify(ComparePolicy::Full)
        }
    }

    pub fn is_generate(self) -> bool {
        matches!(self, RunMode::Generate)
    }
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Verify(ComparePolicy::Full)
    }
}
