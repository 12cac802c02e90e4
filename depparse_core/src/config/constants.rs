//! Compile-time constants
//!
//! Limits that protect the parser against runaway inputs, and the fixed names
//! used inside a model directory.

pub mod logging {
    /// Events retained by the in-memory logger
    pub const EVENT_BUFFER_SIZE: usize = 10_000;

    /// Longer messages are truncated before they reach a sink
    pub const MAX_MESSAGE_LENGTH: usize = 4_096;
}

pub mod engine {
    /// Worker threads used when neither the options nor the environment say otherwise
    pub const DEFAULT_THREADS: usize = 8;

    pub const MAX_THREADS: usize = 256;
}

pub mod parsing {
    /// Sentences longer than this are rejected before parsing
    pub const MAX_SENTENCE_TOKENS: usize = 2_048;

    /// Covington is quadratic in sentence length; every family stays below
    /// `TRANSITION_BUDGET_FACTOR * (n + 1)^2 + TRANSITION_BUDGET_SLACK` transitions.
    pub const TRANSITION_BUDGET_FACTOR: usize = 2;
    pub const TRANSITION_BUDGET_SLACK: usize = 16;

    pub fn transition_budget(tokens: usize) -> usize {
        TRANSITION_BUDGET_FACTOR * (tokens + 1) * (tokens + 1) + TRANSITION_BUDGET_SLACK
    }
}

pub mod decision {
    /// Table name of the transition decision
    pub const TRANSITION_TABLE: &str = "T.TRANS";

    /// Prefix marking an arc-label table in decision settings
    pub const LABEL_PREFIX: &str = "A.";

    /// Joins transition and label symbols in combined decisions
    pub const COMBINED_SEPARATOR: char = '~';
}

pub mod model {
    pub const SYMBOL_TABLE_FILE: &str = "symboltables.sym";
    pub const GUIDE_FILE: &str = "guide.json";
    pub const OPTIONS_FILE: &str = "options.toml";
}
