//! Scoreboard decoding
//!
//! Each character of the `Scoreboard` field is one worker slot. The tally
//! always carries every documented state, so label sets stay stable across
//! scrapes even when a state is momentarily unused.

use std::collections::BTreeMap;

/// Documented scoreboard symbols and their state labels
pub const SCOREBOARD_STATES: [(char, &str); 11] = [
    ('_', "idle"),
    ('S', "startup"),
    ('R', "read"),
    ('W', "reply"),
    ('K', "keepalive"),
    ('D', "dns"),
    ('C', "closing"),
    ('L', "logging"),
    ('G', "graceful_stop"),
    ('I', "idle_cleanup"),
    ('.', "open_slot"),
];

fn state_label(symbol: char) -> Option<&'static str> {
    SCOREBOARD_STATES
        .iter()
        .find(|(c, _)| *c == symbol)
        .map(|(_, label)| *label)
}

/// Worker slot counts per state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardTally {
    counts: BTreeMap<String, u64>,
}

impl ScoreboardTally {
    /// Decode a scoreboard string
    ///
    /// Symbols outside the documented table are counted under the symbol
    /// itself.
    pub fn decode(scoreboard: &str) -> Self {
        let mut counts: BTreeMap<String, u64> = SCOREBOARD_STATES
            .iter()
            .map(|(_, label)| (label.to_string(), 0))
            .collect();

        for symbol in scoreboard.chars() {
            let label = match state_label(symbol) {
                Some(label) => label.to_string(),
                None => symbol.to_string(),
            };
            *counts.entry(label).or_insert(0) += 1;
        }

        Self { counts }
    }

    /// Count for one state label
    pub fn get(&self, state: &str) -> u64 {
        self.counts.get(state).copied().unwrap_or(0)
    }

    /// Sum of all counts, equal to the number of slots decoded
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct states in the tally
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Always false: documented states are present even for an empty scoreboard
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate `(state, count)` pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
