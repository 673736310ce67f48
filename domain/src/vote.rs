use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Agree,
    Disagree,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteChoice::Agree => "agree",
            VoteChoice::Disagree => "disagree",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "agree" => Ok(VoteChoice::Agree),
            "disagree" => Ok(VoteChoice::Disagree),
            other => Err(format!("unknown vote choice '{other}'")),
        }
    }
}

/// One locally persisted vote. `timestamp` is epoch milliseconds and purely
/// informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub choice: VoteChoice,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteStatus {
    pub voted: bool,
    pub choice: Option<VoteChoice>,
}

impl VoteStatus {
    pub fn not_voted() -> Self {
        Self::default()
    }

    pub fn voted(choice: VoteChoice) -> Self {
        Self {
            voted: true,
            choice: Some(choice),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteCounts {
    pub agree: u64,
    pub disagree: u64,
    pub total: u64,
}

impl VoteCounts {
    /// Agree/disagree shares in percent, one decimal. Zero total reads as 0.0.
    pub fn percentages(&self) -> (f64, f64) {
        if self.total == 0 {
            return (0.0, 0.0);
        }
        let pct = |n: u64| ((n as f64 / self.total as f64) * 1000.0).round() / 10.0;
        (pct(self.agree), pct(self.disagree))
    }
}

/// Displayed counts = server truth + at most one pending local vote.
///
/// The pending delta is never folded into `server`; it is either replaced by
/// a fresh server read (`confirm`) or dropped (`rollback`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteTally {
    server: VoteCounts,
    pending: Option<VoteChoice>,
}

impl VoteTally {
    pub fn new(server: VoteCounts) -> Self {
        Self {
            server,
            pending: None,
        }
    }

    pub fn server(&self) -> VoteCounts {
        self.server
    }

    pub fn pending(&self) -> Option<VoteChoice> {
        self.pending
    }

    pub fn apply_pending(&mut self, choice: VoteChoice) {
        self.pending = Some(choice);
    }

    pub fn confirm(&mut self, server: VoteCounts) {
        self.server = server;
        self.pending = None;
    }

    pub fn rollback(&mut self) {
        self.pending = None;
    }

    pub fn displayed(&self) -> VoteCounts {
        let mut counts = self.server;
        if let Some(choice) = self.pending {
            match choice {
                VoteChoice::Agree => counts.agree += 1,
                VoteChoice::Disagree => counts.disagree += 1,
            }
            counts.total += 1;
        }
        counts
    }
}
