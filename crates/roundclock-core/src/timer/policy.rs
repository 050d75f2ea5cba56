use serde::{Deserialize, Serialize};

/// Whether the sequence repeats, and how often.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "rounds")]
pub enum LoopPolicy {
    /// Run the sequence a fixed number of times. Values below 1 behave as 1.
    Rounds(u32),
    /// Repeat the sequence until stopped.
    Infinite,
}

impl LoopPolicy {
    /// A single pass through the sequence ("loop off").
    pub fn once() -> Self {
        LoopPolicy::Rounds(1)
    }

    pub fn rounds(n: u32) -> Self {
        LoopPolicy::Rounds(n.max(1))
    }

    /// Round budget, or `None` when unbounded.
    pub fn round_limit(self) -> Option<u32> {
        match self {
            LoopPolicy::Rounds(n) => Some(n.max(1)),
            LoopPolicy::Infinite => None,
        }
    }

    /// Whether 1-based `cycle` may be entered.
    pub fn allows_cycle(self, cycle: u32) -> bool {
        match self.round_limit() {
            Some(limit) => cycle <= limit,
            None => true,
        }
    }
}

impl Default for LoopPolicy {
    fn default() -> Self {
        LoopPolicy::once()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rounds_behaves_as_one() {
        let policy = LoopPolicy::Rounds(0);
        assert_eq!(policy.round_limit(), Some(1));
        assert!(policy.allows_cycle(1));
        assert!(!policy.allows_cycle(2));
        assert_eq!(LoopPolicy::rounds(0), LoopPolicy::once());
    }

    #[test]
    fn infinite_allows_everything() {
        assert!(LoopPolicy::Infinite.allows_cycle(u32::MAX));
        assert_eq!(LoopPolicy::Infinite.round_limit(), None);
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_string(&LoopPolicy::Rounds(3)).unwrap();
        assert_eq!(json, r#"{"mode":"rounds","rounds":3}"#);
        let parsed: LoopPolicy = serde_json::from_str(r#"{"mode":"infinite"}"#).unwrap();
        assert_eq!(parsed, LoopPolicy::Infinite);
    }
}
