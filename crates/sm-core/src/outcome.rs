//! Pull outcomes and the machine event log

use serde::{Deserialize, Serialize};

use crate::paytable::WinKind;

/// A symbol that landed on the centre row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenterSymbol {
    pub reel: usize,
    /// Index of the symbol within its reel
    pub index: usize,
    pub identity: String,
}

/// Result of one complete pull
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// 1-based pull counter
    pub pull_id: u64,
    /// Centre-row identities concatenated in reel order
    pub combination: String,
    /// Centre-row symbols in reel order
    pub center_symbols: Vec<CenterSymbol>,
    /// Win category
    pub win: WinKind,
    /// Steps each reel travelled
    pub steps: Vec<u32>,
    /// Virtual time the pull started
    pub started_at_ms: f64,
    /// Virtual time the outcome was decided
    pub finished_at_ms: f64,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        self.win.is_win()
    }

    /// Wall time from pull to evaluation
    pub fn duration_ms(&self) -> f64 {
        self.finished_at_ms - self.started_at_ms
    }
}

/// What happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MachineEventKind {
    PullStarted { pull_id: u64, steps: Vec<u32> },
    ReelStopped { reel: usize, offset: usize },
    Evaluated { outcome: SpinOutcome },
}

/// A timestamped entry of the machine event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineEvent {
    pub at_ms: f64,
    #[serde(flatten)]
    pub kind: MachineEventKind,
}

impl MachineEvent {
    pub fn new(at_ms: f64, kind: MachineEventKind) -> Self {
        Self { at_ms, kind }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            MachineEventKind::PullStarted { .. } => "PULL_STARTED",
            MachineEventKind::ReelStopped { .. } => "REEL_STOPPED",
            MachineEventKind::Evaluated { .. } => "EVALUATED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(win: WinKind) -> SpinOutcome {
        SpinOutcome {
            pull_id: 1,
            combination: "eon".into(),
            center_symbols: vec![],
            win,
            steps: vec![3, 4, 5],
            started_at_ms: 100.0,
            finished_at_ms: 350.0,
        }
    }

    #[test]
    fn test_outcome_duration() {
        let o = outcome(WinKind::Regular);
        assert!(o.is_win());
        assert_eq!(o.duration_ms(), 250.0);
    }

    #[test]
    fn test_event_json_shape() {
        let event = MachineEvent::new(12.5, MachineEventKind::ReelStopped { reel: 2, offset: 7 });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "reel_stopped");
        assert_eq!(json["reel"], 2);
        assert_eq!(json["at_ms"], 12.5);
        assert_eq!(event.type_name(), "REEL_STOPPED");

        let back: MachineEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
