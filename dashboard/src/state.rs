use std::sync::Arc;

use chrono::NaiveDateTime;
use resources::{
    models::{RefreshPhase, RefreshStatus},
    objects::{hardware::HardwareNodeRecord, node::NodeRecord, pod::PodRecord},
};

/// Aggregated models of one completed refresh tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub nodes: Vec<NodeRecord>,
    pub pods: Vec<PodRecord>,
    pub hardware: Vec<HardwareNodeRecord>,
    pub updated_at: NaiveDateTime,
}

/// Published dashboard state. The snapshot is only ever replaced
/// wholesale, once per completed tick; a failed tick keeps the previous
/// snapshot around and surfaces the error through the phase.
#[derive(Debug)]
pub struct DashboardState {
    pub phase: RefreshPhase,
    pub snapshot: Option<Arc<Snapshot>>,
    pub last_error: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        DashboardState {
            phase: RefreshPhase::Idle,
            snapshot: None,
            last_error: None,
        }
    }

    pub fn begin(&mut self) {
        self.phase = RefreshPhase::Loading;
    }

    pub fn complete(&mut self, snapshot: Snapshot) {
        self.phase = RefreshPhase::Rendered;
        self.snapshot = Some(Arc::new(snapshot));
        self.last_error = None;
    }

    pub fn fail(&mut self, reason: String) {
        self.phase = RefreshPhase::Failed;
        self.last_error = Some(reason);
    }

    pub fn status(&self) -> RefreshStatus {
        RefreshStatus {
            phase: self.phase,
            last_updated: self.snapshot.as_ref().map(|snapshot| snapshot.updated_at),
            last_error: self.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;

    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            nodes: vec![],
            pods: vec![],
            hardware: vec![],
            updated_at: Local::now().naive_utc(),
        }
    }

    #[test]
    fn failed_tick_keeps_previous_snapshot() {
        let mut state = DashboardState::new();
        assert_eq!(state.phase, RefreshPhase::Idle);

        state.begin();
        assert_eq!(state.phase, RefreshPhase::Loading);

        state.complete(snapshot());
        assert_eq!(state.phase, RefreshPhase::Rendered);
        assert!(state.snapshot.is_some());

        state.begin();
        state.fail("node aggregation died".to_string());
        assert_eq!(state.phase, RefreshPhase::Failed);
        assert!(state.snapshot.is_some());
        assert_eq!(
            state.status().last_error.as_deref(),
            Some("node aggregation died")
        );

        state.begin();
        state.complete(snapshot());
        assert_eq!(state.status().last_error, None);
    }
}
