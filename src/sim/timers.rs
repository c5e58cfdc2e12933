//! Session timers (drop cooldown, combo decay)
//!
//! Each kind has a single slot holding its due time. Arming overwrites the
//! slot and cancelling empties it, so re-arming debounces and a cancelled
//! timer has nothing left that could fire later.

/// Timer kinds owned by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Re-opens the drop gate
    DropCooldown,
    /// Resets the combo counter
    ComboDecay,
}

impl TimerKind {
    const ALL: [TimerKind; 2] = [TimerKind::DropCooldown, TimerKind::ComboDecay];

    fn slot(self) -> usize {
        match self {
            TimerKind::DropCooldown => 0,
            TimerKind::ComboDecay => 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    due_ms: [Option<u64>; 2],
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) a timer to fire at `due_ms`
    pub fn arm(&mut self, kind: TimerKind, due_ms: u64) {
        self.due_ms[kind.slot()] = Some(due_ms);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.due_ms[kind.slot()] = None;
    }

    pub fn cancel_all(&mut self) {
        self.due_ms = [None; 2];
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.due_ms[kind.slot()].is_some()
    }

    pub fn due(&self, kind: TimerKind) -> Option<u64> {
        self.due_ms[kind.slot()]
    }

    /// Disarm and return every timer due at or before `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: u64) -> Vec<TimerKind> {
        let mut fired: Vec<(u64, TimerKind)> = Vec::new();
        for kind in TimerKind::ALL {
            let slot = &mut self.due_ms[kind.slot()];
            if let Some(due) = *slot {
                if due <= now_ms {
                    *slot = None;
                    fired.push((due, kind));
                }
            }
        }
        fired.sort_by_key(|&(due, _)| due);
        fired.into_iter().map(|(_, kind)| kind).collect()
    }
}
