use crate::backend::ActiveTarget;

/// Whether the composited output is stale relative to the layer store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateState {
    /// No `update_screen` since the last real composite.
    #[default]
    Clean,
    /// At least one `update_screen` since the last real composite.
    Dirty,
}

/// Counters describing deferred-update traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// `update_screen` calls.
    pub update_calls: u64,
    /// Rendezvous requests sent to the timing coordinator.
    pub rendezvous_requests: u64,
    /// Real composites performed.
    pub composites: u64,
}

/// Two-state clean/dirty tracker for deferred composites.
///
/// The flag is boolean: any number of `mark_dirty` calls between composites leave exactly one
/// composite outstanding.
#[derive(Debug, Default)]
pub(crate) struct UpdateScheduler {
    state: UpdateState,
    stats: UpdateStats,
}

impl UpdateScheduler {
    pub(crate) fn state(&self) -> UpdateState {
        self.state
    }

    pub(crate) fn stats(&self) -> UpdateStats {
        self.stats
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.state == UpdateState::Dirty
    }

    /// Record an `update_screen` call and decide whether the coordinator should be offered a
    /// switch. Gameplay updates rendezvous unless the host tolerates timing inaccuracies.
    pub(crate) fn mark_dirty(
        &mut self,
        inaccuracies_tolerated: bool,
        target: ActiveTarget,
    ) -> bool {
        self.state = UpdateState::Dirty;
        self.stats.update_calls = self.stats.update_calls.saturating_add(1);
        let rendezvous = !inaccuracies_tolerated && target == ActiveTarget::Game;
        if rendezvous {
            self.stats.rendezvous_requests = self.stats.rendezvous_requests.saturating_add(1);
        }
        rendezvous
    }

    pub(crate) fn complete(&mut self) {
        self.state = UpdateState::Clean;
        self.stats.composites = self.stats.composites.saturating_add(1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/scheduler.rs"]
mod tests;
