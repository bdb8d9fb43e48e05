use std::collections::BTreeMap;

use common::{AbsenceAction, AbsenceMap};

/// Local view of one module's counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleState {
    /// Last value received from the server.
    pub base_count: u32,
    /// Delta of the request currently in flight.
    pub pending_delta: i32,
    /// Deltas of requests the server refused; shown until the next authoritative mapping.
    pub rejected_delta: i32,
    pub in_flight: bool,
}

impl ModuleState {
    /// Count shown to the user, never negative.
    pub fn displayed(&self) -> u32 {
        let total = i64::from(self.base_count)
            + i64::from(self.pending_delta)
            + i64::from(self.rejected_delta);
        u32::try_from(total.max(0)).unwrap_or(u32::MAX)
    }
}

/// Why a tap did not produce a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The module already has a request in flight.
    InFlight,
    /// `remove` while the displayed count is zero.
    AtZero,
}

/// Synchronous state machine behind [`crate::SyncClient`].
///
/// Every transition is a plain method call; the caller performs the network I/O between
/// [`SyncState::begin`] and one of [`SyncState::confirm`], [`SyncState::reject`] or
/// [`SyncState::network_failure`]. Those three return true when the in-flight set just
/// drained with an error pending, in which case the caller must fetch the full mapping once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    modules: BTreeMap<i32, ModuleState>,
    in_flight: usize,
    had_error: bool,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(&self, module_id: i32) -> ModuleState {
        self.modules.get(&module_id).copied().unwrap_or_default()
    }

    pub fn displayed(&self, module_id: i32) -> u32 {
        self.module(module_id).displayed()
    }

    /// Displayed counts of every module known locally.
    pub fn displayed_counts(&self) -> AbsenceMap {
        self.modules
            .iter()
            .map(|(id, module)| (*id, module.displayed()))
            .collect()
    }

    pub fn is_in_flight(&self, module_id: i32) -> bool {
        self.module(module_id).in_flight
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// Replaces every base count with the server mapping. Modules missing from it are zero.
    /// The mapping is authoritative, so rejected deltas are dropped.
    pub fn apply_snapshot(&mut self, server: &AbsenceMap) {
        for (module_id, module) in self.modules.iter_mut() {
            module.base_count = server.get(module_id).copied().unwrap_or(0);
            module.rejected_delta = 0;
        }
        for (module_id, count) in server {
            self.modules.entry(*module_id).or_insert(ModuleState {
                base_count: *count,
                ..Default::default()
            });
        }
    }

    /// Starts a mutation: applies the optimistic delta and marks the module in flight.
    pub fn begin(&mut self, module_id: i32, action: AbsenceAction) -> Result<(), IgnoreReason> {
        let module = self.modules.entry(module_id).or_default();
        if module.in_flight {
            return Err(IgnoreReason::InFlight);
        }
        if action == AbsenceAction::Remove && module.displayed() == 0 {
            return Err(IgnoreReason::AtZero);
        }

        module.pending_delta += action.delta();
        module.in_flight = true;
        self.in_flight += 1;
        Ok(())
    }

    /// The server applied the mutation and returned its full mapping.
    pub fn confirm(&mut self, module_id: i32, action: AbsenceAction, server: &AbsenceMap) -> bool {
        self.apply_snapshot(server);
        self.modules.entry(module_id).or_default().pending_delta -= action.delta();
        self.had_error = false;
        self.finish(module_id)
    }

    /// The server answered but refused the mutation.
    pub fn reject(&mut self, module_id: i32, action: AbsenceAction) -> bool {
        let module = self.modules.entry(module_id).or_default();
        module.pending_delta -= action.delta();
        module.rejected_delta += action.delta();
        self.had_error = true;
        self.finish(module_id)
    }

    /// The request never completed. The delta is kept locally until the next reconciliation.
    pub fn network_failure(&mut self, module_id: i32, action: AbsenceAction) -> bool {
        let module = self.modules.entry(module_id).or_default();
        module.pending_delta -= action.delta();
        module.base_count = module.base_count.saturating_add_signed(action.delta());
        self.had_error = true;
        self.finish(module_id)
    }

    /// A reconciliation fetch failed; the next drain retries it.
    pub fn mark_error(&mut self) {
        self.had_error = true;
    }

    fn finish(&mut self, module_id: i32) -> bool {
        if let Some(module) = self.modules.get_mut(&module_id) {
            module.in_flight = false;
        }
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.in_flight == 0 && self.had_error {
            self.had_error = false;
            return true;
        }
        false
    }
}
