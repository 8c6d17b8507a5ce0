//! Trailing-edge debouncing keyed by slot.
//!
//! Every `arm` call for a slot supersedes the previous one. After the window
//! elapses, only the most recent arming can `claim` the slot; earlier ones
//! find themselves outdated and drop out.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;

pub(crate) struct Debouncer<K> {
    window: Duration,
    state: Mutex<State<K>>,
}

struct State<K> {
    /// Generations are unique across slots, so a stale ticket can never
    /// match a slot that was claimed and re-armed in the meantime.
    next: u64,
    latest: HashMap<K, u64>,
}

impl<K: Eq + Hash> Debouncer<K> {
    pub(crate) fn new(window: Duration) -> Self {
        Self { window, state: Mutex::new(State { next: 0, latest: HashMap::new() }) }
    }

    pub(crate) fn window(&self) -> Duration {
        self.window
    }

    /// Records a new trigger for `slot` and returns its generation.
    pub(crate) fn arm(&self, slot: K) -> u64 {
        let mut state = self.state.lock();
        state.next += 1;
        let generation = state.next;
        state.latest.insert(slot, generation);
        generation
    }

    /// Takes `slot` if `generation` is still its latest trigger.
    pub(crate) fn claim(&self, slot: &K, generation: u64) -> bool {
        let mut state = self.state.lock();
        if state.latest.get(slot) == Some(&generation) {
            state.latest.remove(slot);
            true
        } else {
            false
        }
    }

    /// Slots armed and not yet claimed.
    pub(crate) fn pending(&self) -> usize {
        self.state.lock().latest.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_latest_arming_claims() {
        let d = Debouncer::new(Duration::from_millis(500));
        let first = d.arm("motd");
        let second = d.arm("motd");
        let other = d.arm("pvp");

        assert_eq!(d.pending(), 2);
        assert!(!d.claim(&"motd", first));
        assert!(d.claim(&"motd", second));
        assert!(!d.claim(&"motd", second), "a slot is claimed once");
        assert!(d.claim(&"pvp", other));
        assert_eq!(d.pending(), 0);
    }

    #[test]
    fn stale_ticket_cannot_claim_a_rearmed_slot() {
        let d = Debouncer::new(Duration::from_millis(500));
        let stale = d.arm("motd");
        let current = d.arm("motd");
        assert!(d.claim(&"motd", current));

        let fresh = d.arm("motd");
        assert!(!d.claim(&"motd", stale));
        assert!(d.claim(&"motd", fresh));
    }
}
