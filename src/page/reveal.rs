use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

pub const THRESHOLD: f64 = 0.1;
pub const ROOT_MARGIN: &str = "0px 0px -50px 0px";
pub const STAGGER: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealPlan {
    /// Delay before each nested reveal element gets revealed, in document order.
    pub child_delays: Vec<Duration>,
}

/// Reveals each observed element once, the first time it intersects.
#[derive(Debug)]
pub struct RevealTracker<K> {
    revealed: HashSet<K>,
}

impl<K: Eq + Hash> Default for RevealTracker<K> {
    fn default() -> Self {
        Self {
            revealed: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash> RevealTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_revealed(&self, key: &K) -> bool {
        self.revealed.contains(key)
    }

    /// `Some` means reveal now and stop observing the element.
    pub fn on_intersection(
        &mut self,
        key: K,
        is_intersecting: bool,
        child_count: usize,
    ) -> Option<RevealPlan> {
        if !is_intersecting || !self.revealed.insert(key) {
            return None;
        }
        let child_delays = (0..child_count).map(|i| STAGGER * i as u32).collect();
        Some(RevealPlan { child_delays })
    }
}
