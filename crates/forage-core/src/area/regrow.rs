use crate::resource::ResourceId;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RegrowTimer {
    fire_at: u64,
    resource: ResourceId,
    generation: u32,
}

/// Single-shot regrow timers keyed by fixed-step tick.
///
/// Timers are never removed on cancellation; a manual reset bumps the
/// resource's generation and the stale entry is dropped when it comes due.
#[derive(Clone, Debug, Default)]
pub(crate) struct RegrowSchedule {
    heap: BinaryHeap<Reverse<RegrowTimer>>,
}

impl RegrowSchedule {
    pub(crate) fn schedule(&mut self, resource: ResourceId, generation: u32, fire_at: u64) {
        self.heap.push(Reverse(RegrowTimer {
            fire_at,
            resource,
            generation,
        }));
    }

    /// Pops every timer due at or before `now`, earliest first.
    pub(crate) fn pop_due(&mut self, now: u64) -> Vec<(ResourceId, u32)> {
        let mut due = Vec::new();
        while let Some(Reverse(timer)) = self.heap.peek() {
            if timer.fire_at > now {
                break;
            }
            due.push((timer.resource, timer.generation));
            self.heap.pop();
        }
        due
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    /// Every queued timer, stale or not, in no particular order.
    pub(crate) fn timers(&self) -> impl Iterator<Item = (ResourceId, u32)> + '_ {
        self.heap
            .iter()
            .map(|Reverse(timer)| (timer.resource, timer.generation))
    }
}
