//! Deferred one-shot tasks
//!
//! Every delayed action is an explicit record owned by the simulation clock.
//! Tasks are never cancelled on state changes; each one carries what it needs
//! to re-validate itself when it fires.

use super::state::ItemId;

/// A deferred action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// The inspection timer for `item_id` ran out
    FinishInspection { item_id: ItemId },
    /// Autopilot press scheduled ahead of `target`'s predicted arrival
    AutopilotDuck { target: ItemId },
    /// Pop the actuator back up if press `press_seq` is still the active one
    ActuatorReturn { press_seq: u32 },
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    due_ms: f64,
    /// Insertion order, breaks ties between equal due times
    seq: u64,
    task: Task,
}

/// Pending tasks keyed by simulated due time
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: Vec<ScheduledTask>,
    next_seq: u64,
}

impl TaskQueue {
    /// Schedule `task` to fire `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(ScheduledTask {
            due_ms: now_ms + delay_ms.max(0.0),
            seq,
            task,
        });
    }

    /// Remove and return every task due at or before `now_ms`, in
    /// (due time, schedule order).
    pub fn take_due(&mut self, now_ms: f64) -> Vec<Task> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| t.due_ms <= now_ms);
        self.tasks = pending;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|t| t.task).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
