use std::cell::Cell;
use std::rc::Rc;

/// A scheduled task. The cancel flag is shared with its [`TaskGuard`].
struct Task<E> {
    id: u64,
    due_ms: f64,
    /// `Some` for repeating tasks.
    interval_ms: Option<f64>,
    event: E,
    cancelled: Rc<Cell<bool>>,
}

/// Owning handle to a scheduled task. Dropping it cancels the task.
#[must_use = "dropping the guard cancels the task immediately"]
pub struct TaskGuard {
    cancelled: Rc<Cell<bool>>,
}

impl TaskGuard {
    /// Cancel the task. No-op if it already fired or was cancelled.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Single-threaded wall-clock scheduler.
///
/// Time only moves when the owner polls it. Events come out in due-time
/// order, ties in scheduling order, so a run is fully reproducible from the
/// sequence of `poll`/`settle` calls.
pub struct Scheduler<E> {
    now_ms: f64,
    next_id: u64,
    tasks: Vec<Task<E>>,
}

impl<E: Copy> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// Current scheduler clock (ms since creation).
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Fire `event` once, `delay_ms` from now.
    pub fn schedule_once(&mut self, delay_ms: f64, event: E) -> TaskGuard {
        self.push(delay_ms, None, event)
    }

    /// Fire `event` every `interval_ms`, first time one interval from now.
    pub fn schedule_repeating(&mut self, interval_ms: f64, event: E) -> TaskGuard {
        self.push(interval_ms, Some(interval_ms), event)
    }

    fn push(&mut self, delay_ms: f64, interval_ms: Option<f64>, event: E) -> TaskGuard {
        let cancelled = Rc::new(Cell::new(false));
        self.tasks.push(Task {
            id: self.next_id,
            due_ms: self.now_ms + delay_ms.max(0.0),
            interval_ms,
            event,
            cancelled: Rc::clone(&cancelled),
        });
        self.next_id += 1;
        TaskGuard { cancelled }
    }

    /// Pop the earliest event due at or before `until_ms`, moving the clock
    /// to its due time. Repeating tasks re-arm one interval later.
    pub fn poll(&mut self, until_ms: f64) -> Option<E> {
        self.tasks.retain(|t| !t.cancelled.get());

        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;

        let task = &mut self.tasks[idx];
        self.now_ms = self.now_ms.max(task.due_ms);
        let event = task.event;

        match task.interval_ms {
            Some(interval) => {
                task.due_ms += interval;
                // Re-queue behind tasks already due at the new time.
                task.id = self.next_id;
                self.next_id += 1;
            }
            None => {
                // Fired: flag it so the guard reports it and it's purged.
                task.cancelled.set(true);
                self.tasks.swap_remove(idx);
            }
        }

        Some(event)
    }

    /// Move the clock forward to `until_ms` once polling is exhausted.
    pub fn settle(&mut self, until_ms: f64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Live (not cancelled, not yet fired) task count.
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|t| !t.cancelled.get()).count()
    }

    /// Cancel every task.
    pub fn clear(&mut self) {
        for task in self.tasks.drain(..) {
            task.cancelled.set(true);
        }
    }
}

impl<E: Copy> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
