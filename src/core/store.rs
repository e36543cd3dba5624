//! Insertion-ordered task registry shared between the dispatcher and
//! the timer callbacks.
//!
//! One mutex guards the whole list. Every operation takes the lock,
//! does its work synchronously and releases it; nothing awaits while
//! holding it.

use crate::core::timer::TimerHandle;
use std::sync::Mutex;

pub struct Task {
    pub id: u64,
    pub time_spec: String,
    /// Command tokens; the first one is the program to spawn.
    pub command: Vec<String>,
    pub cyclic: bool,
    pub done: bool,
    timer: Option<TimerHandle>,
}

impl Task {
    /// Render the command the way DISPLAY reports it, one space after
    /// every token.
    pub fn command_text(&self) -> String {
        let mut out = String::new();
        for token in &self.command {
            out.push_str(token);
            out.push(' ');
        }
        out
    }
}

/// One pending entry as DISPLAY reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub id: u64,
    pub time_spec: String,
    pub command: String,
}

#[derive(Default)]
struct StoreInner {
    tasks: Vec<Task>,
    next_id: u64,
}

pub struct TaskStore {
    inner: Mutex<StoreInner>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                tasks: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Register a task and return its id. Ids start at 1 and only
    /// ever grow, so cancelled ids are never reused.
    pub fn insert(&self, time_spec: String, command: Vec<String>, cyclic: bool) -> u64 {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner.tasks.push(Task {
            id,
            time_spec,
            command,
            cyclic,
            done: false,
            timer: None,
        });
        id
    }

    /// Hand the task its armed timer. The handle disarms the timer
    /// when the task is removed.
    pub fn attach_timer(&self, id: u64, handle: TimerHandle) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) {
            task.timer = Some(handle);
        }
    }

    /// Remove a task and disarm its timer. Unknown ids are a no-op.
    pub fn cancel(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.tasks.iter().position(|t| t.id == id) {
            Some(pos) => {
                // Dropping the Task drops its TimerHandle, which stops
                // the timer task.
                inner.tasks.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Run `f` on the task under the store lock and return its result,
    /// or None when the task was cancelled in the meantime. The whole
    /// fire callback goes through here, so a concurrent cancel cannot
    /// observe a half-fired task.
    pub fn with_task_mut<R>(&self, id: u64, f: impl FnOnce(&mut Task) -> R) -> Option<R> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.tasks.iter_mut().find(|t| t.id == id).map(f)
    }

    /// Snapshot every task that has not completed, in insertion order.
    pub fn pending(&self) -> Vec<PendingTask> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .tasks
            .iter()
            .filter(|t| !t.done)
            .map(|t| PendingTask {
                id: t.id,
                time_spec: t.time_spec.clone(),
                command: t.command_text(),
            })
            .collect()
    }

    /// Drop every task, disarming all timers.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.tasks.clear();
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let store = TaskStore::new();
        let a = store.insert("-r 0-0-0-0-5".into(), tokens("echo a"), false);
        let b = store.insert("-r 0-0-0-0-6".into(), tokens("echo b"), false);
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn cancelled_ids_are_not_reused() {
        let store = TaskStore::new();
        let a = store.insert("-r 0-0-0-0-5".into(), tokens("echo a"), false);
        assert!(store.cancel(a));
        let b = store.insert("-r 0-0-0-0-5".into(), tokens("echo b"), false);
        assert_eq!(b, a + 1);
    }

    #[test]
    fn cancel_of_unknown_id_is_a_noop() {
        let store = TaskStore::new();
        let a = store.insert("-r 0-0-0-0-5".into(), tokens("echo a"), false);
        assert!(store.cancel(a));
        assert!(!store.cancel(a));
        assert!(!store.cancel(99));
        assert!(store.pending().is_empty());
    }

    #[test]
    fn pending_keeps_insertion_order_and_skips_done() {
        let store = TaskStore::new();
        let a = store.insert("-r 0-0-0-0-1".into(), tokens("echo a"), false);
        let b = store.insert("-r 0-0-0-0-2".into(), tokens("echo b"), false);
        let c = store.insert("-r 0-0-0-0-3".into(), tokens("echo c"), true);

        assert!(store.with_task_mut(a, |t| t.done = true).is_some());
        assert!(store.with_task_mut(c, |t| assert!(t.cyclic)).is_some());

        let pending = store.pending();
        let ids: Vec<u64> = pending.iter().map(|t| t.id).collect();
        // The one-shot task a is done; the cyclic task c stays.
        assert_eq!(ids, vec![b, c]);
        assert_eq!(pending[0].command, "echo b ");
    }

    #[test]
    fn with_task_mut_after_cancel_returns_none() {
        let store = TaskStore::new();
        let a = store.insert("-r 0-0-0-0-1".into(), tokens("echo a"), false);
        store.cancel(a);
        assert!(store.with_task_mut(a, |_| ()).is_none());
    }

    #[test]
    fn cancel_blocks_while_a_fire_is_in_progress() {
        use std::sync::{Arc, mpsc};
        use std::time::{Duration, Instant};

        let store = Arc::new(TaskStore::new());
        let id = store.insert("-r 0-0-0-0-1".into(), tokens("echo a"), false);

        // Hold the task under the lock the way a firing timer does.
        let (entered_tx, entered_rx) = mpsc::channel();
        let worker = {
            let store = store.clone();
            std::thread::spawn(move || {
                store.with_task_mut(id, |task| {
                    task.done = true;
                    entered_tx.send(()).unwrap();
                    std::thread::sleep(Duration::from_millis(200));
                });
            })
        };

        entered_rx.recv().unwrap();
        let before = Instant::now();
        assert!(store.cancel(id));
        // The cancel must not complete inside the fire critical section.
        assert!(before.elapsed() >= Duration::from_millis(150));
        worker.join().unwrap();
    }

    #[test]
    fn clear_empties_the_store() {
        let store = TaskStore::new();
        store.insert("-r 0-0-0-0-1".into(), tokens("echo a"), false);
        store.insert("-r 0-0-0-0-2".into(), tokens("echo b"), true);
        store.clear();
        assert!(store.pending().is_empty());
    }
}
