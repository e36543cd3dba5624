//! Per-task timers.
//!
//! Arming a task spawns one tokio task that sleeps until the due
//! instant, fires, and either exits (one-shot) or keeps firing at the
//! configured interval. The returned handle disarms the timer when
//! dropped, so removing a task from the store is enough to stop it.

use crate::core::store::TaskStore;
use crate::global_var::LOGGER;
use api_model::timespec::TimeSpec;
use std::sync::Arc;
use tokio::sync::oneshot;

pub struct TimerHandle {
    // Dropping the sender wakes the timer task, which then exits.
    _disarm: oneshot::Sender<()>,
}

/// Arm a timer for the task with this id. The timer holds only the id
/// and relocates the task through the store on every fire, so a
/// cancelled task is never executed.
pub fn arm(store: Arc<TaskStore>, id: u64, spec: &TimeSpec) -> TimerHandle {
    let (disarm_tx, mut disarm_rx) = oneshot::channel::<()>();
    let first_delay = spec.delay_from_now();
    let interval = spec.interval;

    tokio::spawn(async move {
        let mut due = first_delay;
        loop {
            tokio::select! {
                biased;
                _ = &mut disarm_rx => {
                    break;
                }
                _ = tokio::time::sleep(due) => {
                    fire(&store, id);
                    match interval {
                        Some(next) => due = next,
                        None => break,
                    }
                }
            }
        }
    });

    TimerHandle { _disarm: disarm_tx }
}

/// Mark the task fired and launch its command as a detached child
/// process. Both happen inside one store lock acquisition, so a
/// concurrent cancel either removes the task before the callback runs
/// or waits until the child is already queued.
fn fire(store: &TaskStore, id: u64) {
    // A cancelled task is gone from the store; nothing fires then.
    let _ = store.with_task_mut(id, |task| {
        if !task.cyclic {
            task.done = true;
        }
        let Some((program, args)) = task.command.split_first() else {
            return;
        };
        // spawn is synchronous; no await happens under the lock.
        match tokio::process::Command::new(program).args(args).spawn() {
            Ok(_child) => {
                LOGGER.info(format!("Task {} has fired: {}", id, task.command.join(" ")));
            }
            Err(e) => {
                // A cyclic task gets another chance on its next fire.
                LOGGER.warn(format!("Failed to execute task {}: {}", id, e));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_model::timespec::{Schedule, TimeSpec};
    use std::time::Duration;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn relative(delay_ms: u64, interval_ms: Option<u64>) -> TimeSpec {
        TimeSpec {
            schedule: Schedule::Relative(Duration::from_millis(delay_ms)),
            interval: interval_ms.map(Duration::from_millis),
        }
    }

    #[tokio::test]
    async fn one_shot_task_is_done_after_firing() {
        let store = Arc::new(TaskStore::new());
        let id = store.insert("-r 0-0-0-0-0".into(), tokens("true"), false);
        let handle = arm(store.clone(), id, &relative(30, None));
        store.attach_timer(id, handle);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.pending().is_empty(), "one-shot task must be done");
    }

    #[tokio::test]
    async fn cyclic_task_stays_pending_after_firing() {
        let store = Arc::new(TaskStore::new());
        let id = store.insert("-r 0-0-0-0-0 -i 0-0-0-0-1".into(), tokens("true"), true);
        let handle = arm(store.clone(), id, &relative(30, Some(30)));
        store.attach_timer(id, handle);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let pending = store.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);
        store.clear();
    }

    #[tokio::test]
    async fn cancelling_disarms_before_the_first_fire() {
        let store = Arc::new(TaskStore::new());
        let id = store.insert("-r 0-0-0-0-1".into(), tokens("true"), false);
        let handle = arm(store.clone(), id, &relative(500, None));
        store.attach_timer(id, handle);

        assert!(store.cancel(id));
        tokio::time::sleep(Duration::from_millis(700)).await;
        // The task is gone and the timer exited without firing.
        assert!(store.with_task_mut(id, |_| ()).is_none());
    }

    #[tokio::test]
    async fn zero_delay_fires_immediately() {
        let store = Arc::new(TaskStore::new());
        let id = store.insert("-r 0-0-0-0-0".into(), tokens("true"), false);
        let handle = arm(store.clone(), id, &relative(0, None));
        store.attach_timer(id, handle);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.pending().is_empty());
    }
}
