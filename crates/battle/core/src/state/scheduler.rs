//! Speed-scaled deferred tasks.
//!
//! Due times are in game time, so a delay shrinks in real time as the speed
//! multiplier grows. Tasks re-check unit liveness when they run.
use super::{Millis, UnitId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeferredTask {
    /// Kill the owner of a skill configured with `suicide`.
    Suicide { unit: UnitId, skill: String },
    /// Remove a summon whose lifetime ran out, without death effects.
    ExpireSummon { unit: UnitId },
}

impl DeferredTask {
    pub fn unit(&self) -> UnitId {
        match self {
            Self::Suicide { unit, .. } | Self::ExpireSummon { unit } => *unit,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ScheduledTask {
    due_at: Millis,
    seq: u64,
    task: DeferredTask,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
    next_seq: u64,
}

impl Scheduler {
    pub fn schedule(&mut self, due_at: Millis, task: DeferredTask) {
        self.next_seq += 1;
        self.tasks.push(ScheduledTask {
            due_at,
            seq: self.next_seq,
            task,
        });
    }

    /// Removes and returns tasks due at or before `now`, earliest first.
    pub fn take_due(&mut self, now: Millis) -> Vec<DeferredTask> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|task| task.due_at <= now);
        self.tasks = pending;
        due.sort_by(|a, b| a.due_at.total_cmp(&b.due_at).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|scheduled| scheduled.task).collect()
    }

    /// Drops tasks for a unit that no longer exists.
    pub fn cancel_for(&mut self, unit: UnitId) {
        self.tasks.retain(|task| task.task.unit() != unit);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_tasks_come_out_in_order() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(300.0, DeferredTask::ExpireSummon { unit: UnitId(3) });
        scheduler.schedule(100.0, DeferredTask::ExpireSummon { unit: UnitId(1) });
        scheduler.schedule(900.0, DeferredTask::ExpireSummon { unit: UnitId(9) });

        let due = scheduler.take_due(300.0);
        assert_eq!(
            due,
            vec![
                DeferredTask::ExpireSummon { unit: UnitId(1) },
                DeferredTask::ExpireSummon { unit: UnitId(3) },
            ]
        );
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn cancel_drops_unit_tasks() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(
            10.0,
            DeferredTask::Suicide {
                unit: UnitId(4),
                skill: "last-stand".into(),
            },
        );
        scheduler.cancel_for(UnitId(4));
        assert!(scheduler.is_empty());
    }
}
