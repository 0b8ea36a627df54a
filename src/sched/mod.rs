mod fifo;
mod mlfq;
mod rr;
mod sjf;
mod stcf;
mod summary;
mod task;

pub use fifo::Fifo;
pub use mlfq::Mlfq;
pub use rr::Rr;
pub use sjf::Sjf;
pub use stcf::Stcf;
pub use summary::Summary;
pub use task::{Task, TaskKind, TaskState, TaskStats};

use log::info;
use std::num::NonZeroU64;

/// A scheduling policy simulated over a batch of tasks.
///
/// `run` drives every task in the slice to completion, advancing a virtual
/// clock that starts at 0.
pub trait Scheduler {
    fn name(&self) -> &'static str;
    fn run(&mut self, tasks: &mut [Task]);
}

/// Every policy in reporting order, the preemptive ones sharing `timeslice`.
pub fn default_policies(timeslice: NonZeroU64) -> Vec<Box<dyn Scheduler>> {
    vec![
        Box::new(Sjf),
        Box::new(Stcf::new(timeslice)),
        Box::new(Fifo),
        Box::new(Rr::new(timeslice)),
        Box::new(Mlfq::new(timeslice, Mlfq::DEFAULT_LEVELS)),
    ]
}

/// Runs each policy on its own copy of `tasks`.
pub fn simulate(tasks: &[Task], schedulers: &mut [Box<dyn Scheduler>]) -> Vec<Summary> {
    schedulers
        .iter_mut()
        .map(|scheduler| {
            let mut batch = tasks.to_vec();
            scheduler.run(&mut batch);
            let summary = Summary::from_tasks(scheduler.name(), &batch);
            info!(
                "{}: {} tasks, makespan {}",
                summary.policy, summary.tasks, summary.makespan
            );
            summary
        })
        .collect()
}

/// Index of the arrived, unfinished task with the smallest `key`. Ties go to
/// the task that comes first in the slice.
fn pick_arrived<F>(tasks: &[Task], now: u64, key: F) -> Option<usize>
where
    F: Fn(&Task) -> u64,
{
    tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_finished() && t.has_arrived(now))
        .min_by_key(|(_, t)| key(t))
        .map(|(i, _)| i)
}

/// Earliest arrival strictly after `now` among unfinished tasks.
fn next_arrival(tasks: &[Task], now: u64) -> Option<u64> {
    tasks
        .iter()
        .filter(|t| !t.is_finished() && !t.has_arrived(now))
        .map(|t| t.arrival_time)
        .min()
}

/// Unfinished tasks in arrival order, handed out as the clock passes them.
struct Arrivals {
    order: Vec<usize>,
    next: usize,
}

impl Arrivals {
    fn new(tasks: &[Task]) -> Self {
        let mut order: Vec<_> = (0..tasks.len())
            .filter(|&i| !tasks[i].is_finished())
            .collect();
        order.sort_by_key(|&i| tasks[i].arrival_time);
        Self { order, next: 0 }
    }

    /// Passes every task that has arrived by `now` to `enqueue`, earliest
    /// first.
    fn admit<F>(&mut self, tasks: &[Task], now: u64, mut enqueue: F)
    where
        F: FnMut(usize),
    {
        while let Some(&i) = self.order.get(self.next) {
            if !tasks[i].has_arrived(now) {
                break;
            }
            enqueue(i);
            self.next += 1;
        }
    }

    fn next_time(&self, tasks: &[Task]) -> Option<u64> {
        self.order.get(self.next).map(|&i| tasks[i].arrival_time)
    }
}
