use super::{next_arrival, pick_arrived, Scheduler, Task};
use log::{debug, trace};
use std::num::NonZeroU64;

/// Preemptive shortest-time-to-completion-first.
///
/// The task with the least remaining work runs for at most one timeslice, and
/// the slice is cut short when another task arrives so the newcomer can
/// preempt.
#[derive(Debug, Clone, Copy)]
pub struct Stcf {
    timeslice: NonZeroU64,
}

impl Stcf {
    pub const DEFAULT_TIMESLICE: NonZeroU64 = match NonZeroU64::new(16) {
        Some(t) => t,
        None => unreachable!(),
    };

    pub fn new(timeslice: NonZeroU64) -> Self {
        Self { timeslice }
    }

    pub fn timeslice(&self) -> NonZeroU64 {
        self.timeslice
    }
}

impl Default for Stcf {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMESLICE)
    }
}

impl Scheduler for Stcf {
    fn name(&self) -> &'static str {
        "STCF"
    }

    fn run(&mut self, tasks: &mut [Task]) {
        let mut now = 0;
        let mut current: Option<usize> = None;
        loop {
            let Some(mut i) = pick_arrived(tasks, now, Task::remaining) else {
                match next_arrival(tasks, now) {
                    Some(arrival) => {
                        debug!("stcf: idle until {arrival}");
                        now = arrival;
                        continue;
                    }
                    None => break,
                }
            };
            if let Some(prev) = current.filter(|&prev| prev != i && !tasks[prev].is_finished()) {
                // stay on the running task when it ties with the best candidate
                if tasks[prev].remaining() == tasks[i].remaining() {
                    i = prev;
                } else {
                    trace!("stcf: switching from task {} to {}", tasks[prev].id, tasks[i].id);
                    tasks[prev].preempt();
                }
            }
            current = Some(i);

            let mut ticks = self.timeslice.get().min(tasks[i].remaining());
            if let Some(arrival) = next_arrival(tasks, now) {
                ticks = ticks.min(arrival - now);
            }
            let task = &mut tasks[i];
            task.respond(now);
            now += ticks;
            task.run_for(ticks, now);
            if task.is_finished() {
                debug!("stcf: task {} done at {now}", task.id);
            }
        }
    }
}
