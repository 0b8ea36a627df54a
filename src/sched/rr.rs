use super::{Arrivals, Scheduler, Task};
use log::{debug, trace};
use std::{collections::VecDeque, num::NonZeroU64};

/// Round robin over a single ready queue.
///
/// The task at the front runs for one timeslice and, if unfinished, goes to
/// the back of the queue behind anything that arrived during its slice.
#[derive(Debug, Clone, Copy)]
pub struct Rr {
    timeslice: NonZeroU64,
}

impl Rr {
    pub fn new(timeslice: NonZeroU64) -> Self {
        Self { timeslice }
    }

    pub fn timeslice(&self) -> NonZeroU64 {
        self.timeslice
    }
}

impl Scheduler for Rr {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn run(&mut self, tasks: &mut [Task]) {
        let mut arrivals = Arrivals::new(tasks);
        let mut ready = VecDeque::new();
        let mut now = 0;
        loop {
            arrivals.admit(tasks, now, |i| ready.push_back(i));
            let Some(i) = ready.pop_front() else {
                match arrivals.next_time(tasks) {
                    Some(arrival) => {
                        debug!("rr: idle until {arrival}");
                        now = arrival;
                        continue;
                    }
                    None => break,
                }
            };

            let task = &mut tasks[i];
            let ticks = self.timeslice.get().min(task.remaining());
            task.respond(now);
            now += ticks;
            task.run_for(ticks, now);
            if task.is_finished() {
                debug!("rr: task {} done at {now}", task.id);
                continue;
            }
            trace!("rr: task {} back in line with {} left", task.id, task.remaining());
            task.preempt();
            arrivals.admit(tasks, now, |i| ready.push_back(i));
            ready.push_back(i);
        }
    }
}
