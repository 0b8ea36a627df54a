use super::{Arrivals, Scheduler, Task};
use log::{debug, trace};
use std::{
    collections::VecDeque,
    num::{NonZeroU64, NonZeroUsize},
};

/// Multi-level feedback queue.
///
/// Level 0 has the highest priority and every new arrival starts there. The
/// front task of the highest non-empty level runs for one timeslice; a task
/// that uses up its slice without finishing drops one level, down to the
/// lowest. With a boost period set, every queued task is moved back to level
/// 0 once per period.
#[derive(Debug, Clone, Copy)]
pub struct Mlfq {
    timeslice: NonZeroU64,
    levels: NonZeroUsize,
    boost_period: Option<NonZeroU64>,
}

impl Mlfq {
    pub const DEFAULT_LEVELS: NonZeroUsize = match NonZeroUsize::new(4) {
        Some(n) => n,
        None => unreachable!(),
    };

    pub fn new(timeslice: NonZeroU64, levels: NonZeroUsize) -> Self {
        Self {
            timeslice,
            levels,
            boost_period: None,
        }
    }

    pub fn with_boost(mut self, period: NonZeroU64) -> Self {
        self.boost_period = Some(period);
        self
    }

    pub fn timeslice(&self) -> NonZeroU64 {
        self.timeslice
    }

    pub fn levels(&self) -> NonZeroUsize {
        self.levels
    }

    pub fn boost_period(&self) -> Option<NonZeroU64> {
        self.boost_period
    }
}

impl Scheduler for Mlfq {
    fn name(&self) -> &'static str {
        "MLFQ"
    }

    fn run(&mut self, tasks: &mut [Task]) {
        let lowest = self.levels.get() - 1;
        let mut queues: Vec<VecDeque<usize>> = vec![VecDeque::new(); self.levels.get()];
        let mut arrivals = Arrivals::new(tasks);
        let mut next_boost = self.boost_period.map(NonZeroU64::get);
        let mut now = 0;
        loop {
            arrivals.admit(tasks, now, |i| queues[0].push_back(i));
            if let (Some(at), Some(period)) = (next_boost.as_mut(), self.boost_period) {
                if *at <= now {
                    trace!("mlfq: priority boost at {now}");
                    let mut top = VecDeque::new();
                    for queue in &mut queues {
                        top.append(queue);
                    }
                    queues[0] = top;
                    while *at <= now {
                        *at += period.get();
                    }
                }
            }

            let picked = queues
                .iter_mut()
                .enumerate()
                .find_map(|(level, queue)| queue.pop_front().map(|i| (level, i)));
            let Some((level, i)) = picked else {
                match arrivals.next_time(tasks) {
                    Some(arrival) => {
                        debug!("mlfq: idle until {arrival}");
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
                debug!("mlfq: task {} done at {now} on level {level}", task.id);
                continue;
            }
            let level = (level + 1).min(lowest);
            trace!("mlfq: task {} down to level {level}", task.id);
            task.preempt();
            arrivals.admit(tasks, now, |i| queues[0].push_back(i));
            queues[level].push_back(i);
        }
    }
}
