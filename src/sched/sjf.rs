use super::{next_arrival, pick_arrived, Scheduler, Task};
use log::debug;

/// Non-preemptive shortest-job-first.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sjf;

impl Scheduler for Sjf {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn run(&mut self, tasks: &mut [Task]) {
        let mut now = 0;
        loop {
            let Some(i) = pick_arrived(tasks, now, |t| t.total_runtime) else {
                match next_arrival(tasks, now) {
                    Some(arrival) => {
                        debug!("sjf: idle until {arrival}");
                        now = arrival;
                        continue;
                    }
                    None => break,
                }
            };
            let task = &mut tasks[i];
            task.respond(now);
            let ticks = task.remaining();
            now += ticks;
            task.run_for(ticks, now);
            debug!("sjf: task {} done at {now}", task.id);
        }
    }
}
