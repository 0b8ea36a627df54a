use super::{Scheduler, Task};
use log::debug;

/// Runs tasks to completion in order of arrival.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fifo;

impl Scheduler for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn run(&mut self, tasks: &mut [Task]) {
        let mut order: Vec<usize> = (0..tasks.len()).collect();
        order.sort_by_key(|&i| tasks[i].arrival_time);

        let mut now = 0;
        for i in order {
            let task = &mut tasks[i];
            if task.is_finished() {
                continue;
            }
            now = now.max(task.arrival_time);
            task.respond(now);
            let ticks = task.remaining();
            now += ticks;
            task.run_for(ticks, now);
            debug!("fifo: task {} done at {now}", task.id);
        }
    }
}
