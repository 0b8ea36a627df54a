use super::{Task, TaskKind};
use std::fmt::{self, Display};

/// Per-policy results over one batch of tasks. Averages only cover tasks
/// that finished.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub policy: &'static str,
    pub tasks: usize,
    pub cpu_tasks: usize,
    pub memory_tasks: usize,
    pub avg_turnaround: f64,
    pub avg_response: f64,
    /// Turnaround minus runtime, averaged.
    pub avg_waiting: f64,
    pub avg_runtime: f64,
    pub avg_cpu_runtime: f64,
    pub avg_memory_runtime: f64,
    /// Finished tasks per tick of makespan.
    pub throughput: f64,
    /// Fraction of the makespan the CPU was busy.
    pub cpu_utilization: f64,
    /// Clock value when the last task finished.
    pub makespan: u64,
}

fn mean(total: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

impl Summary {
    pub fn from_tasks(policy: &'static str, tasks: &[Task]) -> Self {
        let finished: Vec<_> = tasks
            .iter()
            .filter_map(|t| t.stats().map(|s| (t, s)))
            .collect();
        let n = finished.len();
        let runtime_of = |kind: TaskKind| {
            let runtimes: Vec<_> = finished
                .iter()
                .filter(|(t, _)| t.kind == kind)
                .map(|(t, _)| t.total_runtime)
                .collect();
            mean(runtimes.iter().sum(), runtimes.len())
        };

        let cpu_tasks = tasks.iter().filter(|t| t.kind == TaskKind::Cpu).count();
        let makespan = tasks
            .iter()
            .filter_map(Task::completion_time)
            .max()
            .unwrap_or(0);
        let busy: u64 = finished.iter().map(|(t, _)| t.total_runtime).sum();
        let per_tick = |total: u64| {
            if makespan == 0 {
                0.0
            } else {
                total as f64 / makespan as f64
            }
        };

        Self {
            policy,
            tasks: tasks.len(),
            cpu_tasks,
            memory_tasks: tasks.len() - cpu_tasks,
            avg_turnaround: mean(finished.iter().map(|(_, s)| s.turnaround_time).sum(), n),
            avg_response: mean(finished.iter().map(|(_, s)| s.response_time).sum(), n),
            avg_waiting: mean(finished.iter().map(|(_, s)| s.waiting_time).sum(), n),
            avg_runtime: mean(busy, n),
            avg_cpu_runtime: runtime_of(TaskKind::Cpu),
            avg_memory_runtime: runtime_of(TaskKind::Memory),
            throughput: per_tick(n as u64),
            cpu_utilization: per_tick(busy),
            makespan,
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Scheduler Stats", self.policy)?;
        writeln!(
            f,
            "Tasks: {} ({} cpu-bound, {} memory-bound)",
            self.tasks, self.cpu_tasks, self.memory_tasks
        )?;
        writeln!(f, "Average Turnaround Time: {:.2}", self.avg_turnaround)?;
        writeln!(f, "Average Response Time: {:.2}", self.avg_response)?;
        writeln!(f, "Average Waiting Time: {:.2}", self.avg_waiting)?;
        writeln!(
            f,
            "Average Running Time: {:.2} (cpu {:.2}, memory {:.2})",
            self.avg_runtime, self.avg_cpu_runtime, self.avg_memory_runtime
        )?;
        writeln!(f, "Throughput: {:.4} tasks/tick", self.throughput)?;
        writeln!(f, "CPU Utilization: {:.2}%", self.cpu_utilization * 100.0)?;
        write!(f, "Total Time: {}", self.makespan)
    }
}
