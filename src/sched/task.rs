#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Cpu,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Ready,
    Running,
    Blocked,
    Finished,
}

/// Timing figures of a finished task, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Completion time minus arrival time.
    pub turnaround_time: u64,
    /// First-run time minus arrival time.
    pub response_time: u64,
    /// Turnaround time spent off the CPU.
    pub waiting_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u32,
    pub kind: TaskKind,
    pub arrival_time: u64,
    pub total_runtime: u64,
    elapsed: u64,
    state: TaskState,
    first_run: Option<u64>,
    completion: Option<u64>,
}

impl Task {
    pub fn new(id: u32, arrival_time: u64, total_runtime: u64) -> Self {
        Self {
            id,
            kind: TaskKind::Cpu,
            arrival_time,
            total_runtime,
            elapsed: 0,
            state: TaskState::Ready,
            first_run: None,
            completion: None,
        }
    }

    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn remaining(&self) -> u64 {
        self.total_runtime - self.elapsed
    }

    pub fn has_arrived(&self, now: u64) -> bool {
        self.arrival_time <= now
    }

    pub fn is_finished(&self) -> bool {
        self.state == TaskState::Finished
    }

    /// Puts the task on the CPU, recording the first time this happens.
    pub fn respond(&mut self, now: u64) {
        debug_assert!(self.has_arrived(now));
        self.first_run.get_or_insert(now);
        self.state = TaskState::Running;
    }

    /// Accounts `ticks` of execution ending at `now`, finishing the task once
    /// its whole runtime has been served.
    pub fn run_for(&mut self, ticks: u64, now: u64) {
        debug_assert_eq!(self.state, TaskState::Running);
        self.elapsed = (self.elapsed + ticks).min(self.total_runtime);
        if self.elapsed == self.total_runtime {
            self.state = TaskState::Finished;
            self.completion = Some(now);
        }
    }

    /// Takes a running task off the CPU before it is done.
    pub fn preempt(&mut self) {
        if self.state == TaskState::Running {
            self.state = TaskState::Blocked;
        }
    }

    pub fn completion_time(&self) -> Option<u64> {
        self.completion
    }

    pub fn stats(&self) -> Option<TaskStats> {
        let completion = self.completion?;
        let first_run = self.first_run?;
        let turnaround_time = completion - self.arrival_time;
        Some(TaskStats {
            turnaround_time,
            response_time: first_run - self.arrival_time,
            waiting_time: turnaround_time.saturating_sub(self.total_runtime),
        })
    }
}
