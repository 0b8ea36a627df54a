use super::{DistributionError, WeightedChoice};
use crate::{
    config::GeneratorConfig,
    sched::{Task, TaskKind},
};
use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Synthetic task source. Two generators built from the same seeded config
/// produce the same tasks.
pub struct TaskGenerator {
    rng: StdRng,
    kinds: WeightedChoice<TaskKind>,
    config: GeneratorConfig,
    next_id: u32,
}

impl TaskGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, DistributionError> {
        let kinds = WeightedChoice::new([
            (TaskKind::Cpu, config.cpu_share),
            (TaskKind::Memory, 1.0 - config.cpu_share),
        ])?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            kinds,
            config,
            next_id: 0,
        })
    }

    pub fn next_task(&mut self) -> Task {
        let id = self.next_id;
        self.next_id += 1;
        let kind = self.kinds.choose_owned(&mut self.rng);
        let runtime = self.rng.gen_range(1..=self.config.max_runtime.max(1));
        let arrival = self.rng.gen_range(0..=self.config.max_arrival);
        trace!("generated task {id}: {kind:?}, arrives {arrival}, runs {runtime}");
        Task::new(id, arrival, runtime).with_kind(kind)
    }

    /// Produces the configured number of tasks.
    pub fn generate(&mut self) -> Vec<Task> {
        (0..self.config.num_tasks).map(|_| self.next_task()).collect()
    }
}
