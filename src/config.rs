use crate::sched::{Fifo, Mlfq, Rr, Scheduler, Sjf, Stcf};
use log::LevelFilter;
use std::{
    error::Error,
    fmt::{self, Display},
    num::{NonZeroU64, NonZeroUsize},
    str::FromStr,
};

pub const USAGE: &str = "\
usage: rbsched [OPTIONS]

    --tasks N          number of tasks to generate (default 10)
    --timeslice T      STCF, RR and MLFQ timeslice in ticks (default 16)
    --levels L         number of MLFQ priority levels (default 4)
    --boost P          move every MLFQ task to the top level each P ticks
    --max-runtime R    runtimes are drawn from 1..=R (default 100)
    --max-arrival A    arrivals are drawn from 0..=A (default 0)
    --cpu-share S      fraction of CPU-bound tasks in [0, 1] (default 0.5)
    --seed N           seed for the task generator (default random)
    -v, --verbose      raise the log level, may be repeated
    -h, --help         print this message";

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub num_tasks: u32,
    /// Probability that a generated task is CPU-bound.
    pub cpu_share: f64,
    pub max_runtime: u64,
    /// Arrivals are drawn from `0..=max_arrival`; 0 makes one batch.
    pub max_arrival: u64,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_tasks: 10,
            cpu_share: 0.5,
            max_runtime: 100,
            max_arrival: 0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub generator: GeneratorConfig,
    pub timeslice: NonZeroU64,
    pub mlfq_levels: NonZeroUsize,
    /// MLFQ priority boost period; `None` never boosts.
    pub boost_period: Option<NonZeroU64>,
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            timeslice: Stcf::DEFAULT_TIMESLICE,
            mlfq_levels: Mlfq::DEFAULT_LEVELS,
            boost_period: None,
            verbosity: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(SimConfig),
    Help,
}

impl SimConfig {
    /// Parses command line arguments, excluding the program name.
    pub fn from_args<I>(args: I) -> Result<Command, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--tasks" => config.generator.num_tasks = value("--tasks", &mut args)?,
                "--timeslice" => config.timeslice = value("--timeslice", &mut args)?,
                "--levels" => config.mlfq_levels = value("--levels", &mut args)?,
                "--boost" => config.boost_period = Some(value("--boost", &mut args)?),
                "--max-runtime" => config.generator.max_runtime = value("--max-runtime", &mut args)?,
                "--max-arrival" => config.generator.max_arrival = value("--max-arrival", &mut args)?,
                "--cpu-share" => config.generator.cpu_share = value("--cpu-share", &mut args)?,
                "--seed" => config.generator.seed = Some(value("--seed", &mut args)?),
                "--verbose" => config.verbosity = config.verbosity.saturating_add(1),
                flag if flag.len() > 1 && flag.starts_with('-') && flag[1..].bytes().all(|b| b == b'v') => {
                    let count = u8::try_from(flag.len() - 1).unwrap_or(u8::MAX);
                    config.verbosity = config.verbosity.saturating_add(count);
                }
                other => return Err(ConfigError::UnknownFlag(other.to_string())),
            }
        }
        config.validate()?;
        Ok(Command::Run(config))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let share = self.generator.cpu_share;
        if !(0.0..=1.0).contains(&share) {
            return Err(ConfigError::OutOfRange {
                flag: "--cpu-share",
                reason: "must be between 0 and 1",
            });
        }
        if self.generator.max_runtime == 0 {
            return Err(ConfigError::OutOfRange {
                flag: "--max-runtime",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Every policy in reporting order, configured from these settings.
    pub fn policies(&self) -> Vec<Box<dyn Scheduler>> {
        let mut mlfq = Mlfq::new(self.timeslice, self.mlfq_levels);
        if let Some(period) = self.boost_period {
            mlfq = mlfq.with_boost(period);
        }
        vec![
            Box::new(Sjf),
            Box::new(Stcf::new(self.timeslice)),
            Box::new(Fifo),
            Box::new(Rr::new(self.timeslice)),
            Box::new(mlfq),
        ]
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn value<T, I>(flag: &'static str, args: &mut I) -> Result<T, ConfigError>
where
    T: FromStr,
    I: Iterator<Item = String>,
{
    let raw = args.next().ok_or(ConfigError::MissingValue(flag))?;
    raw.parse()
        .map_err(|_| ConfigError::InvalidValue { flag, value: raw })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownFlag(String),
    MissingValue(&'static str),
    InvalidValue { flag: &'static str, value: String },
    OutOfRange { flag: &'static str, reason: &'static str },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFlag(flag) => write!(f, "unknown option '{flag}'"),
            Self::MissingValue(flag) => write!(f, "option '{flag}' needs a value"),
            Self::InvalidValue { flag, value } => {
                write!(f, "invalid value '{value}' for option '{flag}'")
            }
            Self::OutOfRange { flag, reason } => write!(f, "option '{flag}' {reason}"),
        }
    }
}

impl Error for ConfigError {}
