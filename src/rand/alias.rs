use log::debug;
use rand::Rng;
use smallvec::SmallVec;
use std::{
    error::Error,
    fmt::{self, Display},
};

const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Container {
    alias: usize,
    thresh: f64,
}

/// Walker/Vose alias table: O(n) construction, O(1) sampling from a discrete
/// distribution.
#[derive(Debug, Clone)]
pub struct Alias {
    containers: Vec<Container>,
}

type Worklist = SmallVec<[(f64, usize); 8]>;

impl Alias {
    pub fn new(dist: &[f64]) -> Result<Self, DistributionError> {
        if dist.is_empty() {
            return Err(DistributionError::Empty);
        }
        if let Some(index) = dist.iter().position(|p| !p.is_finite() || *p < 0.0) {
            return Err(DistributionError::InvalidWeight { index });
        }
        let sum: f64 = dist.iter().sum();
        if (1.0 - sum).abs() > TOLERANCE {
            return Err(DistributionError::NotNormalized { sum });
        }

        let mut small = Worklist::new();
        let mut big = Worklist::new();
        for (i, p) in dist.iter().enumerate() {
            let scaled = p * dist.len() as f64;
            if scaled < 1.0 {
                small.push((scaled, i));
            } else {
                big.push((scaled, i));
            }
        }
        debug!("alias worklists: small {small:?}, big {big:?}");

        let mut containers: Vec<_> = (0..dist.len())
            .map(|alias| Container { alias, thresh: 1.0 })
            .collect();
        loop {
            let (Some(&(thresh, pos)), Some(&(p, i))) = (small.last(), big.last()) else {
                break;
            };
            small.pop();
            big.pop();
            containers[pos] = Container { alias: i, thresh };
            let p = p - (1.0 - thresh);
            if p < 1.0 {
                small.push((p, i));
            } else {
                big.push((p, i));
            }
        }
        // whatever is left over is 1.0 up to rounding and keeps its own slot

        Ok(Self { containers })
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let idx = rng.gen_range(0..self.containers.len());
        let container = self.containers[idx];
        if rng.gen::<f64>() < container.thresh {
            idx
        } else {
            container.alias
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistributionError {
    Empty,
    InvalidWeight { index: usize },
    NotNormalized { sum: f64 },
}

impl Display for DistributionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("distribution has no outcomes"),
            Self::InvalidWeight { index } => {
                write!(f, "weight {index} is negative or not a finite number")
            }
            Self::NotNormalized { sum } => write!(f, "weights sum to {sum}, expected 1"),
        }
    }
}

impl Error for DistributionError {}
