mod alias;
mod choice;
mod generator;

pub use alias::{Alias, DistributionError};
pub use choice::WeightedChoice;
pub use generator::TaskGenerator;
