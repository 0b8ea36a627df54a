pub mod config;
pub mod rbtree;
pub mod sched;

#[cfg(feature = "rand")]
pub mod rand;

pub use rbtree::{Color, RbTree};
