//! Sample handling: construction, statistics, plotting positions, synthetic draws.

pub mod empirical;
pub mod sample;
pub mod statistics;
pub mod synthetic;

pub use empirical::*;
pub use sample::*;
pub use statistics::*;
pub use synthetic::*;
