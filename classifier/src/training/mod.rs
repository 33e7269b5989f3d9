mod stats;
mod trainer;

pub use stats::EpochStats;
pub use trainer::Trainer;
