mod builder;
mod types;

pub use builder::{build_trajectories, partition_by_date};
pub use types::{average, Trajectory};
