pub mod distance_distribution;
pub mod distance_sampler;
