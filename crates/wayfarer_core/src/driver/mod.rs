pub mod driver_params;
pub mod parallel_driver;
pub mod worker_context;
