pub mod candidate_pool;
