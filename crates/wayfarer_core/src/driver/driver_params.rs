#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl From<usize> for Threads {
    /// `0` picks the available parallelism.
    fn from(threads: usize) -> Self {
        match threads {
            0 => Threads::Auto,
            1 => Threads::Single,
            n => Threads::Multi(n),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DriverParams {
    /// Number of shards, each worker owns one shard and one random generator.
    pub workers: Threads,
    /// Worker `i` is seeded with `seed + i`.
    pub seed: u64,
}

impl Default for DriverParams {
    fn default() -> Self {
        Self {
            workers: Threads::Single,
            seed: 0,
        }
    }
}
