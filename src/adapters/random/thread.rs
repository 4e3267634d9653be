use rand::Rng;

use crate::ports::RandomSource;

/// Production random source backed by `rand::thread_rng`.
///
/// Holds no state itself; each call borrows the calling thread's
/// generator, so one instance can be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl ThreadRandom {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for ThreadRandom {
    fn below(&self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..bound)
    }

    fn unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}
