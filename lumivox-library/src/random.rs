//! Random source capability used for lottery draws

/// Uniform index source. Seeded generators make draws reproducible in tests.
pub trait RandomSource {
    /// Uniform integer in `0..bound`. `bound` must be non-zero.
    fn next_below(&mut self, bound: usize) -> usize;
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn next_below(&mut self, bound: usize) -> usize {
        self.random_range(0..bound)
    }
}
