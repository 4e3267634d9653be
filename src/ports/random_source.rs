//! RandomSource port - Injectable randomness for shuffles and draws.
//!
//! The engine never reaches for a global RNG directly. Production wiring
//! uses a thread-local generator; tests supply a scripted sequence so
//! pattern generation and presentation draws become exact.

/// Port for uniform random draws.
///
/// Implementations are shared across threads, so interior mutability
/// (thread-local state or a lock) is the implementor's concern.
pub trait RandomSource: Send + Sync {
    /// Returns a uniformly distributed index in `0..bound`.
    ///
    /// Callers never pass `bound == 0`.
    fn below(&self, bound: usize) -> usize;

    /// Returns a uniformly distributed value in `[0, 1)`.
    fn unit(&self) -> f64;
}
