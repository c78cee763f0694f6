use rand::Rng;

/// Pluggable source of the surge multiplier applied to fallback fares, so
/// tests can pin it to 1.0 instead of depending on real randomness.
pub trait SurgeSource: Sync {
    /// A value in `[1.0, 1.2)`.
    fn next_surge(&self) -> f64;
}

/// Default surge source backed by the thread-local RNG.
#[derive(Debug, Default)]
pub struct ThreadRngSurge;

impl SurgeSource for ThreadRngSurge {
    fn next_surge(&self) -> f64 {
        rand::rng().random_range(1.0..1.2)
    }
}

/// Fixed surge for deterministic tests.
pub struct FixedSurge(pub f64);

impl SurgeSource for FixedSurge {
    fn next_surge(&self) -> f64 {
        self.0
    }
}
