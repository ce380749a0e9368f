/// Flux d'échantillons uniformes injecté dans le moteur.
///
/// Implémenté par : `SeededSampler`, `ReplaySampler`, et toute closure
/// `FnMut() -> f64`.
///
/// # Example
/// ```
/// use pd_core::traits::SampleSource;
///
/// let mut half = || 0.5;
/// assert_eq!(half.next_sample(), 0.5);
/// ```
pub trait SampleSource {
    /// Next sample, uniform in `[0, 1)`.
    fn next_sample(&mut self) -> f64;
}

impl<F> SampleSource for F
where
    F: FnMut() -> f64,
{
    fn next_sample(&mut self) -> f64 {
        self()
    }
}
