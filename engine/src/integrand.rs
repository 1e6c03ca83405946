/// Pure scalar function sampled by the reducer.
///
/// Implementations must be total over the reals and free of side effects:
/// every worker evaluates the same integrand concurrently.
pub trait Integrand: Sync {
    fn eval(&self, x: f64) -> f64;
}

impl<F> Integrand for F
where
    F: Fn(f64) -> f64 + Sync,
{
    fn eval(&self, x: f64) -> f64 {
        self(x)
    }
}

/// `f(x) = x * x`, the integrand the command-line driver uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Square;

impl Integrand for Square {
    fn eval(&self, x: f64) -> f64 {
        x * x
    }
}
