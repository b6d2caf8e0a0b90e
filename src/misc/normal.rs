use rand::distributions::{Distribution, Open01};
use rand::Rng;
use std::f64::consts::PI;

/// Standard normal draws via the Box–Muller transform.
///
/// Each draw consumes two independent uniforms on (0, 1) and returns one
/// N(0, 1) variate; the sine branch is discarded.
///
/// # Example
///
/// ```
/// use kernelgen::misc::BoxMuller;
/// use rand::distributions::Distribution;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::SmallRng::seed_from_u64(0xABCD);
/// let z: f64 = BoxMuller.sample(&mut rng);
/// assert!(z.is_finite());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoxMuller;

impl Distribution<f64> for BoxMuller {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u1: f64 = rng.sample(Open01);
        let u2: f64 = rng.sample(Open01);
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

/// Draw a single standard normal variate
#[inline]
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    BoxMuller.sample(rng)
}

/// Draw `n` independent standard normal variates
pub fn standard_normals<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    (0..n).map(|_| standard_normal(rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    const N: usize = 100_000;

    #[test]
    fn moments_are_standard() {
        let mut rng = Xoshiro256Plus::seed_from_u64(0x1234);
        let xs = standard_normals(N, &mut rng);
        let mean = xs.iter().sum::<f64>() / N as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
            / (N - 1) as f64;

        assert::close(mean, 0.0, 2E-2);
        assert::close(var, 1.0, 2E-2);
    }

    #[test]
    fn tails_are_plausible() {
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        let xs = standard_normals(N, &mut rng);
        // P(|Z| > 1.96) = 0.05
        let frac =
            xs.iter().filter(|x| x.abs() > 1.96).count() as f64 / N as f64;
        assert::close(frac, 0.05, 5E-3);
        assert!(xs.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn same_seed_same_draws() {
        let mut a = Xoshiro256Plus::seed_from_u64(99);
        let mut b = Xoshiro256Plus::seed_from_u64(99);
        assert_eq!(standard_normals(16, &mut a), standard_normals(16, &mut b));
    }
}
