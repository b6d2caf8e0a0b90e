/// Squared Euclidean distance between two points after dividing each
/// coordinate difference by `scale`
#[inline]
pub fn e2_norm(x1: &[f64], x2: &[f64], scale: f64) -> f64 {
    x1.iter()
        .zip(x2)
        .map(|(a, b)| {
            let diff = (a - b) / scale;
            diff * diff
        })
        .sum()
}

/// Euclidean (L2) distance between two points
#[inline]
pub fn euclidean_distance(x1: &[f64], x2: &[f64]) -> f64 {
    e2_norm(x1, x2, 1.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_of_multi_component_points() {
        assert::close(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0, 1E-12);
        assert::close(e2_norm(&[0.0, 0.0], &[3.0, 4.0], 5.0), 1.0, 1E-12);
        assert_eq!(euclidean_distance(&[1.5], &[1.5]), 0.0);
    }
}
