use nalgebra::Vector3;

/// Maps a single coordinate onto its periodic representative in `(-L/2, L/2]`.
///
/// Values already inside the interval are returned untouched, which makes the
/// mapping exactly idempotent. The reduction uses the exact floating-point
/// remainder, and the single fix-up step after it is exact as well, so the
/// result lands in the interval for every finite input.
#[inline]
pub fn wrap_component(x: f64, box_length: f64) -> f64 {
    let half = 0.5 * box_length;
    if x > -half && x <= half {
        return x;
    }
    let mut wrapped = x % box_length;
    if wrapped <= -half {
        wrapped += box_length;
    } else if wrapped > half {
        wrapped -= box_length;
    }
    wrapped
}

/// Applies the minimum-image convention to a displacement vector.
///
/// Each component is shifted by the nearest multiple of `box_length` so that it
/// lies in the half-open interval `(-L/2, L/2]`.
pub fn wrap(v: &Vector3<f64>, box_length: f64) -> Vector3<f64> {
    v.map(|x| wrap_component(x, box_length))
}

/// Minimum-image distance between two points given as vectors.
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>, box_length: f64) -> f64 {
    wrap(&(a - b), box_length).norm()
}
