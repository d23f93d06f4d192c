use nalgebra::Vector3;
use rand::Rng;

use crate::core::models::cell::{PeriodicBox, Position};

/// Draws a unit vector uniformly distributed over the surface of the sphere.
///
/// Uses Marsaglia's rejection method: a point `ζ` is drawn uniformly from the
/// square `[-1, 1]^2` and kept only if it falls inside the unit disc, which
/// happens with probability `π/4`. The accepted point is mapped onto the sphere
/// as `(2ζ0 s, 2ζ1 s, 1 - 2|ζ|^2)` with `s = sqrt(1 - |ζ|^2)`.
///
/// The loop has no iteration cap; the expected number of rejected pairs is
/// below one-third.
pub fn sample_direction(rng: &mut impl Rng) -> Vector3<f64> {
    loop {
        let zeta0 = 1.0 - 2.0 * rng.r#gen::<f64>();
        let zeta1 = 1.0 - 2.0 * rng.r#gen::<f64>();
        let zeta_sq = zeta0 * zeta0 + zeta1 * zeta1;
        if zeta_sq < 1.0 {
            let s = (1.0 - zeta_sq).sqrt();
            return Vector3::new(2.0 * zeta0 * s, 2.0 * zeta1 * s, 1.0 - 2.0 * zeta_sq);
        }
    }
}

/// Draws a position uniformly from the primary cell `[-L/2, L/2]^3`.
pub fn uniform_position(cell: &PeriodicBox, rng: &mut impl Rng) -> Position {
    let l = cell.length();
    Position::new(
        (rng.r#gen::<f64>() - 0.5) * l,
        (rng.r#gen::<f64>() - 0.5) * l,
        (rng.r#gen::<f64>() - 0.5) * l,
    )
}
