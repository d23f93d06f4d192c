use rand::Rng;
use tracing::{debug, instrument, trace};

use super::error::GenerationError;
use super::overlap::overlaps_any;
use super::utils::sampling::uniform_position;
use crate::core::models::cell::{InvalidParameter, PeriodicBox, Position, require_non_negative};

pub(crate) fn require_attempts(max_attempts: usize) -> Result<usize, InvalidParameter> {
    if max_attempts == 0 {
        Err(InvalidParameter::new(
            "max_attempts",
            0.0,
            "at least one attempt is required",
        ))
    } else {
        Ok(max_attempts)
    }
}

/// Places `count` points uniformly at random in `cell` such that no two of them,
/// and none of them and any point of `occupied`, are closer than `rmin`.
///
/// Each slot is filled by drawing uniform positions until one does not overlap
/// `occupied` or any point accepted earlier in this call. A slot that is still
/// empty after `max_attempts` draws aborts the whole call with
/// [`GenerationError::PlacementExhausted`]; nothing placed before it is
/// returned.
///
/// # Arguments
///
/// * `count` - Number of points to place.
/// * `cell` - The periodic box the points are drawn from.
/// * `rmin` - Minimum allowed minimum-image distance between any two points.
/// * `occupied` - Points already present, which new points must keep clear of.
/// * `max_attempts` - Uniform draws allowed per point before giving up.
/// * `rng` - Source of randomness; a fixed seed reproduces the result.
///
/// # Return
///
/// The `count` accepted positions, in the order they were placed. Positions lie
/// in the primary cell and do not include `occupied`.
///
/// # Errors
///
/// - [`GenerationError::InvalidParameter`] for a negative or non-finite `rmin`
///   or a zero `max_attempts`. No sampling happens in that case.
/// - [`GenerationError::PlacementExhausted`] when a slot cannot be filled.
#[instrument(level = "debug", skip_all, fields(count, rmin, max_attempts))]
pub fn generate_points(
    count: usize,
    cell: &PeriodicBox,
    rmin: f64,
    occupied: &[Position],
    max_attempts: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Position>, GenerationError> {
    require_non_negative("rmin", rmin)?;
    require_attempts(max_attempts)?;

    let mut accepted = Vec::with_capacity(count);
    for slot in 0..count {
        let position = place_one(slot, cell, rmin, occupied, &accepted, max_attempts, rng)?;
        accepted.push(position);
    }

    debug!(
        placed = accepted.len(),
        occupied = occupied.len(),
        "Uniform placement complete."
    );
    Ok(accepted)
}

fn place_one(
    slot: usize,
    cell: &PeriodicBox,
    rmin: f64,
    occupied: &[Position],
    accepted: &[Position],
    max_attempts: usize,
    rng: &mut impl Rng,
) -> Result<Position, GenerationError> {
    for attempt in 1..=max_attempts {
        let candidate = uniform_position(cell, rng);
        if !overlaps_any(&candidate, occupied, accepted, rmin, cell) {
            trace!(slot, attempt, "Accepted uniform draw.");
            return Ok(candidate);
        }
    }

    debug!(slot, max_attempts, "Attempt budget exhausted for slot.");
    Err(GenerationError::PlacementExhausted {
        slot,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::{SeedableRng, rngs::StdRng};

    const TOLERANCE: f64 = 1e-9;

    fn assert_no_overlap(points: &[Position], occupied: &[Position], rmin: f64, cell: &PeriodicBox) {
        for (a, b) in points.iter().tuple_combinations() {
            assert!(cell.distance(a, b) >= rmin - TOLERANCE);
        }
        for (a, b) in points.iter().cartesian_product(occupied.iter()) {
            assert!(cell.distance(a, b) >= rmin - TOLERANCE);
        }
    }

    /// Counts how many `f64` values are pulled from the wrapped generator.
    struct CountingRng {
        inner: StdRng,
        draws: usize,
    }

    impl rand::RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.draws += 1;
            self.inner.next_u32()
        }
        fn next_u64(&mut self) -> u64 {
            self.draws += 1;
            self.inner.next_u64()
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.inner.fill_bytes(dest)
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.inner.try_fill_bytes(dest)
        }
    }

    #[test]
    fn generated_points_respect_rmin_and_occupied() {
        let cell = PeriodicBox::new(10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let occupied = vec![Position::origin(), Position::new(2.0, 2.0, 2.0)];

        let points = generate_points(50, &cell, 1.0, &occupied, 1000, &mut rng).unwrap();

        assert_eq!(points.len(), 50);
        assert_no_overlap(&points, &occupied, 1.0, &cell);
    }

    #[test]
    fn zero_count_returns_empty_without_sampling() {
        let cell = PeriodicBox::new(10.0).unwrap();
        let mut rng = CountingRng {
            inner: StdRng::seed_from_u64(0),
            draws: 0,
        };
        let points = generate_points(0, &cell, 1.0, &[], 10, &mut rng).unwrap();
        assert!(points.is_empty());
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn zero_rmin_accepts_first_draw_for_every_slot() {
        let cell = PeriodicBox::new(1.0).unwrap();
        let mut rng = CountingRng {
            inner: StdRng::seed_from_u64(11),
            draws: 0,
        };
        let occupied = vec![Position::origin(); 5];

        let points = generate_points(100, &cell, 0.0, &occupied, 1, &mut rng).unwrap();

        assert_eq!(points.len(), 100);
        // One f64 per axis, one draw per slot.
        assert_eq!(rng.draws, 3 * 100);
    }

    #[test]
    fn impossible_packing_exhausts_attempt_budget() {
        let cell = PeriodicBox::new(1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(17);

        let result = generate_points(10, &cell, 1.0, &[], 50, &mut rng);

        match result {
            Err(GenerationError::PlacementExhausted { slot, attempts }) => {
                // Nothing in a unit box is farther than ~0.87 from the first point.
                assert_eq!(slot, 1);
                assert_eq!(attempts, 50);
            }
            other => panic!("expected PlacementExhausted, got {other:?}"),
        }
    }

    #[test]
    fn exhausted_slot_consumes_exactly_the_budget() {
        let cell = PeriodicBox::new(1.0).unwrap();
        let mut rng = CountingRng {
            inner: StdRng::seed_from_u64(17),
            draws: 0,
        };
        // The primary cell's half-diagonal is ~0.87, so every draw overlaps the origin.
        let occupied = [Position::origin()];

        let result = generate_points(1, &cell, 1.0, &occupied, 50, &mut rng);

        assert!(matches!(
            result,
            Err(GenerationError::PlacementExhausted {
                slot: 0,
                attempts: 50
            })
        ));
        assert_eq!(rng.draws, 3 * 50);
    }

    #[test]
    fn crowded_occupied_set_leaves_no_room() {
        let cell = PeriodicBox::new(4.0).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let occupied: Vec<Position> = (0..8)
            .cartesian_product(0..8)
            .cartesian_product(0..8)
            .map(|((i, j), k)| {
                Position::new(
                    -2.0 + 0.5 * i as f64,
                    -2.0 + 0.5 * j as f64,
                    -2.0 + 0.5 * k as f64,
                )
            })
            .collect();

        let result = generate_points(1, &cell, 1.0, &occupied, 200, &mut rng);

        assert!(matches!(
            result,
            Err(GenerationError::PlacementExhausted { slot: 0, .. })
        ));
    }

    #[test]
    fn invalid_parameters_are_rejected_before_sampling() {
        let cell = PeriodicBox::new(5.0).unwrap();
        let mut rng = CountingRng {
            inner: StdRng::seed_from_u64(0),
            draws: 0,
        };

        let negative = generate_points(3, &cell, -0.1, &[], 10, &mut rng);
        assert!(matches!(
            negative,
            Err(GenerationError::InvalidParameter(InvalidParameter { name: "rmin", .. }))
        ));

        let no_budget = generate_points(3, &cell, 0.5, &[], 0, &mut rng);
        assert!(matches!(
            no_budget,
            Err(GenerationError::InvalidParameter(InvalidParameter {
                name: "max_attempts",
                ..
            }))
        ));
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn same_seed_gives_same_points() {
        let cell = PeriodicBox::new(6.0).unwrap();
        let a = generate_points(20, &cell, 0.8, &[], 500, &mut StdRng::seed_from_u64(4)).unwrap();
        let b = generate_points(20, &cell, 0.8, &[], 500, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(a, b);
    }
}
