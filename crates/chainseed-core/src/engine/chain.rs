use rand::Rng;
use tracing::{debug, instrument, trace, warn};

use super::error::GenerationError;
use super::overlap::overlaps_any;
use super::placement::{generate_points, require_attempts};
use super::utils::sampling::sample_direction;
use crate::core::models::cell::{
    InvalidParameter, PeriodicBox, Position, require_non_negative, require_positive,
};

/// Geometry of a single bonded chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainParams {
    /// Number of monomers.
    pub length: usize,
    /// Minimum allowed distance between any two monomers, and between a monomer
    /// and any occupied point.
    pub rmin: f64,
    /// Distance between consecutive monomers.
    pub bond_length: f64,
}

impl ChainParams {
    pub fn new(length: usize, rmin: f64, bond_length: f64) -> Self {
        Self {
            length,
            rmin,
            bond_length,
        }
    }

    /// Checks the parameters against `cell`.
    ///
    /// Bonds longer than half the box edge are rejected: their minimum image
    /// would be shorter than the bond itself.
    pub fn validate(&self, cell: &PeriodicBox) -> Result<(), InvalidParameter> {
        require_non_negative("rmin", self.rmin)?;
        require_positive("bond_length", self.bond_length)?;
        if self.bond_length > cell.half_length() {
            return Err(InvalidParameter::new(
                "bond_length",
                self.bond_length,
                "must not exceed half the box length",
            ));
        }
        Ok(())
    }
}

/// Grows a self-avoiding chain of `params.length` monomers in `cell`.
///
/// The first monomer is placed with [`generate_points`]. Every following monomer
/// sits one bond length away from its predecessor in an isotropically sampled
/// direction, and is accepted only if it keeps `params.rmin` from `occupied` and
/// from every monomer already in the chain. Each monomer gets up to
/// `max_attempts` proposals.
///
/// A walk can trap itself against its own history several bonds deep, which
/// resampling the last bond cannot undo. When a monomer runs out of proposals the
/// whole chain is discarded and growth restarts from a fresh first monomer, at
/// most `max_attempts` times.
///
/// # Arguments
///
/// * `params` - Chain length, exclusion distance and bond length.
/// * `cell` - The periodic box the chain is grown in.
/// * `occupied` - Points already present, which no monomer may approach closer
///   than `params.rmin`.
/// * `max_attempts` - Proposals per monomer, and also the number of whole-chain
///   restarts.
/// * `rng` - Source of randomness; a fixed seed reproduces the result.
///
/// # Return
///
/// The monomer positions in bond order. Only the first monomer is guaranteed
/// to lie in the primary cell; later ones follow the bonds unwrapped. A zero
/// length yields an empty chain without drawing any random numbers.
///
/// # Errors
///
/// - [`GenerationError::InvalidParameter`] if `params` or `max_attempts` are
///   malformed. No sampling happens in that case.
/// - [`GenerationError::PlacementExhausted`] if the first monomer cannot be
///   placed among `occupied`.
/// - [`GenerationError::ChainGenerationFailure`] once every restart has stalled.
#[instrument(level = "debug", skip_all, fields(length = params.length, bond_length = params.bond_length))]
pub fn build_chain(
    params: &ChainParams,
    cell: &PeriodicBox,
    occupied: &[Position],
    max_attempts: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Position>, GenerationError> {
    params.validate(cell)?;
    require_attempts(max_attempts)?;

    if params.length == 0 {
        return Ok(Vec::new());
    }
    if params.length > 1 && params.bond_length < params.rmin {
        warn!(
            bond_length = params.bond_length,
            rmin = params.rmin,
            "Bond length is shorter than rmin; consecutive monomers will always overlap."
        );
    }

    grow_with_restarts(params, cell, occupied, max_attempts, rng).map(|(chain, _)| chain)
}

/// Runs the restart loop of [`build_chain`] on validated input. Returns the chain
/// together with the 1-based restart that completed it.
fn grow_with_restarts(
    params: &ChainParams,
    cell: &PeriodicBox,
    occupied: &[Position],
    max_attempts: usize,
    rng: &mut impl Rng,
) -> Result<(Vec<Position>, usize), GenerationError> {
    let mut stalled_at = 0;
    for restart in 1..=max_attempts {
        let mut chain = generate_points(1, cell, params.rmin, occupied, max_attempts, rng)?;
        chain.reserve(params.length - 1);

        match grow(&mut chain, params, cell, occupied, max_attempts, rng) {
            Ok(()) => {
                debug!(restart, "Chain complete.");
                return Ok((chain, restart));
            }
            Err(index) => {
                debug!(restart, stalled_at = index, "Chain growth stalled, restarting.");
                stalled_at = index;
            }
        }
    }

    Err(GenerationError::ChainGenerationFailure {
        restarts: max_attempts,
        stalled_at,
    })
}

/// Extends `chain` up to `params.length` monomers. Returns the index of the
/// monomer that could not be placed.
fn grow(
    chain: &mut Vec<Position>,
    params: &ChainParams,
    cell: &PeriodicBox,
    occupied: &[Position],
    max_attempts: usize,
    rng: &mut impl Rng,
) -> Result<(), usize> {
    for index in 1..params.length {
        let previous = chain[index - 1];
        match propose(index, &previous, chain, params, cell, occupied, max_attempts, rng) {
            Some(position) => chain.push(position),
            None => return Err(index),
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn propose(
    index: usize,
    previous: &Position,
    chain: &[Position],
    params: &ChainParams,
    cell: &PeriodicBox,
    occupied: &[Position],
    max_attempts: usize,
    rng: &mut impl Rng,
) -> Option<Position> {
    for attempt in 1..=max_attempts {
        let candidate = previous + sample_direction(rng) * params.bond_length;
        if !overlaps_any(&candidate, occupied, chain, params.rmin, cell) {
            trace!(index, attempt, "Accepted monomer.");
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::{SeedableRng, rngs::StdRng};

    const TOLERANCE: f64 = 1e-9;

    fn assert_chain_invariants(
        chain: &[Position],
        occupied: &[Position],
        params: &ChainParams,
        cell: &PeriodicBox,
    ) {
        assert_eq!(chain.len(), params.length);
        for (a, b) in chain.iter().tuple_combinations() {
            assert!(cell.distance(a, b) >= params.rmin - TOLERANCE);
        }
        for (a, b) in chain.iter().cartesian_product(occupied.iter()) {
            assert!(cell.distance(a, b) >= params.rmin - TOLERANCE);
        }
        for (a, b) in chain.iter().tuple_windows() {
            let bond = cell.distance(a, b);
            assert!(
                (bond - params.bond_length).abs() <= TOLERANCE * params.bond_length,
                "bond = {bond}"
            );
        }
    }

    #[test]
    fn short_chain_in_roomy_box_satisfies_invariants() {
        let cell = PeriodicBox::new(10.0).unwrap();
        let params = ChainParams::new(5, 1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(1);

        let chain = build_chain(&params, &cell, &[], 1000, &mut rng).unwrap();

        assert_chain_invariants(&chain, &[], &params, &cell);
    }

    #[test]
    fn long_chain_avoids_itself_and_occupied_points() {
        let cell = PeriodicBox::new(12.0).unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let occupied = generate_points(40, &cell, 1.0, &[], 1000, &mut rng).unwrap();
        let params = ChainParams::new(100, 0.9, 1.0);

        let chain = build_chain(&params, &cell, &occupied, 1000, &mut rng).unwrap();

        assert_chain_invariants(&chain, &occupied, &params, &cell);
    }

    #[test]
    fn chain_may_cross_the_periodic_boundary() {
        let cell = PeriodicBox::new(3.0).unwrap();
        let params = ChainParams::new(12, 0.5, 1.0);
        let mut rng = StdRng::seed_from_u64(9);

        let chain = build_chain(&params, &cell, &[], 1000, &mut rng).unwrap();

        assert_chain_invariants(&chain, &[], &params, &cell);
    }

    #[test]
    fn zero_length_chain_is_empty() {
        let cell = PeriodicBox::new(10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let chain = build_chain(&ChainParams::new(0, 1.0, 1.0), &cell, &[], 10, &mut rng).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn single_monomer_chain_is_one_point() {
        let cell = PeriodicBox::new(10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let chain = build_chain(&ChainParams::new(1, 1.0, 1.0), &cell, &[], 10, &mut rng).unwrap();
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn bond_shorter_than_rmin_fails_after_all_restarts() {
        let cell = PeriodicBox::new(10.0).unwrap();
        let params = ChainParams::new(3, 1.0, 0.5);
        let mut rng = StdRng::seed_from_u64(2);

        let result = build_chain(&params, &cell, &[], 20, &mut rng);

        assert_eq!(
            result,
            Err(GenerationError::ChainGenerationFailure {
                restarts: 20,
                stalled_at: 1
            })
        );
    }

    #[test]
    fn stalled_growth_recovers_on_a_later_restart() {
        let cell = PeriodicBox::new(10.0).unwrap();
        let params = ChainParams::new(20, 0.95, 1.0);
        let max_attempts = 3;
        let mut recovered = 0;

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            match grow_with_restarts(&params, &cell, &[], max_attempts, &mut rng) {
                Ok((chain, restart)) => {
                    assert_chain_invariants(&chain, &[], &params, &cell);
                    if restart > 1 {
                        recovered += 1;
                        let mut rng = StdRng::seed_from_u64(seed);
                        let public = build_chain(&params, &cell, &[], max_attempts, &mut rng);
                        assert_eq!(public, Ok(chain));
                    }
                }
                Err(err) => assert!(matches!(
                    err,
                    GenerationError::ChainGenerationFailure { restarts: 3, .. }
                )),
            }
        }

        assert!(recovered > 0, "no chain needed a restart to complete");
    }

    #[test]
    fn first_monomer_placement_failure_is_propagated() {
        let cell = PeriodicBox::new(1.0).unwrap();
        let params = ChainParams::new(4, 1.0, 0.5);
        let occupied = [Position::origin()];
        let mut rng = StdRng::seed_from_u64(2);

        let result = build_chain(&params, &cell, &occupied, 30, &mut rng);

        assert_eq!(
            result,
            Err(GenerationError::PlacementExhausted {
                slot: 0,
                attempts: 30
            })
        );
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let cell = PeriodicBox::new(4.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        for (params, name) in [
            (ChainParams::new(3, 1.0, 0.0), "bond_length"),
            (ChainParams::new(3, 1.0, -1.0), "bond_length"),
            (ChainParams::new(3, 1.0, 2.5), "bond_length"),
            (ChainParams::new(3, f64::NAN, 1.0), "rmin"),
        ] {
            match build_chain(&params, &cell, &[], 10, &mut rng) {
                Err(GenerationError::InvalidParameter(err)) => assert_eq!(err.name, name),
                other => panic!("expected InvalidParameter for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn same_seed_gives_same_chain() {
        let cell = PeriodicBox::new(8.0).unwrap();
        let params = ChainParams::new(30, 0.9, 1.0);
        let a = build_chain(&params, &cell, &[], 100, &mut StdRng::seed_from_u64(77)).unwrap();
        let b = build_chain(&params, &cell, &[], 100, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a, b);
    }
}
