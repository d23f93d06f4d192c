use crate::core::models::cell::{PeriodicBox, Position};

/// Returns `true` if `candidate` lies closer than `rmin` to any point of
/// `existing`, using the minimum-image distance of `cell`.
///
/// The scan follows the order of `existing` and stops at the first violation.
/// An empty `existing` never overlaps.
pub fn overlaps(candidate: &Position, existing: &[Position], rmin: f64, cell: &PeriodicBox) -> bool {
    existing
        .iter()
        .any(|other| cell.distance(candidate, other) < rmin)
}

/// Like [`overlaps`], over the concatenation `occupied ++ accepted`.
///
/// The generators keep caller-supplied points and freshly accepted ones in
/// separate slices; this avoids copying them into a single buffer per draw.
#[inline]
pub fn overlaps_any(
    candidate: &Position,
    occupied: &[Position],
    accepted: &[Position],
    rmin: f64,
    cell: &PeriodicBox,
) -> bool {
    overlaps(candidate, occupied, rmin, cell) || overlaps(candidate, accepted, rmin, cell)
}
