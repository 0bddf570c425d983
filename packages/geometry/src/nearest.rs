//! Nearest-feature search.

use geo::{Distance as _, Haversine, Point};

/// Great-circle (haversine) distance between two WGS84 points, in
/// kilometres.
#[must_use]
pub fn great_circle_km(a: &Point<f64>, b: &Point<f64>) -> f64 {
    Haversine.distance(*a, *b) / 1000.0
}

/// Returns the candidate closest to `point`.
///
/// Every candidate is visited once. `location` maps a candidate to its
/// representative point and `distance` measures between two points. Ties
/// go to the candidate encountered first; candidates whose distance is
/// `NaN` never win. Returns `None` when `candidates` is empty.
pub fn nearest_feature<'a, T, L, D>(
    point: &Point<f64>,
    candidates: &'a [T],
    location: L,
    distance: D,
) -> Option<&'a T>
where
    L: Fn(&T) -> Point<f64>,
    D: Fn(&Point<f64>, &Point<f64>) -> f64,
{
    let mut best: Option<(&T, f64)> = None;

    for candidate in candidates {
        let d = distance(point, &location(candidate));
        match best {
            None if !d.is_nan() => best = Some((candidate, d)),
            Some((_, best_d)) if d < best_d => best = Some((candidate, d)),
            _ => {}
        }
    }

    best.map(|(candidate, _)| candidate)
}
