//! Borough consistency check.

use geo::Point;
use public_space_geometry::BoroughIndex;
use public_space_models::{Borough, CanonicalSpace};
use public_space_pipeline::{Stage, StageOutcome};
use serde::Serialize;

/// Returns the first borough named in `values`.
///
/// Values are scanned in order; within a value the boroughs are tried in
/// [`Borough::ALL`] order as case-insensitive substrings.
pub fn mentioned_borough<'a, I>(values: I) -> Option<Borough>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().find_map(|value| {
        let value = value.to_lowercase();
        Borough::ALL
            .iter()
            .copied()
            .find(|b| value.contains(&b.as_ref().to_lowercase()))
    })
}

/// A record whose text names a different borough than its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoroughMismatch {
    pub space_id: String,
    pub mentioned: String,
    pub resolved: String,
}

impl BoroughMismatch {
    /// CSV header matching the serialized field order.
    pub const COLUMNS: &[&str] = &["space_id", "mentioned", "resolved"];
}

/// Checks records against borough polygons.
pub struct BoroughChecker {
    index: BoroughIndex,
}

impl BoroughChecker {
    #[must_use]
    pub const fn new(index: BoroughIndex) -> Self {
        Self { index }
    }

    /// Reports a mismatch when the record mentions a borough and its point
    /// falls in a different one.
    ///
    /// Records that mention no borough, or whose point lies outside every
    /// polygon, are never reported.
    #[must_use]
    pub fn check(&self, space: &CanonicalSpace) -> Option<BoroughMismatch> {
        let mentioned = mentioned_borough(space.string_values())?;
        let point = Point::new(space.longitude, space.latitude);
        let resolved = self.index.lookup(&point)?;

        if mentioned.matches_name(resolved) {
            return None;
        }

        Some(BoroughMismatch {
            space_id: space.label().to_string(),
            mentioned: mentioned.to_string(),
            resolved: resolved.to_string(),
        })
    }
}

/// Stage emitting one [`BoroughMismatch`] per inconsistent record.
pub struct BoroughCheckStage {
    checker: BoroughChecker,
}

impl BoroughCheckStage {
    #[must_use]
    pub const fn new(checker: BoroughChecker) -> Self {
        Self { checker }
    }
}

impl Stage for BoroughCheckStage {
    type Output = BoroughMismatch;

    fn process(&mut self, space: CanonicalSpace) -> StageOutcome<BoroughMismatch> {
        match self.checker.check(&space) {
            Some(mismatch) => {
                log::info!(
                    "{}: mentions {} but lies in {}",
                    mismatch.space_id,
                    mismatch.mentioned,
                    mismatch.resolved
                );
                StageOutcome::Emit(mismatch)
            }
            None => StageOutcome::Skip,
        }
    }
}
