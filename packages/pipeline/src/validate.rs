//! Record validation.
//!
//! Every check runs on every record so a single pass reports all problems.

use std::collections::BTreeSet;

use public_space_models::CanonicalSpace;
use public_space_slug::is_strict_slug;

use crate::stage::{Stage, StageOutcome};

/// One failed validation check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid space_id: {0}")]
    InvalidSpaceId(String),

    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Name should not be empty")]
    EmptyName,

    #[error("Description should not be empty")]
    EmptyDescription,

    /// The geometry text is not JSON or not `GeoJSON`.
    #[error("Invalid GeoJSON format in geometry")]
    InvalidGeometry,

    /// The geometry parsed but is not a point with two finite ordinates.
    #[error("Invalid GeoJSON Point geometry - {0}")]
    InvalidPoint(String),

    #[error("Duplicate space_id: {0}")]
    DuplicateSpaceId(String),
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|s| s.trim().is_empty())
}

/// Validates a single space.
///
/// Checks a strict `space_id`, non-empty `name` and `description`, and
/// finite coordinates. The type is already known to be valid once a
/// [`CanonicalSpace`] exists. Returns every failing check; an empty vector
/// means the record is valid.
#[must_use]
pub fn validate(space: &CanonicalSpace) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let space_id = space.space_id.as_deref().unwrap_or_default();
    if !is_strict_slug(space_id) {
        errors.push(ValidationError::InvalidSpaceId(space_id.to_string()));
    }
    if is_blank(space.name.as_deref()) {
        errors.push(ValidationError::EmptyName);
    }
    if is_blank(space.description.as_deref()) {
        errors.push(ValidationError::EmptyDescription);
    }
    if !(space.longitude.is_finite() && space.latitude.is_finite()) {
        errors.push(ValidationError::InvalidPoint(space_id.to_string()));
    }

    errors
}

/// Stage that emits valid spaces and rejects the rest.
///
/// Also rejects a `space_id` already seen earlier in the same run.
#[derive(Debug, Default)]
pub struct ValidateStage {
    seen: BTreeSet<String>,
}

impl ValidateStage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for ValidateStage {
    type Output = CanonicalSpace;

    fn process(&mut self, space: CanonicalSpace) -> StageOutcome<CanonicalSpace> {
        let mut errors = validate(&space);

        if let Some(id) = space.space_id.as_deref()
            && !id.is_empty()
            && !self.seen.insert(id.to_string())
        {
            errors.push(ValidationError::DuplicateSpaceId(id.to_string()));
        }

        if errors.is_empty() {
            StageOutcome::Emit(space)
        } else {
            StageOutcome::Invalid(errors)
        }
    }
}
