//! Description improvement through an external text oracle.
//!
//! The oracle receives one feature as JSON and answers with a replacement
//! description, or `nochanges`. Any failure is treated as "no change" so a
//! flaky oracle never blocks a run.

use std::io::Write as _;
use std::process::{Command, Stdio};

use public_space_models::CanonicalSpace;
use serde::Serialize;

use crate::feature::space_to_feature;
use crate::stage::{Stage, StageOutcome};

/// Sentinel answer meaning the current description is fine.
pub const NO_CHANGES: &str = "nochanges";

/// Errors raised by a [`DescriptionOracle`].
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Spawning or talking to the oracle failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The oracle ran but reported failure.
    #[error("oracle exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The feature could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque text-improvement capability.
pub trait DescriptionOracle {
    /// Returns a proposed description for the feature in `feature_json`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] if the oracle could not produce an answer.
    fn describe(&mut self, feature_json: &str) -> Result<String, OracleError>;
}

/// Decides whether an oracle answer changes the description.
///
/// Blank answers, [`NO_CHANGES`] (any case), errors and answers equal to
/// the current description all mean no change.
#[must_use]
pub fn interpret_response(
    response: Result<String, OracleError>,
    current: Option<&str>,
) -> Option<String> {
    let text = match response {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Description oracle failed: {e}");
            return None;
        }
    };

    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(NO_CHANGES) {
        return None;
    }
    if current.is_some_and(|c| c.trim() == text) {
        return None;
    }

    Some(text.to_string())
}

/// A proposed description for one space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionChange {
    pub space_id: String,
    pub description: String,
}

impl DescriptionChange {
    /// CSV header matching the serialized field order.
    pub const COLUMNS: &[&str] = &["space_id", "description"];
}

/// Stage asking the oracle about every space with a `space_id`.
pub struct DescribeStage<O> {
    oracle: O,
}

impl<O: DescriptionOracle> DescribeStage<O> {
    pub const fn new(oracle: O) -> Self {
        Self { oracle }
    }
}

impl<O: DescriptionOracle> Stage for DescribeStage<O> {
    type Output = DescriptionChange;

    fn process(&mut self, space: CanonicalSpace) -> StageOutcome<DescriptionChange> {
        let Some(space_id) = space.space_id.clone().filter(|s| !s.is_empty()) else {
            log::warn!("Skipping {}: no space_id", space.label());
            return StageOutcome::Skip;
        };

        let response = serde_json::to_string(&space_to_feature(&space))
            .map_err(OracleError::from)
            .and_then(|json| self.oracle.describe(&json));

        match interpret_response(response, space.description.as_deref()) {
            Some(description) => {
                log::debug!("{space_id}: new description");
                StageOutcome::Emit(DescriptionChange {
                    space_id,
                    description,
                })
            }
            None => StageOutcome::Skip,
        }
    }
}

/// Runs an external command per feature, passing the feature on stdin and
/// reading the answer from stdout.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
}

impl CommandOracle {
    #[must_use]
    pub const fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

impl DescriptionOracle for CommandOracle {
    fn describe(&mut self, feature_json: &str) -> Result<String, OracleError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(feature_json.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(OracleError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use public_space_models::SpaceType;

    use super::*;

    struct ScriptedOracle {
        answers: Vec<Result<String, String>>,
        seen: Vec<String>,
    }

    impl DescriptionOracle for ScriptedOracle {
        fn describe(&mut self, feature_json: &str) -> Result<String, OracleError> {
            self.seen.push(feature_json.to_string());
            self.answers
                .remove(0)
                .map_err(|e| OracleError::Io(std::io::Error::other(e)))
        }
    }

    fn space(id: Option<&str>, description: &str) -> CanonicalSpace {
        let mut space = CanonicalSpace::new(SpaceType::Plaza, -73.99, 40.75);
        space.space_id = id.map(str::to_string);
        space.description = Some(description.to_string());
        space
    }

    #[test]
    fn interprets_no_change_answers() {
        assert_eq!(interpret_response(Ok("nochanges".to_string()), None), None);
        assert_eq!(interpret_response(Ok(" NoChanges\n".to_string()), None), None);
        assert_eq!(interpret_response(Ok("   ".to_string()), None), None);
        assert_eq!(
            interpret_response(Ok("Same.".to_string()), Some("Same.")),
            None
        );
        assert_eq!(
            interpret_response(
                Err(OracleError::Io(std::io::Error::other("timeout"))),
                Some("Old")
            ),
            None
        );
        assert_eq!(
            interpret_response(Ok(" Better. \n".to_string()), Some("Old")),
            Some("Better.".to_string())
        );
    }

    #[test]
    fn stage_emits_only_changes() {
        let oracle = ScriptedOracle {
            answers: vec![
                Ok("A busy plaza.".to_string()),
                Ok("nochanges".to_string()),
                Err("boom".to_string()),
            ],
            seen: Vec::new(),
        };
        let mut stage = DescribeStage::new(oracle);

        match stage.process(space(Some("plaza-a"), "Old")) {
            StageOutcome::Emit(change) => assert_eq!(
                change,
                DescriptionChange {
                    space_id: "plaza-a".to_string(),
                    description: "A busy plaza.".to_string(),
                }
            ),
            other => panic!("expected Emit, got {other:?}"),
        }
        assert!(matches!(
            stage.process(space(Some("plaza-b"), "Fine")),
            StageOutcome::Skip
        ));
        assert!(matches!(
            stage.process(space(Some("plaza-c"), "Fine")),
            StageOutcome::Skip
        ));
        assert!(matches!(
            stage.process(space(None, "Fine")),
            StageOutcome::Skip
        ));

        assert_eq!(stage.oracle.seen.len(), 3);
        assert!(stage.oracle.seen[0].contains(r#""space_id":"plaza-a""#));
    }
}
