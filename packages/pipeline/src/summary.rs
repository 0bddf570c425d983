//! Per-run counters.

use crate::validate::ValidationError;

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based input line (or row) number.
    pub line: u64,
    pub message: String,
}

/// A record rejected by validation, with every failing check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    /// `space_id`, name, or row number identifying the record.
    pub label: String,
    pub errors: Vec<ValidationError>,
}

/// Counters accumulated over one pipeline run.
///
/// Owned by the run and returned to the caller; nothing is global.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub lines_read: u64,
    pub features_seen: u64,
    pub emitted: u64,
    pub skipped: u64,
    pub parse_warnings: Vec<ParseWarning>,
    /// Records dropped for a missing or non-point geometry.
    pub geometry_rejections: u64,
    pub validation_failures: Vec<ValidationFailure>,
}

impl RunSummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_parse_warning(&mut self, line: u64, message: impl Into<String>) {
        self.parse_warnings.push(ParseWarning {
            line,
            message: message.into(),
        });
    }

    pub fn record_validation_failure(
        &mut self,
        label: impl Into<String>,
        errors: Vec<ValidationError>,
    ) {
        self.validation_failures.push(ValidationFailure {
            label: label.into(),
            errors,
        });
    }

    /// Whether any record failed validation.
    #[must_use]
    pub fn has_validation_errors(&self) -> bool {
        !self.validation_failures.is_empty()
    }

    /// Adds another run's counters to this one.
    pub fn merge(&mut self, other: Self) {
        self.lines_read += other.lines_read;
        self.features_seen += other.features_seen;
        self.emitted += other.emitted;
        self.skipped += other.skipped;
        self.parse_warnings.extend(other.parse_warnings);
        self.geometry_rejections += other.geometry_rejections;
        self.validation_failures.extend(other.validation_failures);
    }

    /// Logs the counters at `info` and each failure at `warn`.
    pub fn log(&self, label: &str) {
        log::info!(
            "[{label}] {} lines, {} features: {} emitted, {} skipped, {} parse warnings, \
             {} geometry rejections, {} invalid",
            self.lines_read,
            self.features_seen,
            self.emitted,
            self.skipped,
            self.parse_warnings.len(),
            self.geometry_rejections,
            self.validation_failures.len(),
        );

        for failure in &self.validation_failures {
            for error in &failure.errors {
                log::warn!("[{label}] {}: {error}", failure.label);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_counters() {
        let mut a = RunSummary {
            lines_read: 3,
            emitted: 2,
            ..RunSummary::default()
        };
        a.record_parse_warning(2, "bad");

        let mut b = RunSummary {
            lines_read: 4,
            geometry_rejections: 1,
            ..RunSummary::default()
        };
        b.record_validation_failure("park-x", vec![ValidationError::EmptyName]);

        a.merge(b);
        assert_eq!(a.lines_read, 7);
        assert_eq!(a.emitted, 2);
        assert_eq!(a.geometry_rejections, 1);
        assert_eq!(a.parse_warnings.len(), 1);
        assert!(a.has_validation_errors());
    }
}
