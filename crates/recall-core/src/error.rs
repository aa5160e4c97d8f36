//! Error types for scheduling operations.

/// Errors that can occur while scheduling a review.
///
/// Out-of-range stability or difficulty is deliberately absent: those are
/// programming errors, caught by debug assertions and clamped in release builds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
	/// Grade outside `{1, 2, 3, 4}` (or not an integer).
	#[error("Invalid grade {0}: expected an integer from 1 (Again) to 4 (Easy)")]
	InvalidGrade(String),

	/// A parameter set failed validation.
	#[error("Invalid parameter `{field}`: {reason}")]
	InvalidParameters {
		/// Name of the offending field
		field: &'static str,
		/// What was wrong with it
		reason: String,
	},

	/// A stored card holds numbers the scheduler cannot work with.
	#[error("Invalid card `{field}`: {reason}")]
	InvalidCard {
		/// Name of the offending field
		field: &'static str,
		/// What was wrong with it
		reason: String,
	},
}

impl SchedulerError {
	/// Check if this error came from a rejected grade.
	#[must_use]
	pub const fn is_invalid_grade(&self) -> bool {
		matches!(self, Self::InvalidGrade(_))
	}

	/// Check if the caller can recover by retrying with different input.
	///
	/// A bad grade is recoverable; a bad parameter set or a corrupt stored
	/// card is not.
	#[must_use]
	pub const fn is_recoverable(&self) -> bool {
		self.is_invalid_grade()
	}

	pub(crate) fn invalid_card(field: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidCard {
			field,
			reason: reason.into(),
		}
	}

	pub(crate) fn invalid_parameter(field: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidParameters {
			field,
			reason: reason.into(),
		}
	}
}

/// Result type alias for scheduling operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_grade_errors_are_recoverable() {
		let err = SchedulerError::InvalidGrade("5".to_string());
		assert!(err.is_invalid_grade());
		assert!(err.is_recoverable());
		assert!(err.to_string().contains("Invalid grade 5"));
	}

	#[test]
	fn test_parameter_errors_are_not_recoverable() {
		let err = SchedulerError::invalid_parameter("requested_retention", "must be in (0, 1)");
		assert!(!err.is_invalid_grade());
		assert!(!err.is_recoverable());
		assert_eq!(
			err.to_string(),
			"Invalid parameter `requested_retention`: must be in (0, 1)"
		);
	}

	#[test]
	fn test_card_errors_name_the_field() {
		let err = SchedulerError::invalid_card("stability", "must be finite, got NaN");
		assert!(!err.is_recoverable());
		assert_eq!(err.to_string(), "Invalid card `stability`: must be finite, got NaN");
	}
}
