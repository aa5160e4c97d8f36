//! Card Memory
//!
//! The per-item memory record, the recall grade that drives it, and the
//! learning-state machine:
//!
//! | From | Again | Hard / Good / Easy |
//! |------|-------|--------------------|
//! | `New` | `Learning` | `Review` |
//! | `Learning` | `Learning` | `Review` |
//! | `Review` | `Relearning` | `Review` |
//! | `Relearning` | `Relearning` | `Review` |
//!
//! `New` is the only initial state and there is no terminal state: cards
//! cycle between `Review` and `Relearning` indefinitely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

// ============================================================================
// Grade
// ============================================================================

/// Recall quality for one review, supplied by the external grading step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Grade {
	/// Failed to recall
	Again = 1,
	/// Recalled with serious difficulty
	Hard = 2,
	/// Recalled after some hesitation
	Good = 3,
	/// Recalled effortlessly
	Easy = 4,
}

impl Grade {
	/// All grades in ascending order.
	pub const ALL: [Self; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

	/// Numeric value, 1 through 4.
	#[must_use]
	pub const fn value(self) -> u8 {
		self as u8
	}

	/// Whether this grade counts as a successful recall.
	#[must_use]
	pub const fn is_recall(self) -> bool {
		!matches!(self, Self::Again)
	}

	#[inline]
	pub(crate) fn as_f64(self) -> f64 {
		f64::from(self.value())
	}
}

impl From<Grade> for u8 {
	fn from(grade: Grade) -> Self {
		grade.value()
	}
}

impl TryFrom<u8> for Grade {
	type Error = SchedulerError;

	fn try_from(value: u8) -> Result<Self> {
		match value {
			1 => Ok(Self::Again),
			2 => Ok(Self::Hard),
			3 => Ok(Self::Good),
			4 => Ok(Self::Easy),
			other => Err(SchedulerError::InvalidGrade(other.to_string())),
		}
	}
}

impl TryFrom<i64> for Grade {
	type Error = SchedulerError;

	fn try_from(value: i64) -> Result<Self> {
		u8::try_from(value)
			.map_err(|_| SchedulerError::InvalidGrade(value.to_string()))
			.and_then(Self::try_from)
	}
}

impl TryFrom<f64> for Grade {
	type Error = SchedulerError;

	/// Accepts only exact integers 1.0 through 4.0; `2.5`, `NaN` and friends
	/// are rejected rather than rounded.
	fn try_from(value: f64) -> Result<Self> {
		if value.fract() != 0.0 || !(1.0..=4.0).contains(&value) {
			return Err(SchedulerError::InvalidGrade(value.to_string()));
		}
		// Exact integer in [1, 4]
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let whole = value as u8;
		Self::try_from(whole)
	}
}

// ============================================================================
// Learning state
// ============================================================================

/// Where a card sits in the learning lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CardState {
	/// Never reviewed
	New = 0,
	/// Failed its first review, not yet graduated
	Learning = 1,
	/// Graduated; long-interval reviews
	Review = 2,
	/// Lapsed out of review, not yet re-graduated
	Relearning = 3,
}

impl CardState {
	/// State after a review graded `grade`.
	///
	/// # Examples
	///
	/// ```
	/// use recall_core::card::{CardState, Grade};
	///
	/// assert_eq!(CardState::New.next(Grade::Again), CardState::Learning);
	/// assert_eq!(CardState::New.next(Grade::Hard), CardState::Review);
	/// assert_eq!(CardState::Review.next(Grade::Again), CardState::Relearning);
	/// assert_eq!(CardState::Relearning.next(Grade::Good), CardState::Review);
	/// ```
	#[must_use]
	pub const fn next(self, grade: Grade) -> Self {
		match (self, grade) {
			(Self::New | Self::Learning, Grade::Again) => Self::Learning,
			(Self::Review | Self::Relearning, Grade::Again) => Self::Relearning,
			(
				Self::New | Self::Learning | Self::Review | Self::Relearning,
				Grade::Hard | Grade::Good | Grade::Easy,
			) => Self::Review,
		}
	}

	/// Stable numeric code (0-3) used by storage layers.
	#[must_use]
	pub const fn code(self) -> u8 {
		self as u8
	}

	/// Inverse of [`CardState::code`].
	#[must_use]
	pub const fn from_code(code: u8) -> Option<Self> {
		match code {
			0 => Some(Self::New),
			1 => Some(Self::Learning),
			2 => Some(Self::Review),
			3 => Some(Self::Relearning),
			_ => None,
		}
	}
}

// ============================================================================
// Card memory
// ============================================================================

/// Memory state of one learning item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMemory {
	/// Days until recall probability decays to the requested retention.
	/// `0.0` marks a card that has never been reviewed.
	pub stability: f64,
	/// Intrinsic difficulty in `[1, 10]`; meaningless while `stability == 0`
	pub difficulty: f64,
	/// Scheduled next review
	pub due_at: DateTime<Utc>,
	/// Most recent review (creation time for a new card)
	pub last_reviewed_at: DateTime<Utc>,
	/// Lifecycle state
	pub state: CardState,
}

impl CardMemory {
	/// A brand-new card, due immediately.
	#[must_use]
	pub const fn new(created_at: DateTime<Utc>) -> Self {
		Self {
			stability: 0.0,
			difficulty: 0.0,
			due_at: created_at,
			last_reviewed_at: created_at,
			state: CardState::New,
		}
	}

	/// Whether the next review will be the card's first.
	///
	/// A zero stability is treated as never-reviewed even if the stored state
	/// disagrees, since no memory model exists to update.
	#[must_use]
	pub fn is_new(&self) -> bool {
		self.state == CardState::New || self.stability <= 0.0
	}

	/// Whether the card is due at `now`.
	#[must_use]
	pub fn is_due(&self, now: DateTime<Utc>) -> bool {
		self.due_at <= now
	}

	/// Check that a card loaded from storage can be handed to the scheduler.
	///
	/// # Errors
	///
	/// Returns [`SchedulerError::InvalidCard`] if `stability` is negative or
	/// not finite, or if `difficulty` is not finite.
	pub fn validate(&self) -> Result<()> {
		if !self.stability.is_finite() || self.stability < 0.0 {
			return Err(SchedulerError::invalid_card(
				"stability",
				format!("must be finite and non-negative, got {}", self.stability),
			));
		}
		if !self.difficulty.is_finite() {
			return Err(SchedulerError::invalid_card(
				"difficulty",
				format!("must be finite, got {}", self.difficulty),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn test_grade_parses_only_one_through_four() {
		assert_eq!(Grade::try_from(1_u8), Ok(Grade::Again));
		assert_eq!(Grade::try_from(4_i64), Ok(Grade::Easy));
		assert_eq!(Grade::try_from(3.0_f64), Ok(Grade::Good));

		for bad in [0_i64, 5, -1, 300] {
			assert!(Grade::try_from(bad).unwrap_err().is_invalid_grade());
		}
		for bad in [0.0, 5.0, 2.5, f64::NAN, f64::INFINITY] {
			assert!(Grade::try_from(bad).is_err(), "{bad} should be rejected");
		}
	}

	#[test]
	fn test_grade_order_matches_value() {
		let values: Vec<u8> = Grade::ALL.iter().map(|g| g.value()).collect();
		assert_eq!(values, vec![1, 2, 3, 4]);
		assert!(Grade::Again < Grade::Hard && Grade::Good < Grade::Easy);
		assert!(!Grade::Again.is_recall());
		assert!(Grade::Hard.is_recall());
	}

	#[test]
	fn test_transition_table() {
		use CardState::{Learning, New, Relearning, Review};

		let cases = [
			(New, Grade::Again, Learning),
			(New, Grade::Good, Review),
			(Learning, Grade::Again, Learning),
			(Learning, Grade::Hard, Review),
			(Review, Grade::Again, Relearning),
			(Review, Grade::Easy, Review),
			(Relearning, Grade::Again, Relearning),
			(Relearning, Grade::Hard, Review),
		];
		for (from, grade, to) in cases {
			assert_eq!(from.next(grade), to, "{from:?} --{grade:?}-->");
		}
	}

	#[test]
	fn test_nothing_returns_to_new() {
		for state in [CardState::New, CardState::Learning, CardState::Review, CardState::Relearning] {
			for grade in Grade::ALL {
				assert_ne!(state.next(grade), CardState::New);
			}
		}
	}

	#[test]
	fn test_state_codes_round_trip() {
		for code in 0..4 {
			let state = CardState::from_code(code).unwrap();
			assert_eq!(state.code(), code);
		}
		assert_eq!(CardState::from_code(4), None);
	}

	#[test]
	fn test_validate_rejects_unusable_numbers() {
		let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
		assert_eq!(CardMemory::new(created).validate(), Ok(()));

		let reviewed = CardMemory {
			stability: 12.0,
			difficulty: 4.0,
			due_at: created,
			last_reviewed_at: created,
			state: CardState::Review,
		};
		assert_eq!(reviewed.validate(), Ok(()));

		for stability in [f64::NAN, f64::INFINITY, -1.0] {
			let card = CardMemory { stability, ..reviewed.clone() };
			let err = card.validate().unwrap_err();
			assert!(matches!(err, SchedulerError::InvalidCard { field: "stability", .. }));
		}

		let card = CardMemory {
			difficulty: f64::NAN,
			..reviewed
		};
		assert!(matches!(
			card.validate(),
			Err(SchedulerError::InvalidCard { field: "difficulty", .. })
		));
	}

	#[test]
	fn test_new_card_is_due_at_creation() {
		let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
		let card = CardMemory::new(created);

		assert!(card.is_new());
		assert_eq!(card.stability, 0.0);
		assert_eq!(card.last_reviewed_at, created);
		assert!(card.is_due(created));
		assert!(!card.is_due(created - chrono::Duration::seconds(1)));
	}
}
