//! # Recall Core
//!
//! Spaced-repetition memory scheduler from the FSRS family: given a card's
//! memory state and a recall grade, predict how long the learner will retain
//! it and when it should next be reviewed.
//!
//! ## Core Concepts
//!
//! Every card carries two state variables:
//!
//! 1. **Stability** `S` - days until recall probability falls to 90%
//! 2. **Difficulty** `D` - intrinsic difficulty in `[1, 10]`
//!
//! From them follows **retrievability**, the probability of recall after `t` days:
//!
//! ```text
//! R(t, S) = (1 + 19/81 · t/S)^(-0.5)
//! ```
//!
//! Each review is graded Again, Hard, Good or Easy. Lapses and successful
//! recalls follow different stability curves, difficulty reverts towards a
//! mean so it cannot drift without bound, and reviews that arrive when recall
//! was already getting hard strengthen memory the most.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use recall_core::{select_due, update, CardMemory, CardState, Grade, ParameterSet};
//!
//! let params = ParameterSet::default();
//! let created = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
//!
//! // A brand-new card, graded Good on its first review
//! let card = update(&CardMemory::new(created), Grade::Good, created, &params);
//! assert_eq!(card.state, CardState::Review);
//!
//! // A week later it is due
//! let now = created + Duration::days(7);
//! let due = select_due(&[card.clone()], now);
//! assert_eq!(due.len(), 1);
//!
//! // Forgot it: back to relearning with reduced stability
//! let lapsed = update(&card, Grade::Again, now, &params);
//! assert_eq!(lapsed.state, CardState::Relearning);
//! assert!(lapsed.stability < card.stability);
//! ```
//!
//! ## Concurrency
//!
//! Every function is pure and synchronous with no shared state, so calls can
//! run on any number of threads without coordination. Persisting results for
//! the same card concurrently is the storage layer's problem.
//!
//! ## References
//!
//! - Ye, J. et al. (2022). *A Stochastic Shortest Path Algorithm for
//!   Optimizing Spaced Repetition Scheduling* - the FSRS model
//! - Wozniak, P. A. (1990). *Optimization of learning* - stability and
//!   retrievability as two components of memory

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod card;
pub mod display;
pub mod due;
pub mod error;
pub mod interval;
pub mod params;
pub mod retrievability;
pub mod scheduler;

pub use card::{CardMemory, CardState, Grade};
pub use display::{
	display_retention, summarize, urgency, DeckSummary, RetentionBand, ReviewUrgency,
	UrgencyCounts,
};
pub use due::{count_due, next_due_at, select_due};
pub use error::{Result, SchedulerError};
pub use interval::{fuzz_interval, fuzz_range, next_interval};
pub use params::{
	ParameterSet, ParameterSetConfig, DEFAULT_MAX_INTERVAL_DAYS, DEFAULT_REQUESTED_RETENTION,
	FSRS5_DEFAULT_WEIGHTS, WEIGHT_COUNT,
};
pub use retrievability::{
	checked_retrievability, elapsed_days, retrievability, retrievability_at, validate_stability,
};
pub use scheduler::{
	forget_stability, initial_difficulty, next_difficulty, preview, recall_stability, schedule,
	schedule_keyed, schedule_with_rng, update, update_raw, update_with_rng, ReviewOutcome,
	SchedulingPreview, MAX_DIFFICULTY, MAX_STABILITY, MIN_DIFFICULTY, MIN_STABILITY,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, TimeZone, Utc};

	#[test]
	fn test_review_cycle() {
		let params = ParameterSet::default().with_fuzzing(false);
		let t0 = Utc.with_ymd_and_hms(2024, 4, 2, 7, 45, 0).unwrap();

		let mut card = CardMemory::new(t0);
		let grades = [Grade::Again, Grade::Good, Grade::Good, Grade::Again, Grade::Hard, Grade::Easy];
		let expected = [
			CardState::Learning,
			CardState::Review,
			CardState::Review,
			CardState::Relearning,
			CardState::Review,
			CardState::Review,
		];

		for (grade, state) in grades.into_iter().zip(expected) {
			let now = card.due_at.max(t0) + Duration::hours(2);
			card = update(&card, grade, now, &params);
			assert_eq!(card.state, state);
			assert!(card.stability > 0.0);
			assert!((1.0..=10.0).contains(&card.difficulty));
			assert!(card.due_at > card.last_reviewed_at);
		}

		assert!(select_due(&[card.clone()], card.last_reviewed_at).is_empty());
		assert_eq!(select_due(&[card.clone()], card.due_at), vec![card]);
	}
}
