//! Memory Update Engine
//!
//! One review in, one new memory state out. Every function here is pure:
//! the previous [`CardMemory`] is never touched and the [`ParameterSet`] is
//! passed in explicitly.
//!
//! ## First review
//!
//! ```text
//! D' = clamp(w4 - e^(w5·(G-1)) + 1, 1, 10)
//! S' = w[G-1]
//! ```
//!
//! ## Later reviews
//!
//! With `R` the retrievability at the moment of review:
//!
//! ```text
//! D' = clamp(w7·D0(Easy) + (1-w7)·(D - w6·(G-3)), 1, 10)
//!
//! lapse:   S' = w11 · D'^(-w12) · ((S+1)^w13 - 1) · e^((1-R)·w14)
//! recall:  S' = S · (1 + e^w8 · (11-D') · S^(-w9) · (e^((1-R)·w10) - 1) · hard · easy)
//! ```
//!
//! Reviews that arrive when `R` has already dropped produce the largest
//! stability gains. Post-lapse stability never exceeds the pre-lapse value,
//! and every stability is kept within `[0.1, 36500]` days.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::card::{CardMemory, CardState, Grade};
use crate::error::Result;
use crate::interval::{fuzz_interval, next_interval};
use crate::params::ParameterSet;
use crate::retrievability::elapsed_days;

/// Lowest stability the engine will ever produce, in days.
pub const MIN_STABILITY: f64 = 0.1;

/// Highest stability the engine will ever produce, in days.
pub const MAX_STABILITY: f64 = 36_500.0;

/// Difficulty bounds.
pub const MIN_DIFFICULTY: f64 = 1.0;
/// Difficulty bounds.
pub const MAX_DIFFICULTY: f64 = 10.0;

// ============================================================================
// Outcome types
// ============================================================================

/// Everything the engine worked out for one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
	/// The updated memory state, ready to persist
	pub card: CardMemory,
	/// Grade that produced it
	pub grade: Grade,
	/// Days since the previous review (zero on the first review or under clock skew)
	pub elapsed_days: f64,
	/// Recall probability at the moment of review; `None` on the first review
	pub retrievability: Option<f64>,
	/// Days until the new due date
	pub interval_days: u32,
}

/// Outcome of each possible grade for the same card at the same moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingPreview {
	/// Outcome if graded Again
	pub again: ReviewOutcome,
	/// Outcome if graded Hard
	pub hard: ReviewOutcome,
	/// Outcome if graded Good
	pub good: ReviewOutcome,
	/// Outcome if graded Easy
	pub easy: ReviewOutcome,
}

impl SchedulingPreview {
	/// Outcome for one grade.
	#[must_use]
	pub const fn get(&self, grade: Grade) -> &ReviewOutcome {
		match grade {
			Grade::Again => &self.again,
			Grade::Hard => &self.hard,
			Grade::Good => &self.good,
			Grade::Easy => &self.easy,
		}
	}

	/// Outcomes in ascending grade order.
	pub fn iter(&self) -> impl Iterator<Item = &ReviewOutcome> {
		[&self.again, &self.hard, &self.good, &self.easy].into_iter()
	}
}

// ============================================================================
// Difficulty
// ============================================================================

/// Difficulty assigned on a card's first review.
///
/// `D0(G) = clamp(w4 - e^(w5·(G-1)) + 1, 1, 10)`
#[inline]
#[must_use]
pub fn initial_difficulty(grade: Grade, params: &ParameterSet) -> f64 {
	let w = params.weights();
	let raw = w[4] - (w[5] * (grade.as_f64() - 1.0)).exp() + 1.0;
	raw.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Difficulty after a later review.
///
/// Steps by `w6` per grade away from Good, then reverts a fraction `w7`
/// of the way towards `D0(Easy)` so long histories cannot drift to a bound.
#[inline]
#[must_use]
pub fn next_difficulty(difficulty: f64, grade: Grade, params: &ParameterSet) -> f64 {
	let w = params.weights();
	let stepped = w[6].mul_add(-(grade.as_f64() - 3.0), difficulty);
	let target = initial_difficulty(Grade::Easy, params);
	let reverted = w[7].mul_add(target, (1.0 - w[7]) * stepped);
	reverted.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

// ============================================================================
// Stability
// ============================================================================

/// Stability after a successful recall (Hard, Good or Easy).
///
/// Never below the previous stability: the growth factor is at least 1.
#[must_use]
pub fn recall_stability(
	difficulty: f64,
	stability: f64,
	retrievability: f64,
	grade: Grade,
	params: &ParameterSet,
) -> f64 {
	let w = params.weights();
	let recall_gain = ((1.0 - retrievability) * w[10]).exp_m1();
	// Reviewed at R = 1: no gain
	if recall_gain <= 0.0 {
		return clamp_stability(stability, stability);
	}
	let growth = w[8].exp()
		* (11.0 - difficulty)
		* stability.powf(-w[9])
		* recall_gain
		* params.grade_modifier(grade);
	clamp_stability(stability * (growth + 1.0), stability)
}

/// Stability after a lapse (Again).
///
/// Capped at the pre-lapse stability; forgetting never strengthens a memory.
#[must_use]
pub fn forget_stability(
	difficulty: f64,
	stability: f64,
	retrievability: f64,
	params: &ParameterSet,
) -> f64 {
	let w = params.weights();
	let raw = w[11]
		* difficulty.powf(-w[12])
		* ((stability + 1.0).powf(w[13]) - 1.0)
		* ((1.0 - retrievability) * w[14]).exp();
	clamp_stability(raw.min(stability), stability)
}

/// Keep `stability` within `[MIN_STABILITY, MAX_STABILITY]`; a NaN falls back
/// to `previous`.
fn clamp_stability(stability: f64, previous: f64) -> f64 {
	let stability = if stability.is_nan() { previous } else { stability };
	stability.clamp(MIN_STABILITY, MAX_STABILITY)
}

// ============================================================================
// Update
// ============================================================================

/// Apply one review and return the full outcome, drawing fuzz from `rng`.
///
/// `rng` is only consulted when fuzzing is enabled and the interval is long
/// enough to fuzz.
pub fn schedule_with_rng<R: Rng + ?Sized>(
	card: &CardMemory,
	grade: Grade,
	now: DateTime<Utc>,
	params: &ParameterSet,
	rng: &mut R,
) -> ReviewOutcome {
	let (stability, difficulty, elapsed, r) = if card.is_new() {
		(
			clamp_stability(params.initial_stability(grade), MIN_STABILITY),
			initial_difficulty(grade, params),
			0.0,
			None,
		)
	} else {
		if now < card.last_reviewed_at {
			debug!(
				last_reviewed_at = %card.last_reviewed_at,
				%now,
				"review timestamp precedes last review; treating elapsed time as zero"
			);
		}
		let t = elapsed_days(card.last_reviewed_at, now);
		let r = params.retrievability(t, card.stability);
		let difficulty = next_difficulty(card.difficulty, grade, params);
		let stability = match grade {
			Grade::Again => forget_stability(difficulty, card.stability, r, params),
			Grade::Hard | Grade::Good | Grade::Easy => {
				recall_stability(difficulty, card.stability, r, grade, params)
			}
		};
		(stability, difficulty, t, Some(r))
	};

	// A card with the zero-stability sentinel is new whatever its stored state says.
	let previous_state = if card.is_new() { CardState::New } else { card.state };
	let state = previous_state.next(grade);

	let base_interval = next_interval(stability, params);
	let interval_days = if params.enable_fuzzing() {
		fuzz_interval(base_interval, params.max_interval_days(), rng)
	} else {
		base_interval
	};

	let due_at = now
		.checked_add_signed(Duration::days(i64::from(interval_days)))
		.unwrap_or(DateTime::<Utc>::MAX_UTC);

	let next = CardMemory {
		stability,
		difficulty,
		due_at,
		last_reviewed_at: now,
		state,
	};
	check_invariants(&next);

	trace!(
		?grade,
		from = ?card.state,
		to = ?state,
		elapsed_days = elapsed,
		retrievability = ?r,
		stability,
		difficulty,
		base_interval,
		interval_days,
		"review scheduled"
	);

	ReviewOutcome {
		card: next,
		grade,
		elapsed_days: elapsed,
		retrievability: r,
		interval_days,
	}
}

/// Apply one review and return the full outcome.
///
/// When fuzzing is enabled the jitter is seeded from the card's memory state,
/// the grade and `now`, so identical arguments always give identical results.
/// Two cards in the same memory state graded alike in the same millisecond
/// (a bulk import of fresh cards, say) therefore get the same fuzz; use
/// [`schedule_keyed`] to spread them.
#[must_use]
pub fn schedule(
	card: &CardMemory,
	grade: Grade,
	now: DateTime<Utc>,
	params: &ParameterSet,
) -> ReviewOutcome {
	schedule_keyed(card, grade, now, params, 0)
}

/// [`schedule`] with a stable per-card key (e.g. the storage id) mixed into
/// the fuzz seed. A key of `0` gives the same result as [`schedule`].
#[must_use]
pub fn schedule_keyed(
	card: &CardMemory,
	grade: Grade,
	now: DateTime<Utc>,
	params: &ParameterSet,
	card_key: u64,
) -> ReviewOutcome {
	let mut rng = StdRng::seed_from_u64(fuzz_seed(card, grade, now, card_key));
	schedule_with_rng(card, grade, now, params, &mut rng)
}

/// Apply one review to a card.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use recall_core::card::{CardMemory, CardState, Grade};
/// use recall_core::params::ParameterSet;
/// use recall_core::scheduler::update;
///
/// let params = ParameterSet::default().with_fuzzing(false);
/// let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
///
/// let first = update(&CardMemory::new(t0), Grade::Good, t0, &params);
/// assert_eq!(first.state, CardState::Review);
/// assert_eq!(first.stability, params.weights()[2]);
///
/// let second = update(&first, Grade::Good, first.due_at, &params);
/// assert!(second.stability > first.stability);
/// assert!(second.due_at > first.due_at);
/// ```
#[must_use]
pub fn update(
	card: &CardMemory,
	grade: Grade,
	now: DateTime<Utc>,
	params: &ParameterSet,
) -> CardMemory {
	schedule(card, grade, now, params).card
}

/// [`update`] with an injected random source for fuzzing.
pub fn update_with_rng<R: Rng + ?Sized>(
	card: &CardMemory,
	grade: Grade,
	now: DateTime<Utc>,
	params: &ParameterSet,
	rng: &mut R,
) -> CardMemory {
	schedule_with_rng(card, grade, now, params, rng).card
}

/// [`update`] for a grade that has not been validated yet, e.g. straight
/// from the external grading step.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidGrade`](crate::error::SchedulerError::InvalidGrade)
/// unless `raw_grade` is exactly 1, 2, 3 or 4, and
/// [`SchedulerError::InvalidCard`](crate::error::SchedulerError::InvalidCard)
/// if the card fails [`CardMemory::validate`]. The card is not touched.
pub fn update_raw(
	card: &CardMemory,
	raw_grade: f64,
	now: DateTime<Utc>,
	params: &ParameterSet,
) -> Result<CardMemory> {
	let grade = Grade::try_from(raw_grade)?;
	card.validate()?;
	Ok(update(card, grade, now, params))
}

/// Outcomes for all four grades, for showing what each answer would do.
#[must_use]
pub fn preview(card: &CardMemory, now: DateTime<Utc>, params: &ParameterSet) -> SchedulingPreview {
	SchedulingPreview {
		again: schedule(card, Grade::Again, now, params),
		hard: schedule(card, Grade::Hard, now, params),
		good: schedule(card, Grade::Good, now, params),
		easy: schedule(card, Grade::Easy, now, params),
	}
}

/// Deterministic fuzz seed for a review.
fn fuzz_seed(card: &CardMemory, grade: Grade, now: DateTime<Utc>, card_key: u64) -> u64 {
	#[allow(clippy::cast_sign_loss)]
	let millis = now.timestamp_millis() as u64;
	millis
		^ card.stability.to_bits().rotate_left(17)
		^ card.difficulty.to_bits().rotate_left(41)
		^ u64::from(grade.value()).rotate_left(59)
		^ card_key.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn check_invariants(card: &CardMemory) {
	debug_assert!(
		card.stability >= MIN_STABILITY && card.stability <= MAX_STABILITY,
		"stability {} out of range",
		card.stability
	);
	debug_assert!(
		(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&card.difficulty),
		"difficulty {} out of range",
		card.difficulty
	);
	debug_assert!(card.due_at >= card.last_reviewed_at, "due date precedes review");
	debug_assert!(card.state != CardState::New, "reviewed card left in New");
}
