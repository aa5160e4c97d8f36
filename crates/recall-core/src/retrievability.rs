//! Retrievability
//!
//! Probability of successful recall `t` days after the last review, for a
//! memory of stability `S`:
//!
//! ```text
//! R(t, S) = (1 + F · t / S)^(-d)      d = 0.5, F = 19/81
//! ```
//!
//! A power law rather than an exponential: the heavier tail matches how
//! human forgetting actually flattens out. `F` is chosen so that
//! `R(S, S) = 0.9`, which is what makes stability "days until 90% recall".

use chrono::{DateTime, Utc};

use crate::card::CardMemory;
use crate::error::{Result, SchedulerError};

/// Decay exponent `d` of the forgetting curve.
pub const DECAY: f64 = 0.5;

/// Scale factor `F`, fixed by `R(S, S) = 0.9` for `d = 0.5`.
pub const FACTOR: f64 = 19.0 / 81.0;

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Recall probability after `elapsed_days` for a memory of `stability`.
///
/// Negative elapsed time (clock skew) counts as zero.
///
/// # Panics
///
/// Debug builds assert `stability > 0`; a non-positive stability is a caller
/// bug. Release builds return `0.0` for it instead.
///
/// # Examples
///
/// ```
/// use recall_core::retrievability::retrievability;
///
/// assert_eq!(retrievability(0.0, 12.0), 1.0);
/// assert!((retrievability(12.0, 12.0) - 0.9).abs() < 1e-12);
/// assert!(retrievability(30.0, 12.0) < retrievability(20.0, 12.0));
/// ```
#[inline]
#[must_use]
pub fn retrievability(elapsed_days: f64, stability: f64) -> f64 {
	debug_assert!(stability > 0.0, "retrievability needs stability > 0, got {stability}");
	if stability <= 0.0 {
		return 0.0;
	}
	let t = elapsed_days.max(0.0);
	(FACTOR * t / stability + 1.0).powf(-DECAY)
}

/// Check a stability taken from outside the scheduler before using it.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidCard`] unless `stability` is finite and
/// strictly positive.
pub fn validate_stability(stability: f64) -> Result<f64> {
	if stability.is_finite() && stability > 0.0 {
		Ok(stability)
	} else {
		Err(SchedulerError::invalid_card(
			"stability",
			format!("must be finite and positive, got {stability}"),
		))
	}
}

/// [`retrievability`] for an unchecked stability.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidCard`] if `stability` is not finite and
/// strictly positive.
///
/// # Examples
///
/// ```
/// use recall_core::retrievability::checked_retrievability;
///
/// assert!(checked_retrievability(5.0, 0.0).is_err());
/// assert_eq!(checked_retrievability(0.0, 3.0), Ok(1.0));
/// ```
pub fn checked_retrievability(elapsed_days: f64, stability: f64) -> Result<f64> {
	validate_stability(stability).map(|s| retrievability(elapsed_days, s))
}

/// Fractional days from `from` to `to`, floored at zero.
///
/// A `to` earlier than `from` is clock skew between callers, not an error.
#[must_use]
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
	#[allow(clippy::cast_precision_loss)]
	let ms = (to - from).num_milliseconds() as f64;
	(ms / MS_PER_DAY).max(0.0)
}

/// Current recall probability of a stored card.
///
/// A never-reviewed card has nothing to forget and reports `1.0`.
#[must_use]
pub fn retrievability_at(card: &CardMemory, now: DateTime<Utc>) -> f64 {
	if card.is_new() {
		return 1.0;
	}
	retrievability(elapsed_days(card.last_reviewed_at, now), card.stability)
}
