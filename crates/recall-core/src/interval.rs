//! Interval Sizing
//!
//! Turns a stability into a whole number of days until the next review:
//!
//! ```text
//! interval = clamp(round(S · ln(r) / ln(0.9)), 1, max_interval_days)
//! ```
//!
//! where `r` is the requested retention. At `r = 0.9` the interval is the
//! stability itself.
//!
//! ## Fuzzing
//!
//! Cards learned together would otherwise keep coming due together. With
//! fuzzing enabled, intervals of 2.5 days or more are drawn uniformly from a
//! window around the computed value. The window radius grows piecewise:
//!
//! | Interval portion | Added radius |
//! |------------------|--------------|
//! | base | 1 day |
//! | 2.5 – 7 days | 15% |
//! | 7 – 20 days | 10% |
//! | beyond 20 days | 5% |
//!
//! The lower edge never drops below 2 days and the upper edge never passes
//! the interval cap.

use rand::Rng;

use crate::params::ParameterSet;

/// Fuzz bands as `(start, end, factor)` in days.
const FUZZ_RANGES: [(f64, f64, f64); 3] = [
	(2.5, 7.0, 0.15),
	(7.0, 20.0, 0.10),
	(20.0, f64::INFINITY, 0.05),
];

/// Intervals shorter than this are never fuzzed.
const MIN_FUZZ_INTERVAL: f64 = 2.5;

/// Unfuzzed interval in whole days for a given stability.
///
/// # Examples
///
/// ```
/// use recall_core::interval::next_interval;
/// use recall_core::params::ParameterSet;
///
/// let params = ParameterSet::default();
/// assert_eq!(next_interval(20.0, &params), 20);
/// assert_eq!(next_interval(0.3, &params), 1);
///
/// let stricter = params.with_requested_retention(0.95).unwrap();
/// assert!(next_interval(20.0, &stricter) < 20);
/// ```
#[must_use]
// Clamped into [1, max_interval_days] before the cast
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn next_interval(stability: f64, params: &ParameterSet) -> u32 {
	let scale = params.requested_retention().ln() / 0.9_f64.ln();
	let max = f64::from(params.max_interval_days());
	(stability * scale).round().clamp(1.0, max) as u32
}

/// Inclusive `(min, max)` window a fuzzed interval is drawn from.
///
/// Returns `None` when the interval is too short to fuzz.
#[must_use]
pub fn fuzz_range(interval_days: u32, max_interval_days: u32) -> Option<(u32, u32)> {
	let interval = f64::from(interval_days.min(max_interval_days));
	if interval < MIN_FUZZ_INTERVAL {
		return None;
	}

	let delta = FUZZ_RANGES
		.iter()
		.fold(1.0, |acc, &(start, end, factor)| {
			factor.mul_add((interval.min(end) - start).max(0.0), acc)
		});

	let cap = f64::from(max_interval_days);
	let lower = (interval - delta).round().max(2.0);
	let upper = (interval + delta).round().min(cap);
	// Both ends lie in [1, max_interval_days]
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	let (lower, upper) = (lower.min(upper) as u32, upper as u32);
	Some((lower, upper))
}

/// Apply fuzz to an interval using the supplied random source.
///
/// Intervals below 2.5 days come back unchanged.
pub fn fuzz_interval<R: Rng + ?Sized>(
	interval_days: u32,
	max_interval_days: u32,
	rng: &mut R,
) -> u32 {
	match fuzz_range(interval_days, max_interval_days) {
		Some((lower, upper)) => rng.gen_range(lower..=upper),
		None => interval_days,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	#[test]
	fn test_retention_of_ninety_percent_is_identity() {
		let params = ParameterSet::default();
		for s in [1.0, 2.0, 20.0, 365.0] {
			#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
			let expected = s as u32;
			assert_eq!(next_interval(s, &params), expected);
		}
	}

	#[test]
	fn test_rounds_to_nearest_day() {
		let params = ParameterSet::default();
		assert_eq!(next_interval(4.4, &params), 4);
		assert_eq!(next_interval(4.6, &params), 5);
	}

	#[test]
	fn test_clamped_to_cap_and_floor() {
		let params = ParameterSet::default().with_max_interval_days(30).unwrap();
		assert_eq!(next_interval(0.01, &params), 1);
		assert_eq!(next_interval(5000.0, &params), 30);
	}

	#[test]
	fn test_lower_retention_stretches_intervals() {
		let relaxed = ParameterSet::default().with_requested_retention(0.8).unwrap();
		// ln(0.8) / ln(0.9) ≈ 2.118
		assert_eq!(next_interval(10.0, &relaxed), 21);
	}

	#[test]
	fn test_short_intervals_are_not_fuzzed() {
		assert_eq!(fuzz_range(1, 36_500), None);
		assert_eq!(fuzz_range(2, 36_500), None);

		let mut rng = StdRng::seed_from_u64(7);
		assert_eq!(fuzz_interval(2, 36_500, &mut rng), 2);
	}

	#[test]
	fn test_fuzz_windows() {
		// 3 days: delta = 1 + 0.15 * 0.5
		assert_eq!(fuzz_range(3, 36_500), Some((2, 4)));
		// 20 days: delta = 1 + 0.15 * 4.5 + 0.10 * 13 = 2.975
		assert_eq!(fuzz_range(20, 36_500), Some((17, 23)));
		// 100 days: delta = 2.975 + 0.05 * 80 = 6.975
		assert_eq!(fuzz_range(100, 36_500), Some((93, 107)));
	}

	#[test]
	fn test_fuzz_respects_cap() {
		assert_eq!(fuzz_range(100, 100), Some((93, 100)));
		assert_eq!(fuzz_range(500, 100), Some((93, 100)));
		assert_eq!(fuzz_range(3, 3), Some((2, 3)));
	}

	#[test]
	fn test_fuzzed_values_stay_in_window() {
		let mut rng = StdRng::seed_from_u64(42);
		let mut seen = std::collections::BTreeSet::new();
		for _ in 0..500 {
			let fuzzed = fuzz_interval(100, 36_500, &mut rng);
			assert!((93..=107).contains(&fuzzed));
			let _ = seen.insert(fuzzed);
		}
		// Jitter actually spreads cards out
		assert!(seen.len() > 5);
	}
}
