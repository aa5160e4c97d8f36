//! Scheduler Parameters
//!
//! The immutable configuration every scheduling call is handed explicitly:
//! the 17-coefficient weight vector plus the scalar knobs that size intervals.
//!
//! ## Weight roles
//!
//! | Index | Role |
//! |-------|------|
//! | `w0..=w3` | initial stability for Again, Hard, Good, Easy |
//! | `w4, w5` | initial-difficulty curve `D0(G) = w4 - e^(w5(G-1)) + 1` |
//! | `w6` | difficulty step per grade away from Good |
//! | `w7` | mean-reversion weight towards `D0(Easy)` |
//! | `w8..=w10` | stability growth on successful recall |
//! | `w11..=w14` | post-lapse stability |
//! | `w15` | Hard penalty |
//! | `w16` | Easy bonus |
//!
//! A `ParameterSet` can only be obtained through validation, including when
//! deserialized, so the scheduler never has to re-check its inputs.

use serde::{Deserialize, Serialize};

use crate::card::Grade;
use crate::error::{Result, SchedulerError};

/// Number of model coefficients.
pub const WEIGHT_COUNT: usize = 17;

/// Published FSRS-5 default coefficients `w0..=w16`.
///
/// FSRS-5 publishes 19 values; the last two (`w17`, `w18`) drive same-day
/// short-term stability, which this model does not have, so they are omitted.
/// Every coefficient used here keeps the role and value it has upstream.
pub const FSRS5_DEFAULT_WEIGHTS: [f64; WEIGHT_COUNT] = [
	0.40255, 1.18385, 3.173, 15.69105, // w0-w3: initial stability
	7.1949, 0.5345, // w4-w5: initial difficulty
	1.4604, 0.0046, // w6-w7: difficulty step, mean reversion
	1.54575, 0.1192, 1.01925, // w8-w10: recall stability growth
	1.9395, 0.11, 0.29605, 2.2698, // w11-w14: lapse stability
	0.2315, 2.9898, // w15-w16: hard penalty, easy bonus
];

/// Bounds on individual coefficients as `(index, min, max)`, inclusive.
///
/// `w8..=w10`, `w13` and `w14` appear in exponents and overflow the update
/// arithmetic past these caps. `w15 <= 1 <= w16` keeps stability ordered
/// Hard <= Good <= Easy.
const WEIGHT_BOUNDS: [(usize, f64, f64); 7] = [
	(8, 0.0, 4.5),
	(9, 0.0, 0.8),
	(10, 0.0, 3.5),
	(13, 0.0, 0.9),
	(14, 0.0, 4.0),
	(15, 0.0, 1.0),
	(16, 1.0, f64::INFINITY),
];

/// Default target recall probability when a review comes due.
pub const DEFAULT_REQUESTED_RETENTION: f64 = 0.9;

/// Default cap on a scheduled interval, in days (100 years).
pub const DEFAULT_MAX_INTERVAL_DAYS: u32 = 36_500;

/// Validated scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterSetConfig")]
pub struct ParameterSet {
	weights: [f64; WEIGHT_COUNT],
	requested_retention: f64,
	max_interval_days: u32,
	enable_fuzzing: bool,
}

impl Default for ParameterSet {
	fn default() -> Self {
		Self {
			weights: FSRS5_DEFAULT_WEIGHTS,
			requested_retention: DEFAULT_REQUESTED_RETENTION,
			max_interval_days: DEFAULT_MAX_INTERVAL_DAYS,
			enable_fuzzing: true,
		}
	}
}

impl ParameterSet {
	/// Build a parameter set, validating every field.
	///
	/// # Errors
	///
	/// Returns [`SchedulerError::InvalidParameters`] if `weights` does not hold
	/// exactly 17 finite, non-negative values, if an exponent weight
	/// (`w8..=w10`, `w13`, `w14`) is above its cap, if the Hard penalty `w15`
	/// exceeds 1 or the Easy bonus `w16` is below 1, if `requested_retention`
	/// is not strictly between 0 and 1, or if `max_interval_days` is zero.
	///
	/// # Examples
	///
	/// ```
	/// use recall_core::params::{ParameterSet, FSRS5_DEFAULT_WEIGHTS};
	///
	/// let params = ParameterSet::new(&FSRS5_DEFAULT_WEIGHTS, 0.85, 365, false).unwrap();
	/// assert_eq!(params.max_interval_days(), 365);
	///
	/// assert!(ParameterSet::new(&FSRS5_DEFAULT_WEIGHTS, 1.0, 365, false).is_err());
	/// assert!(ParameterSet::new(&[1.0; 4], 0.9, 365, false).is_err());
	/// ```
	pub fn new(
		weights: &[f64],
		requested_retention: f64,
		max_interval_days: u32,
		enable_fuzzing: bool,
	) -> Result<Self> {
		let weights: [f64; WEIGHT_COUNT] = weights.try_into().map_err(|_| {
			SchedulerError::invalid_parameter(
				"weights",
				format!("expected {WEIGHT_COUNT} coefficients, got {}", weights.len()),
			)
		})?;

		if let Some((index, value)) = weights
			.iter()
			.enumerate()
			.find(|(_, w)| !w.is_finite() || **w < 0.0)
		{
			return Err(SchedulerError::invalid_parameter(
				"weights",
				format!("w{index} must be finite and non-negative, got {value}"),
			));
		}

		if let Some(&(index, min, max)) = WEIGHT_BOUNDS
			.iter()
			.find(|&&(index, min, max)| !(min..=max).contains(&weights[index]))
		{
			return Err(SchedulerError::invalid_parameter(
				"weights",
				format!("w{index} must lie in [{min}, {max}], got {}", weights[index]),
			));
		}

		Ok(Self {
			weights,
			requested_retention: validate_retention(requested_retention)?,
			max_interval_days: validate_max_interval(max_interval_days)?,
			enable_fuzzing,
		})
	}

	/// Copy with a different requested retention.
	///
	/// # Errors
	///
	/// Returns [`SchedulerError::InvalidParameters`] unless `0 < retention < 1`.
	pub fn with_requested_retention(mut self, requested_retention: f64) -> Result<Self> {
		self.requested_retention = validate_retention(requested_retention)?;
		Ok(self)
	}

	/// Copy with a different interval cap.
	///
	/// # Errors
	///
	/// Returns [`SchedulerError::InvalidParameters`] if `max_interval_days` is zero.
	pub fn with_max_interval_days(mut self, max_interval_days: u32) -> Result<Self> {
		self.max_interval_days = validate_max_interval(max_interval_days)?;
		Ok(self)
	}

	/// Copy with fuzzing switched on or off.
	#[must_use]
	pub fn with_fuzzing(mut self, enable_fuzzing: bool) -> Self {
		self.enable_fuzzing = enable_fuzzing;
		self
	}

	/// The full coefficient vector.
	#[must_use]
	pub const fn weights(&self) -> &[f64; WEIGHT_COUNT] {
		&self.weights
	}

	/// Target recall probability at the due date.
	#[must_use]
	pub const fn requested_retention(&self) -> f64 {
		self.requested_retention
	}

	/// Longest interval the scheduler will hand out.
	#[must_use]
	pub const fn max_interval_days(&self) -> u32 {
		self.max_interval_days
	}

	/// Whether scheduled intervals are jittered.
	#[must_use]
	pub const fn enable_fuzzing(&self) -> bool {
		self.enable_fuzzing
	}

	/// Initial stability for a card's first review (`w0..=w3`).
	#[must_use]
	pub const fn initial_stability(&self, grade: Grade) -> f64 {
		match grade {
			Grade::Again => self.weights[0],
			Grade::Hard => self.weights[1],
			Grade::Good => self.weights[2],
			Grade::Easy => self.weights[3],
		}
	}

	/// Recall probability on the forgetting curve these weights were fitted for.
	///
	/// The curve constants are fixed by the FSRS model family; see
	/// [`crate::retrievability`].
	#[must_use]
	pub fn retrievability(&self, elapsed_days: f64, stability: f64) -> f64 {
		crate::retrievability::retrievability(elapsed_days, stability)
	}

	/// Stability multiplier applied only for a given grade (`w15` / `w16`).
	#[must_use]
	pub const fn grade_modifier(&self, grade: Grade) -> f64 {
		match grade {
			Grade::Hard => self.weights[15],
			Grade::Easy => self.weights[16],
			Grade::Again | Grade::Good => 1.0,
		}
	}
}

fn validate_retention(requested_retention: f64) -> Result<f64> {
	if requested_retention > 0.0 && requested_retention < 1.0 {
		Ok(requested_retention)
	} else {
		Err(SchedulerError::invalid_parameter(
			"requested_retention",
			format!("must be strictly between 0 and 1, got {requested_retention}"),
		))
	}
}

fn validate_max_interval(max_interval_days: u32) -> Result<u32> {
	if max_interval_days >= 1 {
		Ok(max_interval_days)
	} else {
		Err(SchedulerError::invalid_parameter(
			"max_interval_days",
			"must be at least 1 day",
		))
	}
}

// ============================================================================
// Serialized form
// ============================================================================

/// Unvalidated, partially specified parameters as they appear in config files.
///
/// Missing fields take their defaults; conversion into [`ParameterSet`]
/// runs the full validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSetConfig {
	/// Model coefficients
	pub weights: Vec<f64>,
	/// Target recall probability
	pub requested_retention: f64,
	/// Interval cap in days
	pub max_interval_days: u32,
	/// Interval jitter
	pub enable_fuzzing: bool,
}

impl Default for ParameterSetConfig {
	fn default() -> Self {
		Self {
			weights: FSRS5_DEFAULT_WEIGHTS.to_vec(),
			requested_retention: DEFAULT_REQUESTED_RETENTION,
			max_interval_days: DEFAULT_MAX_INTERVAL_DAYS,
			enable_fuzzing: true,
		}
	}
}

impl TryFrom<ParameterSetConfig> for ParameterSet {
	type Error = SchedulerError;

	fn try_from(config: ParameterSetConfig) -> Result<Self> {
		Self::new(
			&config.weights,
			config.requested_retention,
			config.max_interval_days,
			config.enable_fuzzing,
		)
	}
}
