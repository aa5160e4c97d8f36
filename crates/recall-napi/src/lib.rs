//! Node.js bindings for the recall-core memory scheduler.
//!
//! Timestamps cross the boundary as epoch milliseconds (`f64`) and card
//! states as their numeric codes, matching what the storage layer keeps.

// napi-rs requires owned types at the FFI boundary - can't use references
#![allow(clippy::needless_pass_by_value)]
// Epoch milliseconds round-trip through f64 losslessly for any realistic date
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use chrono::{DateTime, TimeZone, Utc};
use napi_derive::napi;

use recall_core::{
	CardMemory, CardState, DeckSummary, Grade, ParameterSet, ParameterSetConfig, ReviewOutcome,
	SchedulerError,
};

// ============================================================================
// Boundary types
// ============================================================================

/// A card's memory state as stored by the caller.
#[napi(object)]
#[derive(Clone)]
pub struct JsCardMemory {
	/// Days until recall probability falls to 90% (0 for a new card)
	pub stability: f64,
	/// Intrinsic difficulty in [1, 10] (0 for a new card)
	pub difficulty: f64,
	/// Next review, epoch ms
	pub due_at_ms: f64,
	/// Last review, epoch ms
	pub last_reviewed_at_ms: f64,
	/// 0 = New, 1 = Learning, 2 = Review, 3 = Relearning
	pub state: u32,
}

/// Scheduler configuration. Missing fields take their defaults.
#[napi(object)]
#[derive(Clone)]
pub struct JsParameterSet {
	/// 17 model coefficients (default: FSRS-5 published weights)
	pub weights: Option<Vec<f64>>,
	/// Target recall probability at the due date (default: 0.9)
	pub requested_retention: Option<f64>,
	/// Longest interval in days (default: 36500)
	pub max_interval_days: Option<u32>,
	/// Jitter intervals of 2.5 days or more (default: true)
	pub enable_fuzzing: Option<bool>,
}

/// Result of applying one grade.
#[napi(object)]
pub struct JsReviewOutcome {
	/// Grade applied (1-4)
	pub grade: u32,
	/// Updated card
	pub card: JsCardMemory,
	/// Days since the previous review
	pub elapsed_days: f64,
	/// Recall probability just before the review; absent for new cards
	pub retrievability: Option<f64>,
	/// Days until the next review
	pub interval_days: u32,
}

/// Urgency distribution in a deck summary.
#[napi(object)]
pub struct JsUrgencyCounts {
	pub new: u32,
	pub urgent: u32,
	pub soon: u32,
	pub ok: u32,
}

/// Deck overview for dashboards.
#[napi(object)]
pub struct JsDeckSummary {
	pub total: u32,
	pub new: u32,
	pub learning: u32,
	pub review: u32,
	pub relearning: u32,
	/// Mean display retention over reviewed cards
	pub average_retention: f64,
	pub urgency: JsUrgencyCounts,
}

// ============================================================================
// Conversions
// ============================================================================

fn to_napi_error(e: SchedulerError) -> napi::Error {
	napi::Error::from_reason(e.to_string())
}

fn timestamp_from_ms(ms: f64, field: &str) -> napi::Result<DateTime<Utc>> {
	if !ms.is_finite() {
		return Err(napi::Error::from_reason(format!(
			"Invalid {field}: {ms} is not a finite timestamp"
		)));
	}
	Utc.timestamp_millis_opt(ms as i64).single().ok_or_else(|| {
		napi::Error::from_reason(format!("Invalid {field}: {ms} is out of range"))
	})
}

fn timestamp_to_ms(ts: DateTime<Utc>) -> f64 {
	ts.timestamp_millis() as f64
}

fn card_from_js(card: &JsCardMemory) -> napi::Result<CardMemory> {
	let state = u8::try_from(card.state)
		.ok()
		.and_then(CardState::from_code)
		.ok_or_else(|| {
			napi::Error::from_reason(format!(
				"Invalid card state {}: expected 0 (New) to 3 (Relearning)",
				card.state
			))
		})?;

	let card = CardMemory {
		stability: card.stability,
		difficulty: card.difficulty,
		due_at: timestamp_from_ms(card.due_at_ms, "dueAtMs")?,
		last_reviewed_at: timestamp_from_ms(card.last_reviewed_at_ms, "lastReviewedAtMs")?,
		state,
	};
	card.validate().map_err(to_napi_error)?;
	Ok(card)
}

fn card_to_js(card: &CardMemory) -> JsCardMemory {
	JsCardMemory {
		stability: card.stability,
		difficulty: card.difficulty,
		due_at_ms: timestamp_to_ms(card.due_at),
		last_reviewed_at_ms: timestamp_to_ms(card.last_reviewed_at),
		state: u32::from(card.state.code()),
	}
}

fn params_from_js(params: Option<JsParameterSet>) -> napi::Result<ParameterSet> {
	let Some(params) = params else {
		return Ok(ParameterSet::default());
	};
	let defaults = ParameterSetConfig::default();
	let config = ParameterSetConfig {
		weights: params.weights.unwrap_or(defaults.weights),
		requested_retention: params
			.requested_retention
			.unwrap_or(defaults.requested_retention),
		max_interval_days: params.max_interval_days.unwrap_or(defaults.max_interval_days),
		enable_fuzzing: params.enable_fuzzing.unwrap_or(defaults.enable_fuzzing),
	};
	ParameterSet::try_from(config).map_err(to_napi_error)
}

fn params_to_js(params: &ParameterSet) -> JsParameterSet {
	JsParameterSet {
		weights: Some(params.weights().to_vec()),
		requested_retention: Some(params.requested_retention()),
		max_interval_days: Some(params.max_interval_days()),
		enable_fuzzing: Some(params.enable_fuzzing()),
	}
}

fn outcome_to_js(outcome: &ReviewOutcome) -> JsReviewOutcome {
	JsReviewOutcome {
		grade: u32::from(outcome.grade.value()),
		card: card_to_js(&outcome.card),
		elapsed_days: outcome.elapsed_days,
		retrievability: outcome.retrievability,
		interval_days: outcome.interval_days,
	}
}

fn summary_to_js(summary: &DeckSummary) -> JsDeckSummary {
	JsDeckSummary {
		total: summary.total as u32,
		new: summary.new as u32,
		learning: summary.learning as u32,
		review: summary.review as u32,
		relearning: summary.relearning as u32,
		average_retention: summary.average_retention,
		urgency: JsUrgencyCounts {
			new: summary.urgency.new as u32,
			urgent: summary.urgency.urgent as u32,
			soon: summary.urgency.soon as u32,
			ok: summary.urgency.ok as u32,
		},
	}
}

// ============================================================================
// Scheduling
// ============================================================================

/// Create a never-reviewed card, due at creation time.
#[napi]
pub fn new_card(created_at_ms: f64) -> napi::Result<JsCardMemory> {
	let created_at = timestamp_from_ms(created_at_ms, "createdAtMs")?;
	Ok(card_to_js(&CardMemory::new(created_at)))
}

/// Apply one review to a card.
///
/// # Arguments
///
/// * `card` - Current memory state
/// * `grade` - 1 (Again), 2 (Hard), 3 (Good) or 4 (Easy); anything else is rejected
/// * `now_ms` - Review time in milliseconds
/// * `params` - Optional scheduler configuration
/// * `card_key` - Optional stable card id mixed into the fuzz seed
#[napi]
pub fn update_card(
	card: JsCardMemory,
	grade: f64,
	now_ms: f64,
	params: Option<JsParameterSet>,
	card_key: Option<u32>,
) -> napi::Result<JsCardMemory> {
	let outcome = schedule_card(card, grade, now_ms, params, card_key)?;
	Ok(outcome.card)
}

/// Apply one review and return the full outcome, including the interval chosen.
#[napi]
pub fn schedule_card(
	card: JsCardMemory,
	grade: f64,
	now_ms: f64,
	params: Option<JsParameterSet>,
	card_key: Option<u32>,
) -> napi::Result<JsReviewOutcome> {
	let grade = Grade::try_from(grade).map_err(to_napi_error)?;
	let card = card_from_js(&card)?;
	let now = timestamp_from_ms(now_ms, "nowMs")?;
	let params = params_from_js(params)?;
	let key = u64::from(card_key.unwrap_or(0));
	Ok(outcome_to_js(&recall_core::schedule_keyed(
		&card, grade, now, &params, key,
	)))
}

/// Outcomes for all four grades, ordered Again, Hard, Good, Easy.
#[napi]
pub fn preview_card(
	card: JsCardMemory,
	now_ms: f64,
	params: Option<JsParameterSet>,
) -> napi::Result<Vec<JsReviewOutcome>> {
	let card = card_from_js(&card)?;
	let now = timestamp_from_ms(now_ms, "nowMs")?;
	let params = params_from_js(params)?;
	Ok(recall_core::preview(&card, now, &params)
		.iter()
		.map(outcome_to_js)
		.collect())
}

// ============================================================================
// Retrievability and intervals
// ============================================================================

/// Probability of recall after `elapsed_days` at the given stability.
///
/// R(t, S) = (1 + 19/81 · t/S)^(-0.5)
#[napi]
pub fn retrievability(elapsed_days: f64, stability: f64) -> napi::Result<f64> {
	recall_core::checked_retrievability(elapsed_days, stability).map_err(to_napi_error)
}

/// Probability of recall for a stored card at `now_ms` (1.0 for new cards).
#[napi]
pub fn card_retrievability(card: JsCardMemory, now_ms: f64) -> napi::Result<f64> {
	let card = card_from_js(&card)?;
	let now = timestamp_from_ms(now_ms, "nowMs")?;
	Ok(recall_core::retrievability_at(&card, now))
}

/// Unfuzzed interval in days for a stability.
#[napi]
pub fn next_interval(stability: f64, params: Option<JsParameterSet>) -> napi::Result<u32> {
	let stability = recall_core::validate_stability(stability).map_err(to_napi_error)?;
	let params = params_from_js(params)?;
	Ok(recall_core::next_interval(stability, &params))
}

// ============================================================================
// Due selection
// ============================================================================

/// Cards due at `now_ms`, most overdue first.
#[napi]
pub fn select_due(cards: Vec<JsCardMemory>, now_ms: f64) -> napi::Result<Vec<JsCardMemory>> {
	let now = timestamp_from_ms(now_ms, "nowMs")?;
	let cards = cards
		.iter()
		.map(card_from_js)
		.collect::<napi::Result<Vec<_>>>()?;
	Ok(recall_core::select_due(&cards, now)
		.iter()
		.map(card_to_js)
		.collect())
}

/// Number of cards due at `now_ms`.
#[napi]
pub fn count_due(cards: Vec<JsCardMemory>, now_ms: f64) -> napi::Result<u32> {
	let now = timestamp_from_ms(now_ms, "nowMs")?;
	let cards = cards
		.iter()
		.map(card_from_js)
		.collect::<napi::Result<Vec<_>>>()?;
	Ok(recall_core::count_due(&cards, now) as u32)
}

// ============================================================================
// Dashboard
// ============================================================================

/// Display-only exponential retention e^(-t/S). Never use it for scheduling.
///
/// A stability of 0 marks a never-reviewed card and shows full retention.
#[napi]
pub fn display_retention(stability: f64, elapsed_days: f64) -> napi::Result<f64> {
	if stability == 0.0 {
		return Ok(1.0);
	}
	let stability = recall_core::validate_stability(stability).map_err(to_napi_error)?;
	Ok(recall_core::display_retention(stability, elapsed_days))
}

/// State counts, average retention and urgency distribution for a deck.
#[napi]
pub fn summarize_deck(cards: Vec<JsCardMemory>, now_ms: f64) -> napi::Result<JsDeckSummary> {
	let now = timestamp_from_ms(now_ms, "nowMs")?;
	let cards = cards
		.iter()
		.map(card_from_js)
		.collect::<napi::Result<Vec<_>>>()?;
	Ok(summary_to_js(&recall_core::summarize(&cards, now)))
}

// ============================================================================
// Parameters
// ============================================================================

/// The default FSRS-5 weights.
#[napi]
pub fn default_weights() -> Vec<f64> {
	recall_core::FSRS5_DEFAULT_WEIGHTS.to_vec()
}

/// Parse and validate a JSON parameter file, returning every field filled in.
#[napi]
pub fn load_parameters(json: String) -> napi::Result<JsParameterSet> {
	let params: ParameterSet = serde_json::from_str(&json)
		.map_err(|e| napi::Error::from_reason(format!("Invalid parameter file: {e}")))?;
	Ok(params_to_js(&params))
}

/// Library version.
#[napi]
pub fn version() -> String {
	recall_core::VERSION.to_string()
}
