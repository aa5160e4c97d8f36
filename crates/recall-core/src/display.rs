//! Dashboard Retention
//!
//! A simplified exponential forgetting curve for charts and deck overviews:
//!
//! ```text
//! R_display(t, S) = e^(-t/S)
//! ```
//!
//! This is a display heuristic only. It is steeper than the power-law curve
//! in [`crate::retrievability`] and must never feed back into scheduling.
//! Elapsed time here is counted in whole days past the due date, which is
//! how the review dashboard buckets cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::{CardMemory, CardState};

/// Display retention below this marks a card urgent.
pub const URGENT_BELOW: f64 = 0.5;

/// Display retention below this marks a card as due soon.
pub const SOON_BELOW: f64 = 0.7;

// ============================================================================
// Retention curve
// ============================================================================

/// Approximate retention for display, in `[0, 1]`.
///
/// A never-reviewed card (`stability <= 0`) shows full retention.
///
/// # Examples
///
/// ```
/// use recall_core::display::display_retention;
///
/// assert_eq!(display_retention(0.0, 30.0), 1.0);
/// assert!((display_retention(10.0, 10.0) - (-1.0_f64).exp()).abs() < 1e-12);
/// ```
#[must_use]
pub fn display_retention(stability: f64, elapsed_days: f64) -> f64 {
	if stability <= 0.0 {
		return 1.0;
	}
	(-elapsed_days / stability).exp().clamp(0.0, 1.0)
}

/// Whole days a card is past its due date, floored at zero.
#[must_use]
pub fn days_overdue(card: &CardMemory, now: DateTime<Utc>) -> i64 {
	(now - card.due_at).num_days().max(0)
}

/// Display retention of a stored card at `now`.
#[must_use]
pub fn card_display_retention(card: &CardMemory, now: DateTime<Utc>) -> f64 {
	#[allow(clippy::cast_precision_loss)]
	let overdue = days_overdue(card, now) as f64;
	display_retention(card.stability, overdue)
}

// ============================================================================
// Bands and urgency
// ============================================================================

/// Coarse retention tier with a study suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetentionBand {
	/// Above 90%
	Strong,
	/// Above 70%
	Steady,
	/// Above 50%
	Fading,
	/// 50% or below
	Weak,
}

impl RetentionBand {
	/// Band for a retention value.
	#[must_use]
	pub fn from_retention(retention: f64) -> Self {
		if retention > 0.9 {
			Self::Strong
		} else if retention > 0.7 {
			Self::Steady
		} else if retention > 0.5 {
			Self::Fading
		} else {
			Self::Weak
		}
	}

	/// Suggestion shown next to the band.
	#[must_use]
	pub const fn suggestion(self) -> &'static str {
		match self {
			Self::Strong => "Memory is solid; the review interval can stretch",
			Self::Steady => "Memory is holding; review on schedule",
			Self::Fading => "Memory is fading; review soon",
			Self::Weak => "Memory has faded noticeably; review now",
		}
	}
}

/// How pressing a card's review is, for dashboard grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewUrgency {
	/// Never reviewed
	New,
	/// Display retention below 50%
	Urgent,
	/// Display retention below 70%
	Soon,
	/// Nothing pressing
	Ok,
}

/// Urgency of one card at `now`.
#[must_use]
pub fn urgency(card: &CardMemory, now: DateTime<Utc>) -> ReviewUrgency {
	if card.stability <= 0.0 {
		return ReviewUrgency::New;
	}
	let retention = card_display_retention(card, now);
	if retention < URGENT_BELOW {
		ReviewUrgency::Urgent
	} else if retention < SOON_BELOW {
		ReviewUrgency::Soon
	} else {
		ReviewUrgency::Ok
	}
}

// ============================================================================
// Deck summary
// ============================================================================

/// Per-urgency card counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyCounts {
	/// Never reviewed
	pub new: usize,
	/// Retention below 50%
	pub urgent: usize,
	/// Retention below 70%
	pub soon: usize,
	/// Everything else
	pub ok: usize,
}

/// Overview of a deck for the review dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckSummary {
	/// All cards
	pub total: usize,
	/// Cards in `New`
	pub new: usize,
	/// Cards in `Learning`
	pub learning: usize,
	/// Cards in `Review`
	pub review: usize,
	/// Cards in `Relearning`
	pub relearning: usize,
	/// Mean display retention over reviewed cards; `0.0` if none
	pub average_retention: f64,
	/// Urgency distribution
	pub urgency: UrgencyCounts,
}

/// Summarize a deck at `now`.
#[must_use]
pub fn summarize(cards: &[CardMemory], now: DateTime<Utc>) -> DeckSummary {
	let mut summary = DeckSummary {
		total: cards.len(),
		..DeckSummary::default()
	};
	let mut retention_sum = 0.0;
	let mut reviewed = 0_usize;

	for card in cards {
		match card.state {
			CardState::New => summary.new += 1,
			CardState::Learning => summary.learning += 1,
			CardState::Review => summary.review += 1,
			CardState::Relearning => summary.relearning += 1,
		}

		if card.stability > 0.0 {
			retention_sum += card_display_retention(card, now);
			reviewed += 1;
		}

		match urgency(card, now) {
			ReviewUrgency::New => summary.urgency.new += 1,
			ReviewUrgency::Urgent => summary.urgency.urgent += 1,
			ReviewUrgency::Soon => summary.urgency.soon += 1,
			ReviewUrgency::Ok => summary.urgency.ok += 1,
		}
	}

	if reviewed > 0 {
		#[allow(clippy::cast_precision_loss)]
		let count = reviewed as f64;
		summary.average_retention = retention_sum / count;
	}
	summary
}
