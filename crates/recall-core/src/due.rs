//! Due-set selection: which cards to review now, most overdue first.

use chrono::{DateTime, Utc};

use crate::card::CardMemory;

/// Cards due at `now` (`due_at <= now`), sorted by ascending due date.
///
/// Cards sharing a due date keep their input order.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use recall_core::card::CardMemory;
/// use recall_core::due::select_due;
///
/// let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
/// let cards = vec![
///     CardMemory::new(now - Duration::days(1)),
///     CardMemory::new(now + Duration::days(1)),
///     CardMemory::new(now - Duration::days(3)),
/// ];
///
/// let due = select_due(&cards, now);
/// assert_eq!(due.len(), 2);
/// assert_eq!(due[0].due_at, now - Duration::days(3));
/// ```
#[must_use]
pub fn select_due(cards: &[CardMemory], now: DateTime<Utc>) -> Vec<CardMemory> {
	let mut due: Vec<CardMemory> = cards.iter().filter(|c| c.is_due(now)).cloned().collect();
	due.sort_by_key(|c| c.due_at);
	due
}

/// Number of cards due at `now`.
#[must_use]
pub fn count_due(cards: &[CardMemory], now: DateTime<Utc>) -> usize {
	cards.iter().filter(|c| c.is_due(now)).count()
}

/// Earliest due date among cards not yet due, if any.
#[must_use]
pub fn next_due_at(cards: &[CardMemory], now: DateTime<Utc>) -> Option<DateTime<Utc>> {
	cards
		.iter()
		.filter(|c| !c.is_due(now))
		.map(|c| c.due_at)
		.min()
}
