//! Review Session Example
//!
//! This example walks one card through a month of study:
//! 1. Create a new card
//! 2. Review it whenever it comes due, with a scripted sequence of grades
//! 3. Print how stability, difficulty and the next interval respond
//!
//! Run with: `RUST_LOG=recall_core=trace cargo run --example review_session`

use chrono::{Duration, TimeZone, Utc};
use recall_core::{
	preview, retrievability_at, schedule, select_due, summarize, CardMemory, Grade, ParameterSet,
};
use tracing_subscriber::EnvFilter;

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	println!("=== Review Session ===\n");

	let params = ParameterSet::default();
	let Some(created) = Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).single() else {
		return;
	};

	// The learner gets it right, slips once, then finds it easy
	let grades = [
		Grade::Good,
		Grade::Good,
		Grade::Again,
		Grade::Hard,
		Grade::Good,
		Grade::Easy,
	];

	let mut card = CardMemory::new(created);
	for (n, grade) in grades.into_iter().enumerate() {
		// Study a few hours after the card comes due
		let now = card.due_at + Duration::hours(3);
		let recall = retrievability_at(&card, now);
		let outcome = schedule(&card, grade, now, &params);

		println!("Review #{} at {} - graded {grade:?}", n + 1, now.format("%Y-%m-%d %H:%M"));
		println!("  Recall probability before review: {:.1}%", recall * 100.0);
		println!("  State: {:?} -> {:?}", card.state, outcome.card.state);
		println!("  Stability: {:.2} days", outcome.card.stability);
		println!("  Difficulty: {:.2}", outcome.card.difficulty);
		println!("  Next review in {} day(s)", outcome.interval_days);
		println!();

		card = outcome.card;
	}

	// What would each answer do next time?
	println!("=== Next review options ===\n");
	let options = preview(&card, card.due_at, &params);
	for outcome in options.iter() {
		println!(
			"  {:?}: +{} days (stability {:.1})",
			outcome.grade, outcome.interval_days, outcome.card.stability
		);
	}
	println!();

	// A small deck: this card plus two untouched ones
	let deck = vec![card.clone(), CardMemory::new(created), CardMemory::new(created)];
	let check_at = card.due_at + Duration::days(2);
	let due = select_due(&deck, check_at);
	let summary = summarize(&deck, check_at);

	println!("=== Deck on {} ===\n", check_at.format("%Y-%m-%d"));
	println!("  Due now: {} of {}", due.len(), summary.total);
	println!(
		"  New / Learning / Review / Relearning: {} / {} / {} / {}",
		summary.new, summary.learning, summary.review, summary.relearning
	);
	println!("  Average retention: {:.1}%", summary.average_retention * 100.0);
	println!(
		"  Urgent: {}, soon: {}, ok: {}",
		summary.urgency.urgent, summary.urgency.soon, summary.urgency.ok
	);
}
