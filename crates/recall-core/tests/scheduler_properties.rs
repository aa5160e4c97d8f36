//! Property tests for the memory update engine.
//!
//! Arbitrary review histories must never push a card out of its valid
//! state space, and the grade ordering must hold for every prior state.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use recall_core::{
	retrievability, schedule, update, update_raw, CardMemory, CardState, Grade, ParameterSet,
	MIN_STABILITY,
};

fn epoch() -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

fn grade_strategy() -> impl Strategy<Value = Grade> {
	prop::sample::select(Grade::ALL.to_vec())
}

fn reviewed_card_strategy() -> impl Strategy<Value = CardMemory> {
	(
		0.1_f64..5000.0,
		1.0_f64..=10.0,
		prop::sample::select(vec![CardState::Learning, CardState::Review, CardState::Relearning]),
	)
		.prop_map(|(stability, difficulty, state)| CardMemory {
			stability,
			difficulty,
			due_at: epoch() + Duration::days(1),
			last_reviewed_at: epoch(),
			state,
		})
}

fn params_strategy() -> impl Strategy<Value = ParameterSet> {
	(0.7_f64..0.99, 1_u32..=36_500, any::<bool>()).prop_map(|(retention, cap, fuzz)| {
		ParameterSet::default()
			.with_requested_retention(retention)
			.unwrap()
			.with_max_interval_days(cap)
			.unwrap()
			.with_fuzzing(fuzz)
	})
}

proptest! {
	#[test]
	fn histories_stay_in_bounds(
		params in params_strategy(),
		reviews in prop::collection::vec((grade_strategy(), -2.0_f64..400.0), 1..40),
	) {
		let mut card = CardMemory::new(epoch());
		let mut now = epoch();

		for (grade, gap_days) in reviews {
			#[allow(clippy::cast_possible_truncation)]
			let gap = Duration::minutes((gap_days * 1440.0) as i64);
			now += gap;
			let next = update(&card, grade, now, &params);

			prop_assert!(next.stability >= MIN_STABILITY);
			prop_assert!(next.stability.is_finite());
			prop_assert!((1.0..=10.0).contains(&next.difficulty));
			prop_assert!(next.due_at >= next.last_reviewed_at);
			prop_assert!(next.due_at - next.last_reviewed_at >= Duration::days(1));
			prop_assert!(
				next.due_at - next.last_reviewed_at
					<= Duration::days(i64::from(params.max_interval_days()))
			);
			prop_assert_eq!(next.last_reviewed_at, now);
			prop_assert_eq!(next.state, card.state.next(grade));
			card = next;
		}
	}

	#[test]
	fn higher_grades_never_lower_stability(
		card in reviewed_card_strategy(),
		elapsed_hours in 0_i64..(24 * 3000),
	) {
		let params = ParameterSet::default().with_fuzzing(false);
		let now = card.last_reviewed_at + Duration::hours(elapsed_hours);

		let stabilities: Vec<f64> = Grade::ALL
			.iter()
			.map(|&g| update(&card, g, now, &params).stability)
			.collect();
		for pair in stabilities.windows(2) {
			prop_assert!(pair[0] <= pair[1], "{:?}", stabilities);
		}
	}

	#[test]
	fn updates_are_deterministic(
		card in reviewed_card_strategy(),
		grade in grade_strategy(),
		elapsed_hours in 0_i64..(24 * 800),
		params in params_strategy(),
	) {
		let now = card.last_reviewed_at + Duration::hours(elapsed_hours);
		prop_assert_eq!(update(&card, grade, now, &params), update(&card, grade, now, &params));
	}

	#[test]
	fn invalid_raw_grades_are_rejected(
		card in reviewed_card_strategy(),
		raw in prop_oneof![
			-1000.0_f64..0.999,
			4.001_f64..1000.0,
			(1_i32..4).prop_map(|g| f64::from(g) + 0.5),
		],
	) {
		let before = card.clone();
		let result = update_raw(&card, raw, epoch() + Duration::days(3), &ParameterSet::default());
		prop_assert!(result.unwrap_err().is_invalid_grade());
		prop_assert_eq!(card, before);
	}

	#[test]
	fn retrievability_decreases_with_time(
		stability in 0.1_f64..10_000.0,
		t in 0.0_f64..10_000.0,
		dt in 0.01_f64..1000.0,
	) {
		let now = retrievability(t, stability);
		let later = retrievability(t + dt, stability);
		prop_assert!(later < now);
		prop_assert!((0.0..=1.0).contains(&later));
		prop_assert_eq!(retrievability(0.0, stability), 1.0);
	}

	#[test]
	fn lapses_land_in_relearning(
		card in reviewed_card_strategy(),
		elapsed_days in 0_i64..365,
	) {
		let params = ParameterSet::default();
		let outcome = schedule(&card, Grade::Again, card.last_reviewed_at + Duration::days(elapsed_days), &params);
		prop_assert!(outcome.card.stability <= card.stability);
		let expected = if card.state == CardState::Learning {
			CardState::Learning
		} else {
			CardState::Relearning
		};
		prop_assert_eq!(outcome.card.state, expected);
	}
}
