//! Benchmarks for the memory scheduler
//!
//! Tests performance of:
//! - Retrievability (power-law forgetting curve)
//! - Single-card update, with and without fuzzing
//! - Four-grade preview
//! - Due-set selection over growing decks

#![allow(clippy::expect_used)] // Fine in benchmarks

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use recall_core::{
	preview, retrievability, select_due, update, CardMemory, CardState, Grade, ParameterSet,
};

fn epoch() -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
		.single()
		.expect("valid timestamp")
}

/// Generate a deck of reviewed cards with due dates spread over a year
fn generate_deck(count: usize) -> Vec<CardMemory> {
	let mut rng = rand::thread_rng();
	(0..count)
		.map(|_| {
			let last = epoch() + Duration::hours(rng.gen_range(0..24 * 365));
			CardMemory {
				stability: rng.gen_range(0.5..400.0),
				difficulty: rng.gen_range(1.0..10.0),
				due_at: last + Duration::days(rng.gen_range(1..120)),
				last_reviewed_at: last,
				state: CardState::Review,
			}
		})
		.collect()
}

fn bench_retrievability(c: &mut Criterion) {
	let mut group = c.benchmark_group("retrievability");

	for count in &[100_u64, 1000, 10_000] {
		let mut rng = rand::thread_rng();
		#[allow(clippy::cast_possible_truncation)]
		let samples: Vec<(f64, f64)> = (0..*count as usize)
			.map(|_| (rng.gen_range(0.0..365.0), rng.gen_range(0.1..1000.0)))
			.collect();

		let _ = group.throughput(Throughput::Elements(*count));
		let _ = group.bench_with_input(BenchmarkId::new("cards", count), count, |bench, _| {
			bench.iter(|| {
				samples
					.iter()
					.map(|&(t, s)| retrievability(black_box(t), black_box(s)))
					.sum::<f64>()
			});
		});
	}

	group.finish();
}

fn bench_update(c: &mut Criterion) {
	let mut group = c.benchmark_group("update");
	let card = generate_deck(1).pop().expect("should have card");
	let now = card.due_at + Duration::hours(3);

	for (label, params) in [
		("plain", ParameterSet::default().with_fuzzing(false)),
		("fuzzed", ParameterSet::default()),
	] {
		for grade in Grade::ALL {
			let _ = group.bench_with_input(
				BenchmarkId::new(label, format!("{grade:?}")),
				&grade,
				|bench, &grade| {
					bench.iter(|| update(black_box(&card), grade, black_box(now), &params));
				},
			);
		}
	}

	group.finish();
}

fn bench_preview(c: &mut Criterion) {
	let params = ParameterSet::default();
	let card = generate_deck(1).pop().expect("should have card");
	let now = card.due_at;

	let _ = c.bench_function("preview", |bench| {
		bench.iter(|| preview(black_box(&card), black_box(now), &params));
	});
}

fn bench_select_due(c: &mut Criterion) {
	let mut group = c.benchmark_group("select_due");
	let now = epoch() + Duration::days(200);

	for count in &[100_usize, 1000, 10_000, 50_000] {
		let deck = generate_deck(*count);

		let _ = group.throughput(Throughput::Elements(*count as u64));
		let _ = group.bench_with_input(BenchmarkId::new("cards", count), count, |bench, _| {
			bench.iter(|| select_due(black_box(&deck), black_box(now)));
		});
	}

	group.finish();
}

criterion_group!(
	benches,
	bench_retrievability,
	bench_update,
	bench_preview,
	bench_select_due,
);
criterion_main!(benches);
