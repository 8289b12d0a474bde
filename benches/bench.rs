// Criterion benchmarks for Travel Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use travel_match::core::{aggregate_profile, pick_attractions, Matcher};
use travel_match::models::{Attraction, Destination, Trait, TraitVector, UserProfile};

fn weights(seed: usize) -> TraitVector {
    TraitVector::new([
        (seed % 6) as f64,
        ((seed / 2) % 6) as f64,
        ((seed / 3) % 6) as f64,
        ((seed / 5) % 6) as f64,
        ((seed / 7) % 6) as f64,
    ])
    .unwrap()
}

fn create_destination(id: usize) -> Destination {
    Destination {
        id: id as i64,
        region_id: Some((id % 6) as i64),
        name_th: format!("จังหวัด {}", id),
        name_en: format!("Province {}", id),
        scores: weights(id),
    }
}

fn create_attraction(id: usize, destination_id: usize) -> Attraction {
    let tags = [Trait::ALL[id % 5].as_str(), Trait::ALL[(id / 5) % 5].as_str(), "viewpoint"];
    Attraction {
        id: id as i64,
        destination_id: destination_id as i64,
        name_th: format!("สถานที่ {}", id),
        name_en: format!("Place {}", id),
        description: None,
        categories: Some(tags.iter().map(|t| t.to_string()).collect()),
    }
}

fn create_profile() -> UserProfile {
    let options: Vec<TraitVector> = (0..12).map(weights).collect();
    aggregate_profile(&options)
}

fn bench_aggregate_profile(c: &mut Criterion) {
    let options: Vec<TraitVector> = (0..12).map(weights).collect();

    c.bench_function("aggregate_profile_12_options", |b| {
        b.iter(|| aggregate_profile(black_box(&options)));
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::default();
    let profile = create_profile();

    let mut group = c.benchmark_group("matching");

    // 77 is the real province count; the rest stress the sort
    for destination_count in [77, 500, 5000].iter() {
        let destinations: Vec<Destination> = (0..*destination_count).map(create_destination).collect();

        group.bench_with_input(
            BenchmarkId::new("match_destinations", destination_count),
            destination_count,
            |b, _| {
                b.iter(|| matcher.match_destinations(black_box(&profile), black_box(&destinations), black_box(3)));
            },
        );
    }

    group.finish();
}

fn bench_pick_attractions(c: &mut Criterion) {
    let profile = create_profile();
    let attractions: Vec<Attraction> = (0..200).map(|i| create_attraction(i, 1)).collect();

    c.bench_function("pick_attractions_200", |b| {
        b.iter(|| pick_attractions(black_box(&profile), black_box(&attractions), black_box(3)));
    });
}

fn bench_recommend(c: &mut Criterion) {
    let matcher = Matcher::default();
    let profile = create_profile();
    let destinations: Vec<Destination> = (0..77).map(create_destination).collect();
    let attractions: Vec<Attraction> = (0..770).map(|i| create_attraction(i, i % 77)).collect();

    c.bench_function("recommend_77_destinations", |b| {
        b.iter(|| {
            matcher.recommend(
                black_box(&profile),
                black_box(&destinations),
                black_box(&attractions),
                3,
                3,
            )
        });
    });
}

criterion_group!(
    benches,
    bench_aggregate_profile,
    bench_matching,
    bench_pick_attractions,
    bench_recommend
);

criterion_main!(benches);
