// Unit tests for Travel Match

use travel_match::core::{
    aggregate_profile, match_destinations, match_score, pick_attractions, raw_totals, top_traits,
};
use travel_match::models::{Attraction, Destination, Trait, TraitVector, UserProfile};

const EPS: f64 = 1e-9;

fn tv(w: [f64; 5]) -> TraitVector {
    TraitVector::new(w).unwrap()
}

fn destination(id: i64, w: [f64; 5]) -> Destination {
    Destination {
        id,
        region_id: Some(1),
        name_th: format!("จังหวัด {}", id),
        name_en: format!("Province {}", id),
        scores: tv(w),
    }
}

fn attraction(id: i64, categories: &[&str]) -> Attraction {
    Attraction {
        id,
        destination_id: 1,
        name_th: format!("สถานที่ {}", id),
        name_en: format!("Place {}", id),
        description: None,
        categories: Some(categories.iter().map(|c| c.to_string()).collect()),
    }
}

fn assert_close(a: &UserProfile, b: &UserProfile) {
    for t in Trait::ALL {
        assert!((a.weight(t) - b.weight(t)).abs() < EPS, "{} differs: {} vs {}", t, a.weight(t), b.weight(t));
    }
}

#[test]
fn test_aggregate_example_scenario() {
    let options = [tv([3.0, 0.0, 1.0, 0.0, 0.0]), tv([2.0, 0.0, 0.0, 0.0, 1.0])];

    assert_eq!(raw_totals(&options).unwrap(), tv([5.0, 0.0, 1.0, 0.0, 1.0]));

    let profile = aggregate_profile(&options);
    assert!((profile.weight(Trait::Nature) - 0.714).abs() < 1e-3);
    assert!((profile.weight(Trait::Adventure) - 0.143).abs() < 1e-3);
    assert!((profile.weight(Trait::Sea) - 0.143).abs() < 1e-3);
    assert_eq!(profile.weight(Trait::Cafe), 0.0);
    assert_eq!(profile.weight(Trait::Culture), 0.0);
}

#[test]
fn test_aggregate_is_commutative() {
    let options = vec![
        tv([0.3, 1.7, 0.0, 2.2, 0.1]),
        tv([1.1, 0.0, 0.9, 0.0, 3.3]),
        tv([0.0, 0.4, 2.5, 0.6, 0.0]),
        tv([2.0, 2.0, 2.0, 2.0, 2.0]),
    ];

    let forward = aggregate_profile(&options);
    let mut reversed = options.clone();
    reversed.reverse();
    let mut rotated = options.clone();
    rotated.rotate_left(2);

    assert_close(&forward, &aggregate_profile(&reversed));
    assert_close(&forward, &aggregate_profile(&rotated));
}

#[test]
fn test_profile_sums_to_one() {
    let profile = aggregate_profile(&[tv([0.0, 0.0, 0.0, 0.0, 0.2]), tv([7.0, 1.0, 0.0, 0.0, 0.0])]);
    assert!((profile.weights().total() - 1.0).abs() < EPS);
}

#[test]
fn test_zero_safety() {
    let profile = aggregate_profile(&[]);
    assert_eq!(*profile.weights(), TraitVector::zero());
    assert!(match_destinations(&profile, &[], 3).is_empty());
    assert!(pick_attractions(&profile, &[], 3).is_empty());
}

#[test]
fn test_scores_are_bounded() {
    let profile = aggregate_profile(&[tv([1.0, 4.0, 0.0, 2.0, 3.0])]);
    for d in [
        tv([5.0, 5.0, 5.0, 5.0, 5.0]),
        tv([0.0, 5.0, 0.0, 0.0, 0.0]),
        tv([120.0, 3.0, 48.0, 0.0, 9.0]),
        TraitVector::zero(),
    ] {
        let score = match_score(&profile, &d);
        assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }
}

#[test]
fn test_monotonic_in_each_trait() {
    let destination = tv([2.0, 1.0, 3.0, 4.0, 5.0]);
    let base = tv([0.2, 0.2, 0.2, 0.2, 0.2]);

    for t in Trait::ALL {
        let raised = UserProfile::new(base.with(t, base[t] + 0.3).unwrap());
        assert!(match_score(&raised, &destination) >= match_score(&UserProfile::new(base), &destination));
    }
}

#[test]
fn test_equal_destinations_rank_by_id() {
    let profile = aggregate_profile(&[tv([1.0, 0.0, 0.0, 0.0, 0.0])]);
    let destinations = vec![destination(2, [5.0, 0.0, 0.0, 0.0, 0.0]), destination(1, [5.0, 0.0, 0.0, 0.0, 0.0])];

    let ids: Vec<i64> = match_destinations(&profile, &destinations, 3)
        .iter()
        .map(|r| r.destination.id)
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_attraction_example_scenario() {
    let profile = UserProfile::new(tv([0.5, 0.25, 0.15, 0.0, 0.1]));
    assert_eq!(&top_traits(&profile)[..3], &[Trait::Nature, Trait::Cafe, Trait::Adventure]);

    let picked = pick_attractions(
        &profile,
        &[attraction(1, &["culture"]), attraction(2, &["nature", "unknown"])],
        3,
    );
    let ids: Vec<i64> = picked.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn test_attraction_ties_break_by_id() {
    let profile = UserProfile::new(tv([0.5, 0.5, 0.0, 0.0, 0.0]));
    let all = vec![
        attraction(9, &["cafe"]),
        attraction(3, &["nature"]),
        attraction(5, &[]),
        attraction(1, &["sea"]),
    ];

    let ids: Vec<i64> = pick_attractions(&profile, &all, 4).iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 9, 1, 5]);
}
