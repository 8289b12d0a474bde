use crate::models::{Attraction, Trait, UserProfile};
use std::cmp::Ordering;

/// Number of dominant traits considered when scoring attractions
pub const DOMINANT_TRAITS: usize = 3;

/// Attractions returned per destination when the caller does not say
pub const DEFAULT_ATTRACTION_LIMIT: usize = 3;

/// All traits ordered by descending profile weight
///
/// Equal weights keep the fixed priority order
/// (nature, cafe, adventure, culture, sea).
pub fn top_traits(profile: &UserProfile) -> Vec<Trait> {
    let mut traits = Trait::ALL.to_vec();
    // Stable sort, so ties stay in priority order
    traits.sort_by(|a, b| {
        profile
            .weight(*b)
            .partial_cmp(&profile.weight(*a))
            .unwrap_or(Ordering::Equal)
    });
    traits
}

/// Score an attraction against the profile's dominant traits
///
/// Each dominant trait named by one of the attraction's categories adds the
/// profile's weight for that trait, once. Other tags add nothing.
#[inline]
pub fn attraction_score(profile: &UserProfile, dominant: &[Trait], attraction: &Attraction) -> f64 {
    dominant
        .iter()
        .filter(|t| attraction.has_tag(**t))
        .map(|t| profile.weight(*t))
        .sum()
}

/// Pick up to `limit` attractions that best reflect the profile
///
/// Sorted by descending score with ascending id as the tie-break.
pub fn pick_attractions(
    profile: &UserProfile,
    attractions: &[Attraction],
    limit: usize,
) -> Vec<Attraction> {
    let ranked = top_traits(profile);
    let dominant = &ranked[..DOMINANT_TRAITS];

    let mut scored: Vec<(f64, &Attraction)> = attractions
        .iter()
        .map(|a| (attraction_score(profile, dominant, a), a))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(_, a)| a.clone())
        .collect()
}
