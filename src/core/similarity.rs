use crate::models::{TraitVector, UserProfile};

/// Calculate how well a destination fits a profile
///
/// Scoring formula:
/// score = Σ profile[t] * (destination[t] / Σ destination)
///
/// The destination's scores are L1 normalized first so destinations rated on
/// different scales compete on the shape of their trait mix rather than on
/// absolute magnitude. The profile is taken as given; with a profile from
/// [`aggregate_profile`](crate::core::aggregate_profile) the result lies in
/// [0, 1]. A destination whose scores are all zero always scores 0.
#[inline]
pub fn match_score(profile: &UserProfile, destination: &TraitVector) -> f64 {
    if destination.is_zero() {
        return 0.0;
    }

    profile.weights().dot(&destination.l1_normalized())
}
