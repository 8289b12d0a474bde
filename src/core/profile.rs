use crate::models::{TraitError, TraitVector, UserProfile};

/// Sum the selected option vectors trait by trait, without normalizing
///
/// Fails when a total overflows `f64`.
pub fn raw_totals(options: &[TraitVector]) -> Result<TraitVector, TraitError> {
    options
        .iter()
        .try_fold(TraitVector::zero(), |acc, option| acc.checked_add(option))
}

/// Fold the score vectors of the selected quiz options into a user profile
///
/// The totals are L1 normalized so the five weights sum to 1. When the total
/// is zero (no options, or only all-zero options) the zero profile is
/// returned instead of dividing. Options are rescaled before summing, so
/// any valid input yields a finite profile.
///
/// Summation is commutative, but reordering the input may change the last
/// bits of the result; compare profiles with a tolerance.
pub fn aggregate_profile(options: &[TraitVector]) -> UserProfile {
    UserProfile::new(TraitVector::normalized_sum(options))
}
