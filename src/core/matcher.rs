use crate::core::{
    attractions::{pick_attractions, DEFAULT_ATTRACTION_LIMIT},
    similarity::match_score,
};
use crate::models::{Attraction, Destination, DestinationPick, RankedDestination, RankedResult, UserProfile};
use std::cmp::Ordering;

/// Destinations returned when the caller does not say
pub const DEFAULT_DESTINATION_LIMIT: usize = 3;

/// Rule deciding which ranked destinations make it into the result
///
/// A matcher is built with exactly one window and applies it to every call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionWindow {
    /// First K destinations after ranking
    #[default]
    TopK,
    /// Destinations scoring at least `fraction` of the best score, then at most K
    NearBest { fraction: f64 },
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Similarity scoring of every candidate destination
/// 2. Ranking (score descending, id ascending)
/// 3. Selection window
/// 4. Attraction picking per selected destination
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    window: SelectionWindow,
}

impl Matcher {
    pub fn new(window: SelectionWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> SelectionWindow {
        self.window
    }

    /// Rank destinations against a profile and keep the configured window
    ///
    /// # Arguments
    /// * `profile` - The user's aggregated profile
    /// * `destinations` - Candidate destinations from the catalog
    /// * `k` - Maximum number of destinations to return
    pub fn match_destinations(
        &self,
        profile: &UserProfile,
        destinations: &[Destination],
        k: usize,
    ) -> Vec<RankedDestination> {
        let mut ranked: Vec<RankedDestination> = destinations
            .iter()
            .map(|d| RankedDestination {
                score: match_score(profile, &d.scores),
                destination: d.clone(),
            })
            .collect();

        // Sort by score (descending) and then by id (ascending)
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.destination.id.cmp(&b.destination.id))
        });

        if let SelectionWindow::NearBest { fraction } = self.window {
            let best = ranked.first().map(|r| r.score).unwrap_or(0.0);
            let cutoff = best * fraction;
            ranked.retain(|r| r.score >= cutoff);
        }

        ranked.truncate(k);
        ranked
    }

    /// Produce the full recommendation: ranked destinations with their picked attractions
    ///
    /// `attractions` may hold attractions of any destination; each selected
    /// destination only sees its own.
    pub fn recommend(
        &self,
        profile: &UserProfile,
        destinations: &[Destination],
        attractions: &[Attraction],
        k: usize,
        attraction_limit: usize,
    ) -> RankedResult {
        let ranked = self.match_destinations(profile, destinations, k);
        attach_attractions(profile, ranked, attractions, attraction_limit, destinations.len())
    }
}

/// Pick attractions for destinations that were already ranked and windowed
///
/// Keeps the ranked order; `total_candidates` is the size of the pool the
/// ranking was taken from.
pub fn attach_attractions(
    profile: &UserProfile,
    ranked: Vec<RankedDestination>,
    attractions: &[Attraction],
    attraction_limit: usize,
    total_candidates: usize,
) -> RankedResult {
    let picks = ranked
        .into_iter()
        .map(|ranked| {
            let own: Vec<Attraction> = attractions
                .iter()
                .filter(|a| a.destination_id == ranked.destination.id)
                .cloned()
                .collect();

            DestinationPick {
                attractions: pick_attractions(profile, &own, attraction_limit),
                destination: ranked.destination,
                score: ranked.score,
            }
        })
        .collect();

    RankedResult {
        picks,
        total_candidates,
    }
}

/// Rank destinations with the default top-K window
pub fn match_destinations(
    profile: &UserProfile,
    destinations: &[Destination],
    k: usize,
) -> Vec<RankedDestination> {
    Matcher::default().match_destinations(profile, destinations, k)
}

/// [`Matcher::recommend`] with the default window and limits
pub fn recommend(
    profile: &UserProfile,
    destinations: &[Destination],
    attractions: &[Attraction],
) -> RankedResult {
    Matcher::default().recommend(
        profile,
        destinations,
        attractions,
        DEFAULT_DESTINATION_LIMIT,
        DEFAULT_ATTRACTION_LIMIT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TraitVector;

    fn destination(id: i64, w: [f64; 5]) -> Destination {
        Destination {
            id,
            region_id: None,
            name_th: format!("จังหวัด {}", id),
            name_en: format!("Province {}", id),
            scores: TraitVector::new(w).unwrap(),
        }
    }

    fn attraction(id: i64, destination_id: i64, categories: &[&str]) -> Attraction {
        Attraction {
            id,
            destination_id,
            name_th: String::new(),
            name_en: format!("Attraction {}", id),
            description: Some("desc".to_string()),
            categories: Some(categories.iter().map(|c| c.to_string()).collect()),
        }
    }

    fn nature_lover() -> UserProfile {
        UserProfile::new(TraitVector::new([0.7, 0.1, 0.1, 0.05, 0.05]).unwrap())
    }

    #[test]
    fn test_ranks_by_score() {
        let destinations = vec![
            destination(1, [0.0, 5.0, 0.0, 0.0, 0.0]),
            destination(2, [5.0, 0.0, 0.0, 0.0, 0.0]),
            destination(3, [2.0, 2.0, 0.0, 0.0, 0.0]),
        ];

        let ranked = match_destinations(&nature_lover(), &destinations, 3);
        let ids: Vec<i64> = ranked.iter().map(|r| r.destination.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_ties_break_by_id() {
        let destinations = vec![
            destination(2, [5.0, 0.0, 0.0, 0.0, 0.0]),
            destination(1, [5.0, 0.0, 0.0, 0.0, 0.0]),
        ];

        let ranked = match_destinations(&nature_lover(), &destinations, 3);
        let ids: Vec<i64> = ranked.iter().map(|r| r.destination.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_respects_limit() {
        let destinations: Vec<Destination> = (0..20)
            .map(|i| destination(i, [(i % 5) as f64, 1.0, 1.0, 1.0, 1.0]))
            .collect();

        assert_eq!(match_destinations(&nature_lover(), &destinations, 5).len(), 5);
        assert!(match_destinations(&nature_lover(), &destinations, 0).is_empty());
        assert!(match_destinations(&nature_lover(), &[], 3).is_empty());
    }

    #[test]
    fn test_near_best_window() {
        let matcher = Matcher::new(SelectionWindow::NearBest { fraction: 0.85 });
        let destinations = vec![
            destination(1, [5.0, 0.0, 0.0, 0.0, 0.0]), // 0.7
            destination(2, [9.0, 1.0, 0.0, 0.0, 0.0]), // 0.64
            destination(3, [0.0, 0.0, 0.0, 0.0, 5.0]), // 0.05
        ];

        let ids: Vec<i64> = matcher
            .match_destinations(&nature_lover(), &destinations, 3)
            .iter()
            .map(|r| r.destination.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);

        // K still caps the window
        assert_eq!(matcher.match_destinations(&nature_lover(), &destinations, 1).len(), 1);
    }

    #[test]
    fn test_near_best_with_zero_profile_keeps_all() {
        let matcher = Matcher::new(SelectionWindow::NearBest { fraction: 0.85 });
        let destinations = vec![
            destination(1, [5.0, 0.0, 0.0, 0.0, 0.0]),
            destination(2, [0.0, 0.0, 0.0, 0.0, 0.0]),
        ];

        let ranked = matcher.match_destinations(&UserProfile::default(), &destinations, 3);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_recommend_picks_own_attractions() {
        let destinations = vec![
            destination(1, [5.0, 0.0, 0.0, 0.0, 0.0]),
            destination(2, [0.0, 0.0, 0.0, 0.0, 5.0]),
        ];
        let attractions = vec![
            attraction(10, 1, &["nature"]),
            attraction(11, 1, &["cafe"]),
            attraction(20, 2, &["nature"]),
        ];

        let result = recommend(&nature_lover(), &destinations, &attractions);

        assert_eq!(result.total_candidates, 2);
        assert_eq!(result.picks.len(), 2);
        assert_eq!(result.picks[0].destination.id, 1);
        let first: Vec<i64> = result.picks[0].attractions.iter().map(|a| a.id).collect();
        assert_eq!(first, vec![10, 11]);
        let second: Vec<i64> = result.picks[1].attractions.iter().map(|a| a.id).collect();
        assert_eq!(second, vec![20]);
    }

    #[test]
    fn test_attach_attractions_keeps_ranked_order() {
        let ranked = vec![
            RankedDestination { destination: destination(2, [0.0, 0.0, 0.0, 0.0, 5.0]), score: 0.05 },
            RankedDestination { destination: destination(1, [5.0, 0.0, 0.0, 0.0, 0.0]), score: 0.7 },
        ];
        let attractions = vec![attraction(10, 1, &["nature"]), attraction(20, 2, &["sea"])];

        let result = attach_attractions(&nature_lover(), ranked, &attractions, 3, 77);

        let ids: Vec<i64> = result.picks.iter().map(|p| p.destination.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(result.picks[0].score, 0.05);
        assert_eq!(result.picks[1].attractions[0].id, 10);
        assert_eq!(result.total_candidates, 77);
    }
}
