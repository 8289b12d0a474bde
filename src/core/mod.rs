// Core algorithm exports
pub mod attractions;
pub mod matcher;
pub mod profile;
pub mod similarity;

pub use attractions::{pick_attractions, top_traits, DEFAULT_ATTRACTION_LIMIT};
pub use matcher::{attach_attractions, match_destinations, recommend, Matcher, SelectionWindow, DEFAULT_DESTINATION_LIMIT};
pub use profile::{aggregate_profile, raw_totals};
pub use similarity::match_score;
