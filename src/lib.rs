//! Travel Match - quiz-driven destination matching service
//!
//! This library provides the core recommendation algorithm used by the travel
//! quiz: folding answer scores into a trait profile, ranking destinations by
//! similarity to that profile, and picking attractions that fit it.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{aggregate_profile, match_destinations, pick_attractions, Matcher, SelectionWindow};
pub use crate::models::{Attraction, Destination, RankedDestination, RankedResult, Trait, TraitVector, UserProfile};
