// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    assemble_quiz, Attraction, AttractionSummary, Destination, DestinationPick, DestinationSummary,
    QuizChoice, QuizItem, QuizOption, QuizQuestion, RankedDestination, RankedResult, Region,
    ResultSnapshot, ScoreColumns, StoredResult, Trait, TraitError, TraitVector, UserProfile,
};
pub use requests::{HistoryQuery, RecommendRequest, ResultQuery};
pub use responses::{ErrorResponse, HealthResponse, HistoryResponse, RecommendResponse};
