use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when trait data is malformed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraitError {
    #[error("Invalid weight for trait {trait_name}: {value} (must be finite and non-negative)")]
    InvalidWeight { trait_name: Trait, value: f64 },

    #[error("Unknown trait: {0}")]
    UnknownTrait(String),
}

/// The five preference dimensions a quiz answer can express.
///
/// Declaration order doubles as the tie-break priority wherever two traits
/// carry the same weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trait {
    Nature,
    Cafe,
    Adventure,
    Culture,
    Sea,
}

impl Trait {
    pub const COUNT: usize = 5;

    /// All traits in priority order
    pub const ALL: [Trait; Trait::COUNT] = [
        Trait::Nature,
        Trait::Cafe,
        Trait::Adventure,
        Trait::Culture,
        Trait::Sea,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Trait::Nature => "nature",
            Trait::Cafe => "cafe",
            Trait::Adventure => "adventure",
            Trait::Culture => "culture",
            Trait::Sea => "sea",
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            Trait::Nature => 0,
            Trait::Cafe => 1,
            Trait::Adventure => 2,
            Trait::Culture => 3,
            Trait::Sea => 4,
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trait {
    type Err = TraitError;

    /// Parse a trait name, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Trait::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| TraitError::UnknownTrait(s.to_string()))
    }
}

/// A complete weight assignment over the five traits.
///
/// Every component is finite and non-negative. The only ways to build one
/// are the validating constructors and serde, so the invariant holds for
/// every value in circulation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "TraitMap", into = "TraitMap")]
pub struct TraitVector([f64; Trait::COUNT]);

impl TraitVector {
    pub fn zero() -> Self {
        Self([0.0; Trait::COUNT])
    }

    /// Build a vector from weights given in [`Trait::ALL`] order
    pub fn new(weights: [f64; Trait::COUNT]) -> Result<Self, TraitError> {
        for (t, value) in Trait::ALL.into_iter().zip(weights) {
            validate_weight(t, value)?;
        }
        Ok(Self(weights))
    }

    /// Return a copy with one trait replaced
    pub fn with(mut self, t: Trait, value: f64) -> Result<Self, TraitError> {
        validate_weight(t, value)?;
        self.0[t.index()] = value;
        Ok(self)
    }

    #[inline]
    pub fn get(&self, t: Trait) -> f64 {
        self.0[t.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Trait, f64)> + '_ {
        Trait::ALL.into_iter().map(move |t| (t, self.get(t)))
    }

    /// Sum of all five weights. Overflows to infinity for weights near `f64::MAX`.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Largest of the five weights
    pub fn max_weight(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|w| *w == 0.0)
    }

    /// Divide every weight by the vector's total so the components sum to 1.
    /// A zero vector is returned unchanged.
    ///
    /// Weights are first scaled into [0, 1] by the largest one, so the sum
    /// stays finite for any valid vector.
    pub fn l1_normalized(&self) -> Self {
        let max = self.max_weight();
        if max == 0.0 {
            return *self;
        }

        let scaled = self.0.map(|w| w / max);
        let total: f64 = scaled.iter().sum();
        Self(scaled.map(|w| w / total))
    }

    /// L1-normalized sum of several vectors
    ///
    /// Equivalent to summing and then calling [`l1_normalized`](Self::l1_normalized),
    /// but every input is scaled by the largest weight across all of them
    /// before summing, so huge weights cannot overflow the totals.
    pub fn normalized_sum(vectors: &[TraitVector]) -> Self {
        let max = vectors.iter().map(TraitVector::max_weight).fold(0.0, f64::max);
        if max == 0.0 {
            return Self::zero();
        }

        let mut totals = [0.0; Trait::COUNT];
        for v in vectors {
            for (slot, w) in totals.iter_mut().zip(v.0) {
                *slot += w / max;
            }
        }

        Self(totals).l1_normalized()
    }

    /// Component-wise sum, rejecting a total that overflows
    pub fn checked_add(&self, other: &TraitVector) -> Result<Self, TraitError> {
        let mut out = self.0;
        for ((t, slot), w) in Trait::ALL.into_iter().zip(out.iter_mut()).zip(other.0) {
            *slot += w;
            validate_weight(t, *slot)?;
        }
        Ok(Self(out))
    }

    /// Dot product with another vector
    pub fn dot(&self, other: &TraitVector) -> f64 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }
}

impl Index<Trait> for TraitVector {
    type Output = f64;

    fn index(&self, t: Trait) -> &f64 {
        &self.0[t.index()]
    }
}

#[inline]
fn validate_weight(t: Trait, value: f64) -> Result<(), TraitError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TraitError::InvalidWeight { trait_name: t, value })
    }
}

/// JSON shape of a [`TraitVector`]: one key per trait, missing or null keys read as 0
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraitMap {
    #[serde(default)]
    nature: Option<f64>,
    #[serde(default)]
    cafe: Option<f64>,
    #[serde(default)]
    adventure: Option<f64>,
    #[serde(default)]
    culture: Option<f64>,
    #[serde(default)]
    sea: Option<f64>,
}

impl TryFrom<TraitMap> for TraitVector {
    type Error = TraitError;

    fn try_from(map: TraitMap) -> Result<Self, Self::Error> {
        TraitVector::new([
            map.nature.unwrap_or(0.0),
            map.cafe.unwrap_or(0.0),
            map.adventure.unwrap_or(0.0),
            map.culture.unwrap_or(0.0),
            map.sea.unwrap_or(0.0),
        ])
    }
}

impl From<TraitVector> for TraitMap {
    fn from(v: TraitVector) -> Self {
        Self {
            nature: Some(v[Trait::Nature]),
            cafe: Some(v[Trait::Cafe]),
            adventure: Some(v[Trait::Adventure]),
            culture: Some(v[Trait::Culture]),
            sea: Some(v[Trait::Sea]),
        }
    }
}

/// `*_score` columns as stored in the catalog tables
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreColumns {
    #[serde(default)]
    pub nature_score: Option<f64>,
    #[serde(default)]
    pub cafe_score: Option<f64>,
    #[serde(default)]
    pub adventure_score: Option<f64>,
    #[serde(default)]
    pub culture_score: Option<f64>,
    #[serde(default)]
    pub sea_score: Option<f64>,
}

impl TryFrom<ScoreColumns> for TraitVector {
    type Error = TraitError;

    fn try_from(c: ScoreColumns) -> Result<Self, Self::Error> {
        TraitVector::new([
            c.nature_score.unwrap_or(0.0),
            c.cafe_score.unwrap_or(0.0),
            c.adventure_score.unwrap_or(0.0),
            c.culture_score.unwrap_or(0.0),
            c.sea_score.unwrap_or(0.0),
        ])
    }
}

impl From<TraitVector> for ScoreColumns {
    fn from(v: TraitVector) -> Self {
        Self {
            nature_score: Some(v[Trait::Nature]),
            cafe_score: Some(v[Trait::Cafe]),
            adventure_score: Some(v[Trait::Adventure]),
            culture_score: Some(v[Trait::Culture]),
            sea_score: Some(v[Trait::Sea]),
        }
    }
}

/// Aggregated quiz preferences for a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(TraitVector);

impl UserProfile {
    pub fn new(weights: TraitVector) -> Self {
        Self(weights)
    }

    pub fn weights(&self) -> &TraitVector {
        &self.0
    }

    #[inline]
    pub fn weight(&self, t: Trait) -> f64 {
        self.0.get(t)
    }
}

/// Geographic region used to scope the destination catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: i64,
    #[serde(default)]
    pub name_th: String,
    #[serde(default)]
    pub name_en: String,
}

/// A single answer option of the quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuizOptionRecord", into = "QuizOptionRecord")]
pub struct QuizOption {
    pub id: i64,
    pub question_id: Option<i64>,
    pub option_label: Option<String>,
    pub option_th: Option<String>,
    pub option_en: Option<String>,
    pub scores: TraitVector,
}

/// Catalog row shape of a [`QuizOption`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOptionRecord {
    id: i64,
    #[serde(default)]
    question_id: Option<i64>,
    #[serde(default)]
    option_label: Option<String>,
    #[serde(default)]
    option_th: Option<String>,
    #[serde(default)]
    option_en: Option<String>,
    #[serde(flatten)]
    scores: ScoreColumns,
}

impl TryFrom<QuizOptionRecord> for QuizOption {
    type Error = TraitError;

    fn try_from(r: QuizOptionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            question_id: r.question_id,
            option_label: r.option_label,
            option_th: r.option_th,
            option_en: r.option_en,
            scores: TraitVector::try_from(r.scores)?,
        })
    }
}

impl From<QuizOption> for QuizOptionRecord {
    fn from(o: QuizOption) -> Self {
        Self {
            id: o.id,
            question_id: o.question_id,
            option_label: o.option_label,
            option_th: o.option_th,
            option_en: o.option_en,
            scores: o.scores.into(),
        }
    }
}

/// A quiz question as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    #[serde(default)]
    pub question_no: i32,
    #[serde(default)]
    pub question_th: String,
    #[serde(default)]
    pub question_en: String,
}

/// An answer option as shown to the quiz taker; trait scores stay server side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizChoice {
    pub id: i64,
    pub question_id: Option<i64>,
    pub option_label: Option<String>,
    pub option_th: Option<String>,
    pub option_en: Option<String>,
}

impl From<&QuizOption> for QuizChoice {
    fn from(o: &QuizOption) -> Self {
        Self {
            id: o.id,
            question_id: o.question_id,
            option_label: o.option_label.clone(),
            option_th: o.option_th.clone(),
            option_en: o.option_en.clone(),
        }
    }
}

/// A question together with its answer options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizItem {
    #[serde(flatten)]
    pub question: QuizQuestion,
    pub options: Vec<QuizChoice>,
}

/// Nest options under their questions
///
/// Questions are ordered by `question_no`, options by `option_label`, both
/// falling back to id. Options of unknown questions are dropped.
pub fn assemble_quiz(mut questions: Vec<QuizQuestion>, options: &[QuizOption]) -> Vec<QuizItem> {
    questions.sort_by(|a, b| a.question_no.cmp(&b.question_no).then_with(|| a.id.cmp(&b.id)));

    let mut sorted: Vec<&QuizOption> = options.iter().collect();
    sorted.sort_by(|a, b| a.option_label.cmp(&b.option_label).then_with(|| a.id.cmp(&b.id)));

    questions
        .into_iter()
        .map(|question| {
            let options = sorted
                .iter()
                .filter(|o| o.question_id == Some(question.id))
                .map(|o| QuizChoice::from(*o))
                .collect();
            QuizItem { question, options }
        })
        .collect()
}

/// Candidate destination (a province in the catalog)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DestinationRecord", into = "DestinationRecord")]
pub struct Destination {
    pub id: i64,
    pub region_id: Option<i64>,
    pub name_th: String,
    pub name_en: String,
    pub scores: TraitVector,
}

/// Catalog row shape of a [`Destination`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationRecord {
    id: i64,
    #[serde(default)]
    region_id: Option<i64>,
    #[serde(default)]
    name_th: String,
    #[serde(default)]
    name_en: String,
    #[serde(flatten)]
    scores: ScoreColumns,
}

impl TryFrom<DestinationRecord> for Destination {
    type Error = TraitError;

    fn try_from(r: DestinationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            region_id: r.region_id,
            name_th: r.name_th,
            name_en: r.name_en,
            scores: TraitVector::try_from(r.scores)?,
        })
    }
}

impl From<Destination> for DestinationRecord {
    fn from(d: Destination) -> Self {
        Self {
            id: d.id,
            region_id: d.region_id,
            name_th: d.name_th,
            name_en: d.name_en,
            scores: d.scores.into(),
        }
    }
}

/// Point of interest belonging to a destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub id: i64,
    #[serde(alias = "province_id")]
    pub destination_id: i64,
    #[serde(default)]
    pub name_th: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl Attraction {
    /// Category tags, empty when the record has none
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().flatten().map(String::as_str)
    }

    /// Whether any category tag names the given trait
    pub fn has_tag(&self, t: Trait) -> bool {
        self.tags().any(|tag| tag.trim().eq_ignore_ascii_case(t.as_str()))
    }
}

/// A destination together with its match score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDestination {
    pub destination: Destination,
    #[serde(rename = "matchScore")]
    pub score: f64,
}

/// One entry of a recommendation: destination, score and picked attractions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationPick {
    pub destination: Destination,
    #[serde(rename = "matchScore")]
    pub score: f64,
    pub attractions: Vec<Attraction>,
}

/// Ordered output of the matcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub picks: Vec<DestinationPick>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Destination entry of a stored snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationSummary {
    pub id: i64,
    pub name_th: String,
    pub name_en: String,
}

/// Attraction entry of a stored snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractionSummary {
    pub id: i64,
    pub name_th: String,
    pub name_en: String,
    pub description: Option<String>,
}

/// Denormalized copy of a ranked result, shaped for storage and rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    pub recommended_destinations: Vec<DestinationSummary>,
    pub recommended_attractions: Vec<AttractionSummary>,
}

impl From<&RankedResult> for ResultSnapshot {
    fn from(result: &RankedResult) -> Self {
        let recommended_destinations = result
            .picks
            .iter()
            .map(|p| DestinationSummary {
                id: p.destination.id,
                name_th: p.destination.name_th.clone(),
                name_en: p.destination.name_en.clone(),
            })
            .collect();

        let recommended_attractions = result
            .picks
            .iter()
            .flat_map(|p| p.attractions.iter())
            .map(|a| AttractionSummary {
                id: a.id,
                name_th: a.name_th.clone(),
                name_en: a.name_en.clone(),
                description: a.description.clone(),
            })
            .collect();

        Self {
            recommended_destinations,
            recommended_attractions,
        }
    }
}

/// Persisted recommendation for one quiz attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    #[serde(rename = "attemptId")]
    pub attempt_id: uuid::Uuid,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "regionId")]
    pub region_id: Option<i64>,
    pub profile: UserProfile,
    #[serde(flatten)]
    pub snapshot: ResultSnapshot,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
