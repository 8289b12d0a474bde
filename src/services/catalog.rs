use crate::config::TableSettings;
use crate::models::{Attraction, Destination, QuizOption, QuizQuestion, Region};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with the catalog API
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Table names in the catalog
#[derive(Debug, Clone)]
pub struct CatalogTables {
    pub regions: String,
    pub quiz_questions: String,
    pub quiz_options: String,
    pub destinations: String,
    pub attractions: String,
}

impl From<&TableSettings> for CatalogTables {
    fn from(t: &TableSettings) -> Self {
        Self {
            regions: t.regions.clone(),
            quiz_questions: t.quiz_questions.clone(),
            quiz_options: t.quiz_options.clone(),
            destinations: t.destinations.clone(),
            attractions: t.attractions.clone(),
        }
    }
}

impl Default for CatalogTables {
    fn default() -> Self {
        Self::from(&TableSettings::default())
    }
}

/// Catalog REST client (PostgREST dialect, as exposed by Supabase)
///
/// Handles all reads from the external data store:
/// - Regions for scoping the destination list
/// - Quiz questions and their answer options
/// - Quiz options selected in an attempt
/// - Destinations, optionally filtered by region
/// - Attractions of the selected destinations
pub struct CatalogClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: CatalogTables,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(base_url: String, api_key: String, tables: CatalogTables) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    /// Fetch all regions
    pub async fn get_regions(&self) -> Result<Vec<Region>, CatalogError> {
        self.fetch_rows(&self.tables.regions, &[("order", "id".to_string())]).await
    }

    /// Fetch all quiz questions in display order
    pub async fn get_questions(&self) -> Result<Vec<QuizQuestion>, CatalogError> {
        self.fetch_rows(&self.tables.quiz_questions, &[("order", "question_no".to_string())])
            .await
    }

    /// Fetch the answer options of the given questions, ordered by label
    pub async fn get_options_for_questions(&self, question_ids: &[i64]) -> Result<Vec<QuizOption>, CatalogError> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }

        self.fetch_rows(
            &self.tables.quiz_options,
            &[
                ("question_id", in_filter(question_ids)),
                ("order", "option_label".to_string()),
            ],
        )
        .await
    }

    /// Fetch the quiz options with the given ids
    pub async fn get_options(&self, ids: &[i64]) -> Result<Vec<QuizOption>, CatalogError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.fetch_rows(&self.tables.quiz_options, &[("id", in_filter(ids))]).await
    }

    /// Fetch candidate destinations, scoped to a region when one is given
    pub async fn get_destinations(&self, region_id: Option<i64>) -> Result<Vec<Destination>, CatalogError> {
        match region_id {
            Some(region_id) => {
                self.fetch_rows(&self.tables.destinations, &[("region_id", format!("eq.{}", region_id))])
                    .await
            }
            None => self.fetch_rows(&self.tables.destinations, &[]).await,
        }
    }

    /// Fetch the attractions belonging to any of the given destinations
    pub async fn get_attractions(&self, destination_ids: &[i64]) -> Result<Vec<Attraction>, CatalogError> {
        if destination_ids.is_empty() {
            return Ok(vec![]);
        }

        self.fetch_rows(&self.tables.attractions, &[("province_id", in_filter(destination_ids))])
            .await
    }

    /// Read every row of a table matching the filters
    ///
    /// A row that does not parse fails the whole call; partial catalogs would
    /// silently skew the ranking.
    async fn fetch_rows<T>(&self, table: &str, filters: &[(&str, String)]) -> Result<Vec<T>, CatalogError>
    where
        T: DeserializeOwned,
    {
        let url = self.table_url(table, filters);

        tracing::debug!("Fetching catalog rows from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Catalog request for {} failed: {} - {}", table, status, body);
            return Err(CatalogError::ApiError(format!(
                "Failed to fetch {}: {}",
                table, status
            )));
        }

        let json: Value = response.json().await?;

        let rows = json
            .as_array()
            .ok_or_else(|| CatalogError::InvalidResponse(format!("Expected an array of {} rows", table)))?;

        let parsed = rows
            .iter()
            .map(|row| {
                serde_json::from_value(row.clone()).map_err(|e| {
                    let id = row.get("id").cloned().unwrap_or(Value::Null);
                    CatalogError::InvalidResponse(format!("Malformed {} row (id {}): {}", table, id, e))
                })
            })
            .collect::<Result<Vec<T>, _>>()?;

        tracing::debug!("Fetched {} rows from {}", parsed.len(), table);

        Ok(parsed)
    }

    fn table_url(&self, table: &str, filters: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}/rest/v1/{}?select=*",
            self.base_url.trim_end_matches('/'),
            table
        );

        for (column, condition) in filters {
            url.push('&');
            url.push_str(column);
            url.push('=');
            url.push_str(&urlencoding::encode(condition));
        }

        url
    }
}

/// PostgREST `in` filter for a list of ids, e.g. `in.(1,2,3)`
fn in_filter(ids: &[i64]) -> String {
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}
