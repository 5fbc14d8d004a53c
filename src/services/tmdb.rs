use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::Config;
use crate::db::models::CreateMovie;
use crate::error::{AppError, AppResult};

/// External ids of movies imported from TMDB carry this prefix, which
/// exempts them from catalog pruning.
pub const EXTERNAL_ID_PREFIX: &str = "tmdb_";

const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/500x750?text=No+Poster";
const DEFAULT_DESCRIPTION: &str = "No description available";
const DEFAULT_GENRE: &str = "Drama";
const DEFAULT_DURATION_MINUTES: i64 = 120;
const SEARCH_RESULT_LIMIT: usize = 10;

lazy_static! {
    static ref GENRE_NAMES: HashMap<i64, &'static str> = {
        let mut names = HashMap::new();
        names.insert(28, "Action");
        names.insert(12, "Adventure");
        names.insert(16, "Animation");
        names.insert(35, "Comedy");
        names.insert(80, "Crime");
        names.insert(99, "Documentary");
        names.insert(18, "Drama");
        names.insert(10751, "Family");
        names.insert(14, "Fantasy");
        names.insert(36, "History");
        names.insert(27, "Horror");
        names.insert(10402, "Music");
        names.insert(9648, "Mystery");
        names.insert(10749, "Romance");
        names.insert(878, "Sci-Fi");
        names.insert(10770, "TV Movie");
        names.insert(53, "Thriller");
        names.insert(10752, "War");
        names.insert(37, "Western");
        names
    };
}

/// Maps a TMDB genre id list to a display genre. Only the first id counts;
/// anything unknown falls back to "Drama".
pub fn genre_from_ids(genre_ids: &[i64]) -> &'static str {
    genre_ids
        .first()
        .and_then(|id| GENRE_NAMES.get(id).copied())
        .unwrap_or(DEFAULT_GENRE)
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TmdbSearchResponse {
    pub results: Vec<TmdbSearchMovie>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbSearchMovie {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub genre_ids: Option<Vec<i64>>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    pub runtime: Option<i64>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

/// A TMDB movie normalized to the catalog's shape, ready for listing in
/// search results or for insertion via an import.
#[derive(Debug, Clone, Serialize)]
pub struct TmdbMovieSummary {
    pub tmdb_id: i64,
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub genre: String,
    pub duration: i64,
    pub poster: String,
    pub release_date: NaiveDate,
    pub rating: Option<f64>,
}

impl TmdbMovieSummary {
    pub fn into_create_movie(self) -> CreateMovie {
        CreateMovie {
            title: self.title,
            description: self.description,
            genre: self.genre,
            duration: self.duration,
            poster: self.poster,
            release_date: self.release_date,
            external_id: Some(self.external_id),
            rating: self.rating,
        }
    }
}

// ============================================================================
// Mapping
// ============================================================================

fn parse_release_date(raw: Option<&str>) -> NaiveDate {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive())
}

fn map_search_results(
    response: TmdbSearchResponse,
    image_base_url: &str,
) -> Vec<TmdbMovieSummary> {
    response
        .results
        .into_iter()
        .filter(|movie| movie.poster_path.is_some())
        .take(SEARCH_RESULT_LIMIT)
        .map(|movie| {
            let poster = movie
                .poster_path
                .map(|path| format!("{}{}", image_base_url, path))
                .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string());

            TmdbMovieSummary {
                tmdb_id: movie.id,
                external_id: format!("{}{}", EXTERNAL_ID_PREFIX, movie.id),
                title: movie.title,
                description: movie
                    .overview
                    .filter(|o| !o.is_empty())
                    .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
                genre: genre_from_ids(movie.genre_ids.as_deref().unwrap_or(&[])).to_string(),
                // Search results carry no runtime.
                duration: DEFAULT_DURATION_MINUTES,
                poster,
                release_date: parse_release_date(movie.release_date.as_deref()),
                rating: movie.vote_average,
            }
        })
        .collect()
}

fn map_movie_details(details: TmdbMovieDetails, image_base_url: &str) -> TmdbMovieSummary {
    // Details payloads carry genre names; the id table is only for search results.
    let genre = details
        .genres
        .first()
        .map(|g| g.name.clone())
        .unwrap_or_else(|| DEFAULT_GENRE.to_string());
    let poster = details
        .poster_path
        .map(|path| format!("{}{}", image_base_url, path))
        .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string());

    TmdbMovieSummary {
        tmdb_id: details.id,
        external_id: format!("{}{}", EXTERNAL_ID_PREFIX, details.id),
        title: details.title,
        description: details
            .overview
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        genre,
        duration: details.runtime.unwrap_or(DEFAULT_DURATION_MINUTES),
        poster,
        release_date: parse_release_date(details.release_date.as_deref()),
        rating: details.vote_average,
    }
}

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    image_base_url: String,
}

impl TmdbClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            client,
            api_key: config.tmdb.api_key.clone(),
            base_url: config.tmdb.base_url.clone(),
            image_base_url: config.tmdb.image_base_url.clone(),
        })
    }

    /// Search TMDB for movies matching the query. Failures (including a
    /// missing API key) degrade to an empty result list.
    pub async fn search_movies(&self, query: &str) -> Vec<TmdbMovieSummary> {
        match self.try_search_movies(query).await {
            Ok(movies) => movies,
            Err(e) => {
                tracing::warn!("TMDB search failed, returning no results: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_search_movies(&self, query: &str) -> AppResult<Vec<TmdbMovieSummary>> {
        let api_key = self.require_api_key()?;

        let response = self
            .send_with_backoff(|| {
                self.client
                    .get(format!("{}/search/movie", self.base_url))
                    .query(&[
                        ("api_key", api_key),
                        ("language", "en-US"),
                        ("query", query),
                        ("page", "1"),
                        ("include_adult", "false"),
                    ])
            })
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::TmdbApi(format!(
                "Failed to search movies: {}",
                error_text
            )));
        }

        let body = response
            .json::<TmdbSearchResponse>()
            .await
            .map_err(|e| AppError::TmdbApi(format!("Failed to parse search response: {}", e)))?;

        Ok(map_search_results(body, &self.image_base_url))
    }

    /// Fetch full details for one movie. Unlike search, errors propagate so
    /// an import can be reported as failed.
    pub async fn movie_details(&self, tmdb_id: i64) -> AppResult<TmdbMovieSummary> {
        let api_key = self.require_api_key()?;

        let response = self
            .send_with_backoff(|| {
                self.client
                    .get(format!("{}/movie/{}", self.base_url, tmdb_id))
                    .query(&[("api_key", api_key), ("language", "en-US")])
            })
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "TMDB movie {} not found",
                tmdb_id
            )));
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::TmdbApi(format!(
                "Failed to get movie details: {}",
                error_text
            )));
        }

        let details = response
            .json::<TmdbMovieDetails>()
            .await
            .map_err(|e| AppError::TmdbApi(format!("Failed to parse movie details: {}", e)))?;

        Ok(map_movie_details(details, &self.image_base_url))
    }

    fn require_api_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("TMDB_API_KEY is not set".to_string()))
    }

    // ========================================================================
    // Retry Helper
    // ========================================================================

    async fn send_with_backoff<F>(&self, make_request: F) -> AppResult<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        const MAX_RETRIES: usize = 5;
        let mut backoff_secs: u64 = 1;
        let max_backoff_secs: u64 = 60;

        for attempt in 0..MAX_RETRIES {
            match (make_request)().send().await {
                Ok(resp) => {
                    // Retry on 429 (rate limit) or server errors (5xx)
                    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
                        || resp.status().is_server_error()
                    {
                        // Respect Retry-After header if present
                        let mut wait_secs = backoff_secs;
                        if let Some(h) = resp.headers().get("retry-after") {
                            if let Ok(s) = h.to_str() {
                                if let Ok(parsed) = s.parse::<u64>() {
                                    wait_secs = parsed;
                                }
                            }
                        }

                        tracing::warn!(
                            "Transient TMDB error (status: {}). Retrying in {}s (attempt {}/{})",
                            resp.status(),
                            wait_secs,
                            attempt + 1,
                            MAX_RETRIES
                        );

                        if attempt + 1 >= MAX_RETRIES {
                            let err_text = resp.text().await.unwrap_or_default();
                            return Err(AppError::TmdbApi(format!(
                                "Failed after {} attempts: {}",
                                attempt + 1,
                                err_text
                            )));
                        }

                        tokio::time::sleep(std::time::Duration::from_secs(wait_secs)).await;
                        backoff_secs = std::cmp::min(backoff_secs * 2, max_backoff_secs);
                        continue;
                    }

                    // Return response even for non-200 (caller will decide how to handle 401/404/etc.)
                    return Ok(resp);
                }
                Err(e) => {
                    // Network-level error -> retryable
                    if attempt + 1 >= MAX_RETRIES {
                        return Err(e.into());
                    }
                    tracing::warn!(
                        "HTTP request failed: {}. Retrying in {}s (attempt {}/{})",
                        e,
                        backoff_secs,
                        attempt + 1,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = std::cmp::min(backoff_secs * 2, max_backoff_secs);
                    continue;
                }
            }
        }

        Err(AppError::TmdbApi(
            "Exceeded TMDB retry attempts".to_string(),
        ))
    }
}
