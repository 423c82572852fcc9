//! TMDB API Client
//!
//! Thin client over The Movie Database v3 API.
//!
//! ## API Endpoints
//!
//! - **Search**: `{base}/search/movie?query={query}&language={locale}`
//! - **Details**: `{base}/movie/{id}?language={locale}`
//!
//! Every call takes its locale explicitly; the client holds no "current
//! language" state.
//!
//! ## Authentication
//!
//! A v3 API key travels as the `api_key` query parameter. A v4 read access
//! token (a JWT, starting with `eyJ`) is sent as a bearer token instead.
//! Request URLs are only ever logged with the key redacted.
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::providers::tmdb::TmdbClient;
//!
//! let client = TmdbClient::new(http_client, &config.metadata_api_config);
//! let results = client.search_movies("Zootopia", "en-US").await?;
//! if let Some(first) = results.first() {
//!     let details = client.movie_details(first.id, "es-ES").await?;
//! }
//! ```

use crate::error::{MetadataError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::time::{Clock, SystemClock};
use core_runtime::config::MetadataApiConfig;
use core_runtime::logging::redact_url_credentials;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

const PROVIDER_NAME: &str = "TMDB";

/// Fallback when a 429 response carries no usable `Retry-After` header
const DEFAULT_RETRY_AFTER_SECS: u64 = 10;

/// Keep error bodies short in logs and error messages
const MAX_ERROR_BODY_CHARS: usize = 200;

/// One hit from `/search/movie`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovieSearchResult {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Response of `/movie/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl MovieDetails {
    /// Name of the first listed genre, if any is non-empty.
    pub fn primary_genre(&self) -> Option<&str> {
        self.genres
            .first()
            .map(|genre| genre.name.trim())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<MovieSearchResult>,
}

/// Enforces a minimum delay between consecutive requests
struct RateLimiter {
    clock: Arc<dyn Clock>,
    last_request_ms: Option<i64>,
    min_delay: Duration,
}

impl RateLimiter {
    fn new(delay_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_request_ms: None,
            min_delay: Duration::from_millis(delay_ms),
        }
    }

    fn pending_wait(&self) -> Option<Duration> {
        let last = self.last_request_ms?;
        let elapsed_ms = self.clock.unix_timestamp_millis() - last;
        let required_ms = self.min_delay.as_millis() as i64;
        (elapsed_ms < required_ms).then(|| Duration::from_millis((required_ms - elapsed_ms) as u64))
    }

    async fn wait_if_needed(&mut self) {
        if let Some(wait_time) = self.pending_wait() {
            debug!("Rate limiting: waiting {:?}", wait_time);
            sleep(wait_time).await;
        }
        self.last_request_ms = Some(self.clock.unix_timestamp_millis());
    }
}

/// TMDB API client
pub struct TmdbClient {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    use_bearer_token: bool,
    api_base_url: String,
    request_timeout: Duration,
    retry_policy: RetryPolicy,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl TmdbClient {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &MetadataApiConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::with_clock(http_client, config, clock)
    }

    pub fn with_clock(
        http_client: Arc<dyn HttpClient>,
        config: &MetadataApiConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http_client,
            api_key: config.api_key.clone(),
            use_bearer_token: config.uses_bearer_token(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
            retry_policy: RetryPolicy::with_max_attempts(config.max_attempts),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(
                config.rate_limit_delay_ms,
                clock,
            ))),
        }
    }

    /// Search movies by title. Results keep TMDB's relevance order.
    pub async fn search_movies(&self, query: &str, locale: &str) -> Result<Vec<MovieSearchResult>> {
        let response: SearchResponse = self
            .get_json(
                "/search/movie",
                &[("query", query), ("language", locale), ("page", "1")],
            )
            .await?;

        debug!(
            query = query,
            locale = locale,
            results = response.results.len(),
            "TMDB search finished"
        );
        Ok(response.results)
    }

    /// Fetch details for one movie in the given locale.
    pub async fn movie_details(&self, id: u64, locale: &str) -> Result<MovieDetails> {
        self.get_json(&format!("/movie/{}", id), &[("language", locale)])
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = self.build_url(path, params);
        debug!("Requesting TMDB: {}", redact_url_credentials(&url));

        self.rate_limiter.lock().await.wait_if_needed().await;

        let mut request = HttpRequest::new(HttpMethod::Get, url)
            .header("Accept", "application/json")
            .timeout(self.request_timeout);
        if self.use_bearer_token {
            request = request.bearer_token(&self.api_key);
        }

        let response = self
            .http_client
            .execute_with_retry(request, self.retry_policy.clone())
            .await
            .map_err(|e| MetadataError::NetworkError(format!("TMDB request failed: {}", e)))?;

        Self::check_status(&response)?;

        response.json().map_err(|e| {
            MetadataError::JsonParse(format!("Failed to parse TMDB response for {}: {}", path, e))
        })
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut query: Vec<String> = Vec::with_capacity(params.len() + 1);
        if !self.use_bearer_token {
            query.push(format!("api_key={}", urlencoding::encode(&self.api_key)));
        }
        query.extend(
            params
                .iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value))),
        );

        format!("{}{}?{}", self.api_base_url, path, query.join("&"))
    }

    fn check_status(response: &HttpResponse) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }

        let body: String = String::from_utf8_lossy(&response.body)
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect();

        match response.status {
            401 => Err(MetadataError::Unauthorized(body)),
            429 => {
                let retry_after = response
                    .headers
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case("retry-after"))
                    .and_then(|(_, value)| value.trim().parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                warn!("TMDB rate limit hit, retry after {}s", retry_after);

                Err(MetadataError::RateLimited {
                    provider: PROVIDER_NAME.to_string(),
                    retry_after_seconds: retry_after,
                })
            }
            status => Err(MetadataError::HttpError { status, body }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bytes::Bytes;
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
            async fn execute_with_retry(&self, request: HttpRequest, policy: RetryPolicy) -> BridgeResult<HttpResponse>;
        }
    }

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_millis_opt(self.0).unwrap()
        }
    }

    fn config() -> MetadataApiConfig {
        MetadataApiConfig::new("secret-key")
            .with_api_base_url("https://tmdb.test/3/")
            .with_rate_limit_delay_ms(0)
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_build_url_with_api_key() {
        let client = TmdbClient::new(Arc::new(MockHttpClient::new()), &config());
        let url = client.build_url("/search/movie", &[("query", "Toy Story & Co"), ("language", "en-US")]);
        assert_eq!(
            url,
            "https://tmdb.test/3/search/movie?api_key=secret-key&query=Toy%20Story%20%26%20Co&language=en-US"
        );
    }

    #[test]
    fn test_build_url_with_bearer_token() {
        let config = MetadataApiConfig::new("eyJhbGciOiJIUzI1NiJ9.token")
            .with_api_base_url("https://tmdb.test/3");
        let client = TmdbClient::new(Arc::new(MockHttpClient::new()), &config);
        let url = client.build_url("/movie/1", &[("language", "es-ES")]);
        assert_eq!(url, "https://tmdb.test/3/movie/1?language=es-ES");
    }

    #[tokio::test]
    async fn test_search_movies_parses_results() {
        let mut http = MockHttpClient::new();
        http.expect_execute_with_retry()
            .withf(|request, policy| {
                request.url.contains("/search/movie?")
                    && request.url.contains("query=Zootopia")
                    && request.url.contains("language=en-US")
                    && policy.max_attempts == 1
            })
            .times(1)
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{"page":1,"results":[{"id":269149,"title":"Zootopia","release_date":"2016-02-11","poster_path":"/a.jpg"},{"id":2,"title":"Other"}]}"#,
                ))
            });

        let client = TmdbClient::new(Arc::new(http), &config());
        let results = client.search_movies("Zootopia", "en-US").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 269149);
        assert_eq!(results[0].poster_path.as_deref(), Some("/a.jpg"));
        assert_eq!(results[1].release_date, None);
    }

    #[tokio::test]
    async fn test_movie_details_sends_bearer_token() {
        let mut http = MockHttpClient::new();
        http.expect_execute_with_retry()
            .withf(|request, _| {
                request.url.ends_with("/movie/269149?language=es-ES")
                    && request
                        .headers
                        .get("Authorization")
                        .map(|v| v.starts_with("Bearer eyJ"))
                        .unwrap_or(false)
            })
            .times(1)
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{"id":269149,"title":"Zootrópolis","genres":[{"id":16,"name":"Animación"}]}"#,
                ))
            });

        let config = MetadataApiConfig::new("eyJtoken").with_rate_limit_delay_ms(0);
        let client = TmdbClient::new(Arc::new(http), &config);
        let details = client.movie_details(269149, "es-ES").await.unwrap();

        assert_eq!(details.title.as_deref(), Some("Zootrópolis"));
        assert_eq!(details.primary_genre(), Some("Animación"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let mut http = MockHttpClient::new();
        let mut responses = vec![
            response(500, "boom"),
            {
                let mut limited = response(429, "");
                limited.headers.insert("Retry-After".to_string(), "3".to_string());
                limited
            },
            response(401, "{\"status_message\":\"Invalid API key\"}"),
        ];
        http.expect_execute_with_retry()
            .times(3)
            .returning(move |_, _| Ok(responses.pop().unwrap()));

        let client = TmdbClient::new(Arc::new(http), &config());

        assert!(matches!(
            client.movie_details(1, "en-US").await,
            Err(MetadataError::Unauthorized(_))
        ));
        assert!(matches!(
            client.movie_details(1, "en-US").await,
            Err(MetadataError::RateLimited { retry_after_seconds: 3, .. })
        ));
        assert!(matches!(
            client.movie_details(1, "en-US").await,
            Err(MetadataError::HttpError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_and_parse_failures() {
        let mut http = MockHttpClient::new();
        http.expect_execute_with_retry()
            .times(1)
            .returning(|_, _| Err(bridge_traits::error::BridgeError::Timeout("slow".into())));
        let client = TmdbClient::new(Arc::new(http), &config());
        assert!(matches!(
            client.search_movies("Up", "en-US").await,
            Err(MetadataError::NetworkError(_))
        ));

        let mut http = MockHttpClient::new();
        http.expect_execute_with_retry()
            .times(1)
            .returning(|_, _| Ok(response(200, "not json")));
        let client = TmdbClient::new(Arc::new(http), &config());
        assert!(matches!(
            client.search_movies("Up", "en-US").await,
            Err(MetadataError::JsonParse(_))
        ));
    }

    #[test]
    fn test_rate_limiter_pending_wait() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(10_000));
        let mut limiter = RateLimiter::new(250, clock);
        assert_eq!(limiter.pending_wait(), None);

        limiter.last_request_ms = Some(9_900);
        assert_eq!(limiter.pending_wait(), Some(Duration::from_millis(150)));

        limiter.last_request_ms = Some(9_000);
        assert_eq!(limiter.pending_wait(), None);
    }
}
