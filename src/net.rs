//! Shared HTTP client
//!
//! Every network call in the tool goes through `HttpClient`:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry (max 3 retries) on transport errors and 429
//! - Status mapping to `HttpError`
//!
//! The client is constructed once and handed down into checkers and the
//! artifact fetcher; there is no process-wide session.

use crate::error::HttpError;
use reqwest::Client;
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("flatup/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Perform a GET request with retry logic, returning the raw response
    ///
    /// Retries transport failures and 429s with exponential backoff; any
    /// other non-success status fails immediately.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, HttpError> {
        self.get_with_accept(url, None).await
    }

    /// Perform a GET request with an explicit Accept header
    pub async fn get_with_accept(
        &self,
        url: &str,
        accept: Option<&str>,
    ) -> Result<reqwest::Response, HttpError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            let mut request = self.client.get(url);
            if let Some(accept) = accept {
                request = request.header("Accept", accept);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(HttpError::RateLimited {
                            url: url.to_string(),
                        });
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(delay)).await;
                            delay *= 2;
                            continue;
                        }
                        break;
                    }

                    if !status.is_success() {
                        return Err(HttpError::Status {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        HttpError::Timeout {
                            url: url.to_string(),
                        }
                    } else {
                        HttpError::Transport {
                            url: url.to_string(),
                            message: e.to_string(),
                        }
                    });

                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| HttpError::Transport {
            url: url.to_string(),
            message: "unknown error".to_string(),
        }))
    }

    /// Perform a GET request and return the body as text
    pub async fn get_text(&self, url: &str) -> Result<String, HttpError> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| HttpError::InvalidResponse {
            url: url.to_string(),
            message: format!("failed to read text body: {}", e),
        })
    }

    /// Perform a GET request and parse the body as JSON
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        accept: Option<&str>,
    ) -> Result<T, HttpError> {
        let response = self.get_with_accept(url, accept).await?;
        response.json::<T>().await.map_err(|e| HttpError::InvalidResponse {
            url: url.to_string(),
            message: format!("failed to parse JSON: {}", e),
        })
    }
}
