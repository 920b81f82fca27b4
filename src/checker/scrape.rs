//! Scrape checker
//!
//! Fetches a page as text and extracts version strings with a configured
//! regex. Every non-overlapping match contributes its single capture group as
//! a candidate. A page with zero matches is a reportable failure: a configured
//! scrape source is expected to yield at least one version.

use async_trait::async_trait;
use regex::Regex;

use crate::checker::VersionChecker;
use crate::config::validate_capture_regex;
use crate::domain::VersionCandidate;
use crate::error::{CheckError, ConfigError};
use crate::net::HttpClient;

/// Checker that scrapes raw page text for version strings
pub struct ScrapeChecker {
    name: String,
    url: String,
    regex: Regex,
    client: HttpClient,
}

impl ScrapeChecker {
    /// Create a new scrape checker, compiling and validating the regex
    pub fn new(
        name: String,
        url: &str,
        pattern: &str,
        client: HttpClient,
    ) -> Result<Self, ConfigError> {
        let regex = validate_capture_regex(&name, pattern)?;
        Ok(Self {
            name,
            url: url.to_string(),
            regex,
            client,
        })
    }
}

#[async_trait]
impl VersionChecker for ScrapeChecker {
    fn kind(&self) -> &'static str {
        "scrape"
    }

    async fn check(&self) -> Result<Vec<VersionCandidate>, CheckError> {
        let body = self
            .client
            .get_text(&self.url)
            .await
            .map_err(|e| CheckError::network(&self.name, e))?;

        let mut matched = 0usize;
        let mut candidates = Vec::new();
        for captures in self.regex.captures_iter(&body) {
            matched += 1;
            // the capture group may be optional and absent from this match
            let Some(capture) = captures.get(1) else {
                continue;
            };
            if let Some(candidate) = VersionCandidate::parse(capture.as_str()) {
                candidates.push(candidate);
            }
        }

        if matched == 0 {
            return Err(CheckError::no_match(&self.name, &self.url));
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::select_latest;

    fn checker(server_url: &str, pattern: &str) -> ScrapeChecker {
        ScrapeChecker::new(
            "app".to_string(),
            &format!("{}/downloads", server_url),
            pattern,
            HttpClient::new().unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_scrape_selects_highest_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/downloads")
            .with_status(200)
            .with_body(
                r#"<a href="app-1.2.3.tar.gz">app-1.2.3.tar.gz</a>
                   <a href="app-1.3.0.tar.gz">app-1.3.0.tar.gz</a>"#,
            )
            .create_async()
            .await;

        let checker = checker(&server.url(), r"app-([0-9.]+)\.tar\.gz");
        let candidates = checker.check().await.unwrap();

        mock.assert_async().await;
        // two hrefs and two link texts, all matched
        assert_eq!(candidates.len(), 4);
        let latest = select_latest(candidates).unwrap();
        assert_eq!(latest.raw, "1.3.0");
    }

    #[tokio::test]
    async fn test_scrape_zero_matches_is_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/downloads")
            .with_status(200)
            .with_body("nothing to see here")
            .create_async()
            .await;

        let checker = checker(&server.url(), r"app-([0-9.]+)\.tar\.gz");
        let err = checker.check().await.unwrap_err();
        assert!(matches!(err, CheckError::NoMatch { .. }));
    }

    #[tokio::test]
    async fn test_scrape_discards_unparsable_captures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/downloads")
            .with_status(200)
            .with_body("app-1.2.tar.gz app-1.2..tar.gz")
            .create_async()
            .await;

        // the second capture "1.2." fails dotted-numeric parsing
        let checker = checker(&server.url(), r"app-([0-9.]+)\.tar\.gz");
        let candidates = checker.check().await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].raw, "1.2");
    }

    #[tokio::test]
    async fn test_scrape_absent_optional_capture_is_discarded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/downloads")
            .with_status(200)
            .with_body("app- app-2.1")
            .create_async()
            .await;

        // the group is optional, so "app-" matches without capturing
        let checker = checker(&server.url(), r"app-([0-9.]+)?");
        let candidates = checker.check().await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].raw, "2.1");
    }

    #[tokio::test]
    async fn test_scrape_network_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/downloads")
            .with_status(500)
            .create_async()
            .await;

        let checker = checker(&server.url(), r"([0-9.]+)");
        let err = checker.check().await.unwrap_err();
        assert!(matches!(err, CheckError::Network { .. }));
    }
}
