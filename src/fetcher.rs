//! Artifact download and checksumming
//!
//! Downloads a resolved source URL and computes its sha256 incrementally, so
//! the payload is never held in memory at once. An optional on-disk cache is
//! keyed by the resolved URL: with `trust_cache` (the default) an existing
//! entry short-circuits the network entirely and is never revalidated, which
//! keeps repeated runs cheap and allows deliberately stale debugging. Cache
//! writes go through a temp file and an atomic rename so a crashed run can
//! never leave a partial entry that a later run would trust.
//!
//! Cache read failures degrade to a miss; cache write failures do not fail
//! the fetch (the artifact is already hashed) but surface as a warning.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::{FetchError, HttpError};
use crate::net::HttpClient;

/// Read/write chunk size for hashing and cache I/O
const CHUNK_SIZE: usize = 64 * 1024;

/// Fetch behavior configuration, passed down from the CLI
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Cache directory; `None` disables caching entirely
    pub cache_dir: Option<PathBuf>,
    /// Treat an existing cache entry as authoritative without revalidation
    pub trust_cache: bool,
}

impl FetchOptions {
    /// Options with a trusted cache at `dir`
    pub fn cached(dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(dir.into()),
            trust_cache: true,
        }
    }
}

/// Outcome of fetching one artifact
#[derive(Debug, Clone)]
pub struct FetchedArtifact {
    /// The URL that was fetched
    pub url: String,
    /// Hex sha256 of the artifact bytes
    pub sha256: String,
    /// Artifact size in bytes
    pub size: u64,
    /// True when the bytes came from the cache without a network call
    pub from_cache: bool,
    /// Non-fatal cache problem encountered along the way
    pub cache_warning: Option<String>,
}

/// Downloader with streaming checksum and URL-keyed cache
pub struct ArtifactFetcher {
    client: HttpClient,
    options: FetchOptions,
}

impl ArtifactFetcher {
    /// Create a new fetcher
    pub fn new(client: HttpClient, options: FetchOptions) -> Self {
        Self { client, options }
    }

    /// Cache entry path for a URL, if caching is enabled
    ///
    /// The key combines a hash of the full URL with the URL's file name, so
    /// identically named artifacts from different hosts never collide.
    pub fn cache_path(&self, url: &str) -> Option<PathBuf> {
        let dir = self.options.cache_dir.as_ref()?;
        let url_hash = hex::encode(Sha256::digest(url.as_bytes()));
        let file_name = url
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or("artifact");
        Some(dir.join(format!("{}-{}", &url_hash[..16], file_name)))
    }

    /// Fetch an artifact, preferring a trusted cache entry
    pub async fn fetch(&self, url: &str) -> Result<FetchedArtifact, FetchError> {
        if self.options.trust_cache {
            if let Some(path) = self.cache_path(url) {
                if path.exists() {
                    if let Ok((sha256, size)) = hash_file(&path) {
                        return Ok(FetchedArtifact {
                            url: url.to_string(),
                            sha256,
                            size,
                            from_cache: true,
                            cache_warning: None,
                        });
                    }
                    // unreadable entry: fall through to a fresh download
                }
            }
        }

        self.download(url).await
    }

    async fn download(&self, url: &str) -> Result<FetchedArtifact, FetchError> {
        let mut response = self.client.get(url).await.map_err(FetchError::network)?;

        let mut cache_warning = None;
        let mut sink = match self.open_cache_sink(url) {
            Ok(sink) => sink,
            Err(message) => {
                cache_warning = Some(message);
                None
            }
        };

        let mut hasher = Sha256::new();
        let mut size: u64 = 0;

        while let Some(chunk) = response.chunk().await.map_err(|e| {
            FetchError::network(HttpError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })
        })? {
            hasher.update(&chunk);
            size += chunk.len() as u64;

            if let Some((ref mut temp, _)) = sink {
                if let Err(e) = temp.write_all(&chunk) {
                    cache_warning = Some(format!("cache write failed: {}", e));
                    sink = None;
                }
            }
        }

        let sha256 = hex::encode(hasher.finalize());

        if let Some((temp, path)) = sink {
            // atomic: the entry appears complete or not at all
            if let Err(e) = temp.persist(&path) {
                cache_warning = Some(format!("cache persist failed: {}", e));
            }
        }

        Ok(FetchedArtifact {
            url: url.to_string(),
            sha256,
            size,
            from_cache: false,
            cache_warning,
        })
    }

    /// Open a temp file next to the final cache path, or explain why not
    fn open_cache_sink(&self, url: &str) -> Result<Option<(NamedTempFile, PathBuf)>, String> {
        let Some(path) = self.cache_path(url) else {
            return Ok(None);
        };
        let dir = self.options.cache_dir.as_ref().unwrap();
        std::fs::create_dir_all(dir).map_err(|e| format!("cache dir unavailable: {}", e))?;
        let temp =
            NamedTempFile::new_in(dir).map_err(|e| format!("cache temp file failed: {}", e))?;
        Ok(Some((temp, path)))
    }
}

/// Hash an existing file in chunks
fn hash_file(path: &Path) -> Result<(String, u64), std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut size: u64 = 0;

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        size += read as u64;
    }

    Ok((hex::encode(hasher.finalize()), size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BODY: &[u8] = b"artifact bytes";

    fn body_sha256() -> String {
        hex::encode(Sha256::digest(BODY))
    }

    fn fetcher(options: FetchOptions) -> ArtifactFetcher {
        ArtifactFetcher::new(HttpClient::new().unwrap(), options)
    }

    #[tokio::test]
    async fn test_fetch_without_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/app-1.0.tar.gz")
            .with_status(200)
            .with_body(BODY)
            .create_async()
            .await;

        let fetcher = fetcher(FetchOptions::default());
        let artifact = fetcher
            .fetch(&format!("{}/app-1.0.tar.gz", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(artifact.sha256, body_sha256());
        assert_eq!(artifact.size, BODY.len() as u64);
        assert!(!artifact.from_cache);
        assert!(artifact.cache_warning.is_none());
    }

    #[tokio::test]
    async fn test_second_fetch_hits_cache_with_zero_network_calls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/app-1.0.tar.gz")
            .with_status(200)
            .with_body(BODY)
            .expect(1)
            .create_async()
            .await;

        let cache = TempDir::new().unwrap();
        let fetcher = fetcher(FetchOptions::cached(cache.path()));
        let url = format!("{}/app-1.0.tar.gz", server.url());

        let first = fetcher.fetch(&url).await.unwrap();
        let second = fetcher.fetch(&url).await.unwrap();

        mock.assert_async().await;
        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.sha256, second.sha256);
        assert_eq!(second.sha256, body_sha256());
    }

    #[tokio::test]
    async fn test_revalidate_ignores_existing_entry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/app-1.0.tar.gz")
            .with_status(200)
            .with_body(BODY)
            .expect(2)
            .create_async()
            .await;

        let cache = TempDir::new().unwrap();
        let fetcher = fetcher(FetchOptions {
            cache_dir: Some(cache.path().to_path_buf()),
            trust_cache: false,
        });
        let url = format!("{}/app-1.0.tar.gz", server.url());

        fetcher.fetch(&url).await.unwrap();
        let second = fetcher.fetch(&url).await.unwrap();

        mock.assert_async().await;
        assert!(!second.from_cache);
    }

    #[tokio::test]
    async fn test_cache_entry_written_atomically() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/app-1.0.tar.gz")
            .with_status(200)
            .with_body(BODY)
            .create_async()
            .await;

        let cache = TempDir::new().unwrap();
        let fetcher = fetcher(FetchOptions::cached(cache.path()));
        let url = format!("{}/app-1.0.tar.gz", server.url());

        let artifact = fetcher.fetch(&url).await.unwrap();
        let entry = fetcher.cache_path(&url).unwrap();
        assert!(entry.exists());
        assert_eq!(std::fs::read(&entry).unwrap(), BODY);
        assert!(artifact.cache_warning.is_none());

        // no leftover temp files
        let names: Vec<String> = std::fs::read_dir(cache.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn test_same_file_name_different_urls_do_not_collide() {
        let fetcher = fetcher(FetchOptions::cached("/tmp/cache"));
        let a = fetcher.cache_path("https://a.example/app-1.0.tar.gz").unwrap();
        let b = fetcher.cache_path("https://b.example/app-1.0.tar.gz").unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_fetch_maps_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone.tar.gz")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = fetcher(FetchOptions::default());
        let err = fetcher
            .fetch(&format!("{}/gone.tar.gz", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
