//! Remote repository access, the network seam of the pipeline.
//!
//! [`RemoteSource`] is the trait the resolver and the worker talk to, so the
//! rest of the codebase is transport-agnostic. The production implementation
//! is [`HttpSource`]: a blocking reqwest client with a per-request timeout.
//! A timed-out or failed request surfaces as a [`RemoteError`]; it is never
//! silently swallowed or treated as success.
//!
//! Blocking on purpose: each rayon worker holds at most one request in
//! flight, so the async stack would add machinery without adding throughput.

use crate::config::RemoteConfig;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("empty body from {url}")]
    EmptyBody { url: String },
}

/// Trait for remote repository access.
///
/// Two operations: one manifest request per run, and one content request per
/// asset that needs work.
pub trait RemoteSource: Sync {
    /// Fetch the raw manifest payload (the full recursive tree listing).
    fn fetch_manifest(&self) -> Result<String, RemoteError>;

    /// Fetch raw image bytes for a manifest path.
    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, RemoteError>;
}

/// HTTP implementation backed by a blocking reqwest client.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    manifest_url: String,
    content_base: String,
}

impl HttpSource {
    pub fn new(remote: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(remote.request_timeout_secs))
            // GitHub's API rejects requests without a User-Agent
            .user_agent(concat!("artsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            manifest_url: remote.manifest_url.clone(),
            content_base: remote.content_base.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, RemoteError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

impl RemoteSource for HttpSource {
    fn fetch_manifest(&self) -> Result<String, RemoteError> {
        Ok(self.get(&self.manifest_url)?.text()?)
    }

    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        let url = format!("{}/{}", self.content_base, path);
        let bytes = self.get(&url)?.bytes()?;
        if bytes.is_empty() {
            return Err(RemoteError::EmptyBody { url });
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock source serving canned payloads from memory.
    /// Uses Mutex (not RefCell) for the fetch log so it is Sync and works
    /// under rayon's par_iter.
    pub struct MockSource {
        pub manifest: String,
        pub images: HashMap<String, Vec<u8>>,
        pub fetches: Mutex<Vec<String>>,
    }

    impl MockSource {
        pub fn new(manifest: impl Into<String>, images: HashMap<String, Vec<u8>>) -> Self {
            Self {
                manifest: manifest.into(),
                images,
                fetches: Mutex::new(Vec::new()),
            }
        }

        /// Content paths requested so far, in request order.
        pub fn fetched(&self) -> Vec<String> {
            self.fetches.lock().unwrap().clone()
        }
    }

    impl RemoteSource for MockSource {
        fn fetch_manifest(&self) -> Result<String, RemoteError> {
            Ok(self.manifest.clone())
        }

        fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
            self.fetches.lock().unwrap().push(path.to_string());

            self.images
                .get(path)
                .cloned()
                .ok_or_else(|| RemoteError::Status {
                    url: path.to_string(),
                    status: reqwest::StatusCode::NOT_FOUND,
                })
        }
    }

    #[test]
    fn mock_serves_known_paths() {
        let mut images = HashMap::new();
        images.insert("a/1.png".to_string(), vec![1, 2, 3]);
        let source = MockSource::new("{}", images);

        assert_eq!(source.fetch_bytes("a/1.png").unwrap(), vec![1, 2, 3]);
        assert_eq!(source.fetched(), vec!["a/1.png"]);
    }

    #[test]
    fn mock_unknown_path_is_not_found() {
        let source = MockSource::new("{}", HashMap::new());

        let result = source.fetch_bytes("missing.png");
        assert!(matches!(
            result,
            Err(RemoteError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
        ));
        // The failed request is still recorded
        assert_eq!(source.fetched().len(), 1);
    }

    #[test]
    fn error_messages_carry_the_url() {
        let err = RemoteError::Status {
            url: "https://example.test/a.png".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert!(err.to_string().contains("https://example.test/a.png"));

        let err = RemoteError::EmptyBody {
            url: "https://example.test/b.png".to_string(),
        };
        assert!(err.to_string().contains("b.png"));
    }
}
