//! Payload fetching.

use crate::error::{NavigationError, NavigationResult};
use async_trait::async_trait;

/// Default query marker asking the server for a payload instead of a document.
pub const DEFAULT_QUERY_MARKER: &str = "jsx";

/// Fetches the encoded tree for a path.
///
/// Futures are not required to be `Send`: the runtime drives every fetch on
/// the thread that owns it.
#[async_trait(?Send)]
pub trait TreeFetcher {
	/// Returns the encoded payload for `path`.
	async fn fetch(&self, path: &str) -> NavigationResult<String>;
}

/// Fetches payloads over HTTP with `reqwest`.
///
/// Requests `GET {origin}{path}?jsx`; any non-success status is reported as
/// [`NavigationError::Status`].
#[derive(Debug, Clone)]
pub struct HttpTreeFetcher {
	client: reqwest::Client,
	origin: String,
	query_marker: String,
}

impl HttpTreeFetcher {
	/// Creates a fetcher for the given origin (e.g. `http://localhost:8080`).
	pub fn new(origin: impl Into<String>) -> Self {
		Self::with_client(reqwest::Client::new(), origin)
	}

	/// Creates a fetcher that reuses an existing client.
	pub fn with_client(client: reqwest::Client, origin: impl Into<String>) -> Self {
		let origin = origin.into().trim_end_matches('/').to_string();
		Self {
			client,
			origin,
			query_marker: DEFAULT_QUERY_MARKER.to_string(),
		}
	}

	/// Overrides the query marker.
	pub fn with_query_marker(mut self, marker: impl Into<String>) -> Self {
		self.query_marker = marker.into();
		self
	}

	/// The origin requests are sent to.
	pub fn origin(&self) -> &str {
		&self.origin
	}

	/// Builds the payload URL for `path`, keeping any existing query string
	/// and dropping the fragment.
	pub fn payload_url(&self, path: &str) -> String {
		let path = path.split('#').next().unwrap_or_default();
		let separator = if path.contains('?') { '&' } else { '?' };
		format!("{}{}{}{}", self.origin, path, separator, self.query_marker)
	}
}

#[async_trait(?Send)]
impl TreeFetcher for HttpTreeFetcher {
	async fn fetch(&self, path: &str) -> NavigationResult<String> {
		let url = self.payload_url(path);
		tracing::debug!(url = %url, "Fetching tree payload");

		let response = self.client.get(&url).send().await?;
		let status = response.status();
		if !status.is_success() {
			return Err(NavigationError::Status(status.as_u16()));
		}
		Ok(response.text().await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/", "http://localhost:8080/?jsx")]
	#[case("/hello-world", "http://localhost:8080/hello-world?jsx")]
	#[case("/search?q=rsc", "http://localhost:8080/search?q=rsc&jsx")]
	#[case("/post#comments", "http://localhost:8080/post?jsx")]
	fn test_payload_url(#[case] path: &str, #[case] expected: &str) {
		let fetcher = HttpTreeFetcher::new("http://localhost:8080/");
		assert_eq!(fetcher.payload_url(path), expected);
	}

	#[rstest]
	fn test_custom_query_marker() {
		let fetcher = HttpTreeFetcher::new("https://blog.example").with_query_marker("rsc");
		assert_eq!(fetcher.origin(), "https://blog.example");
		assert_eq!(fetcher.payload_url("/a"), "https://blog.example/a?rsc");
	}
}
