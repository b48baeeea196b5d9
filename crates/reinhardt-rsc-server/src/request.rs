//! Request and response types used between the HTTP server and handlers.

use async_trait::async_trait;
use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use hyper::{HeaderMap, Method, StatusCode, Uri};
use std::net::SocketAddr;

use crate::error::ServerResult;

/// An incoming request.
///
/// RSC pages are read-only, so the body is not kept.
#[derive(Debug, Clone)]
pub struct Request {
	/// HTTP method.
	pub method: Method,
	/// Request target.
	pub uri: Uri,
	/// Request headers.
	pub headers: HeaderMap,
	/// Peer address, when known.
	pub remote_addr: Option<SocketAddr>,
}

impl Request {
	/// Creates a request.
	pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
		Self {
			method,
			uri,
			headers,
			remote_addr: None,
		}
	}

	/// Creates a `GET` request for a path and query, e.g. `/post?jsx`.
	///
	/// Falls back to `/` if `target` is not a valid request target.
	pub fn get(target: &str) -> Self {
		let uri = target.parse().unwrap_or_else(|_| Uri::from_static("/"));
		Self::new(Method::GET, uri, HeaderMap::new())
	}

	/// The path component.
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// The raw query string, if any.
	pub fn query(&self) -> Option<&str> {
		self.uri.query()
	}

	/// Returns `true` if the query string contains `name`, with or without a
	/// value (`?jsx`, `?jsx=1`, `?a=b&jsx`).
	pub fn has_query_flag(&self, name: &str) -> bool {
		self.query().is_some_and(|query| {
			query
				.split('&')
				.any(|pair| pair.split('=').next() == Some(name))
		})
	}

	/// The query string without the `name` flag, or `None` if nothing is
	/// left.
	pub fn query_without(&self, name: &str) -> Option<String> {
		let rest: Vec<&str> = self
			.query()?
			.split('&')
			.filter(|pair| !pair.is_empty() && pair.split('=').next() != Some(name))
			.collect();
		if rest.is_empty() {
			None
		} else {
			Some(rest.join("&"))
		}
	}
}

/// An outgoing response.
#[derive(Debug, Clone)]
pub struct Response {
	/// Status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body.
	pub body: Bytes,
}

impl Response {
	/// Creates an empty response with the given status.
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// `200 OK` with an empty body.
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// `500 Internal Server Error` with an empty body.
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// `405 Method Not Allowed` with an `Allow` header.
	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED).with_header("allow", "GET, HEAD")
	}

	/// An empty response for a numeric status. Unknown codes become 500.
	pub fn empty(status: u16) -> Self {
		Self::new(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
	}

	/// Replaces the body.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Sets a header. Invalid names or values are ignored.
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	/// Sets `Content-Type`.
	pub fn with_content_type(mut self, content_type: &'static str) -> Self {
		self.headers
			.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
		self
	}

	/// The body as UTF-8 text, lossily.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Something that answers requests.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Produces the response for `request`.
	async fn handle(&self, request: Request) -> ServerResult<Response>;
}
