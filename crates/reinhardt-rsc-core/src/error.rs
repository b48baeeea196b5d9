//! Error types for components and resolution.

/// Errors a server component can report.
///
/// The variant decides which status the request boundary answers with.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
	/// The requested page or resource does not exist.
	#[error("Not found: {0}")]
	NotFound(String),

	/// The request was malformed.
	#[error("Bad request: {0}")]
	BadRequest(String),

	/// Reading external data failed.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Any other component failure.
	#[error("{0}")]
	Other(String),
}

impl RenderError {
	/// Create a not-found error
	pub fn not_found(msg: impl Into<String>) -> Self {
		Self::NotFound(msg.into())
	}

	/// Create a bad-request error
	pub fn bad_request(msg: impl Into<String>) -> Self {
		Self::BadRequest(msg.into())
	}

	/// Create a generic component error
	pub fn other(msg: impl Into<String>) -> Self {
		Self::Other(msg.into())
	}

	/// HTTP status code the request boundary should use.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::NotFound(_) => 404,
			Self::BadRequest(_) => 400,
			Self::Io(err) if err.kind() == std::io::ErrorKind::NotFound => 404,
			Self::Io(_) | Self::Other(_) => 500,
		}
	}
}

/// Errors that abort a resolution.
///
/// Resolution is all-or-nothing: any of these discards the partially
/// resolved tree.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
	/// An element carries a discriminant the resolver does not handle.
	#[error("Unsupported node kind: {0}")]
	UnsupportedKind(String),

	/// A value with no wire representation was found in the tree.
	#[error("Unresolvable value of type `{type_name}`")]
	Unresolvable {
		/// Rust type name of the offending value.
		type_name: String,
	},

	/// A server component returned an error.
	#[error("Component `{component}` failed: {source}")]
	Component {
		/// Name of the failing component.
		component: String,
		/// The component's error.
		#[source]
		source: RenderError,
	},

	/// Nesting went deeper than the configured limit.
	#[error("Maximum resolution depth of {0} exceeded")]
	DepthExceeded(usize),
}

impl ResolveError {
	/// HTTP status code the request boundary should use.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::Component { source, .. } => source.status_code(),
			Self::UnsupportedKind(_) | Self::Unresolvable { .. } | Self::DepthExceeded(_) => 500,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(RenderError::not_found("missing"), 404)]
	#[case(RenderError::bad_request("slug"), 400)]
	#[case(RenderError::other("boom"), 500)]
	#[case(RenderError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")), 404)]
	#[case(RenderError::Io(std::io::Error::other("disk")), 500)]
	fn test_render_error_status(#[case] err: RenderError, #[case] status: u16) {
		assert_eq!(err.status_code(), status);
	}

	#[rstest]
	fn test_resolve_error_status_delegates_to_component() {
		let err = ResolveError::Component {
			component: "Router".to_string(),
			source: RenderError::not_found("/nope.txt"),
		};
		assert_eq!(err.status_code(), 404);
		assert_eq!(
			err.to_string(),
			"Component `Router` failed: Not found: /nope.txt"
		);
	}

	#[rstest]
	fn test_resolve_error_display() {
		let err = ResolveError::UnsupportedKind("portal".to_string());
		assert_eq!(err.to_string(), "Unsupported node kind: portal");
		assert_eq!(err.status_code(), 500);
	}
}
