//! Server error types.

use crate::settings::SettingsError;
use reinhardt_rsc_core::{CodecError, ResolveError};

/// Errors raised while serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Resolving the page tree failed.
	#[error(transparent)]
	Resolve(#[from] ResolveError),

	/// Encoding the resolved tree failed.
	#[error("Failed to encode payload: {0}")]
	Codec(#[from] CodecError),

	/// Settings could not be loaded.
	#[error(transparent)]
	Settings(#[from] SettingsError),

	/// Socket or connection failure.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Protocol-level failure on a connection.
	#[error("HTTP error: {0}")]
	Http(#[from] hyper::Error),
}

impl ServerError {
	/// HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::Resolve(err) => err.status_code(),
			Self::Codec(_) | Self::Settings(_) | Self::Io(_) | Self::Http(_) => 500,
		}
	}
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
