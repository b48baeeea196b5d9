//! Error types for client navigation.

use reinhardt_rsc_core::CodecError;

/// Errors that prevent a navigation from committing.
///
/// None of these are retried. The last committed tree stays on screen and
/// the next navigation starts a fresh cycle.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
	/// The request could not be sent or its body could not be read.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// The server answered with a non-success status.
	#[error("Server responded with status {0}")]
	Status(u16),

	/// The payload could not be decoded.
	#[error("Failed to decode payload: {0}")]
	Decode(#[from] CodecError),
}

/// Result type for navigation operations.
pub type NavigationResult<T> = Result<T, NavigationError>;
