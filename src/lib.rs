//! # Reinhardt RSC
//!
//! Server components for Reinhardt.
//!
//! A page is a tree of elements in which some nodes are async server
//! components. The server resolves every component into plain elements,
//! encodes the result as JSON and either renders it to an HTML document or
//! hands the JSON to the client. The client keeps that tree as the current
//! view and swaps it out on navigation, dropping responses that arrive for a
//! location the user has already left.
//!
//! ## Crates
//!
//! - [`core`] - tree model, resolver and `$RE` wire codec
//! - [`server`] - HTTP boundary (feature `server`, enabled by default)
//! - [`client`] - navigation runtime (feature `client`)
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use reinhardt_rsc::prelude::*;
//!
//! let page = component_fn("Page", |props: Props| async move {
//!     let pathname = props.get(PATHNAME_PROP).and_then(Node::as_text).unwrap_or("/");
//!     Ok(Node::from(Node::host("h1").child(format!("You are at {}", pathname))))
//! });
//!
//! let settings = ServerSettings::load(None)?;
//! HttpServer::new(Arc::new(RscHandler::new(page).with_settings(&settings)))
//!     .listen(settings.socket_addr()?, settings.shutdown_timeout())
//!     .await?;
//! ```

#[cfg(feature = "client")]
pub mod client;
pub mod core;
#[cfg(feature = "server")]
pub mod server;

pub use reinhardt_rsc_core::{
	ClientNode, ComponentRef, Element, ElementType, Node, Props, RenderError, ResolveError,
	Resolver, ServerComponent, component_fn, decode, encode, resolve,
};

#[cfg(feature = "server")]
pub use reinhardt_rsc_server::{HttpServer, RscHandler, ServerSettings};

#[cfg(feature = "client")]
pub use reinhardt_rsc_client::{NavigationOutcome, NavigationRuntime};

pub use async_trait::async_trait;

/// Common imports for writing components and serving them.
pub mod prelude {
	pub use crate::core::{
		CHILDREN, ClientNode, ComponentRef, Element, ElementType, Node, Props, RenderError,
		ServerComponent, component_fn,
	};

	#[cfg(feature = "server")]
	pub use crate::server::{
		HttpServer, PATHNAME_PROP, RscHandler, SEARCH_PROP, ServerSettings, shutdown_signal,
	};

	#[cfg(feature = "client")]
	pub use crate::client::{
		HttpTreeFetcher, LinkClick, NavigationOutcome, NavigationRuntime, SessionHistory,
		TreeFetcher, TreeRenderer,
	};

	pub use async_trait::async_trait;
	pub use std::sync::Arc;
}
