//! Reinhardt RSC Core - server component trees and their wire format
//!
//! This crate holds the protocol shared by the RSC server and client:
//!
//! - [`node`]: source trees ([`Node`]) built by page code, and resolved trees
//!   ([`ClientNode`]) that contain only host elements, fragments, records and
//!   primitives
//! - [`component`]: the async [`ServerComponent`] trait
//! - [`resolve`]: the engine that runs every component of a source tree and
//!   produces a resolved tree
//! - [`codec`]: the reversible JSON encoding of resolved trees
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_rsc_core::{Node, codec, component_fn, resolve};
//!
//! let greeting = component_fn("Greeting", |_props| async {
//!     Ok(Node::from(Node::host("p").child("$5 off")))
//! });
//!
//! let tree = resolve(Node::component(greeting).into()).await?;
//! let payload = codec::encode(&tree)?;
//! assert_eq!(codec::decode(&payload)?, tree);
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod component;
pub mod error;
pub mod node;
pub mod resolve;

pub use codec::{CodecError, decode, encode};
pub use component::{ComponentRef, FnComponent, ServerComponent, component_fn};
pub use error::{RenderError, ResolveError};
pub use node::{
	CHILDREN, ClientElement, ClientElementKind, ClientNode, ClientProps, Element, ElementType, Node,
	OpaqueValue, Props,
};
pub use resolve::{ResolveOptions, Resolver, resolve};
