//! Tree resolution engine.
//!
//! Resolution walks a source [`Node`] tree depth-first and produces a
//! [`ClientNode`] tree:
//!
//! - primitives pass through unchanged;
//! - sequences and records resolve every member concurrently and keep their
//!   original order and keys;
//! - host elements keep their shape and resolve their props;
//! - components are invoked with their props and replaced by their resolved
//!   output;
//! - fragments are replaced by their resolved `children`, and a single-child
//!   sequence collapses to that child;
//! - unsupported element kinds and opaque values abort the resolution.
//!
//! All concurrency happens on the calling task: sibling futures are joined,
//! not spawned.

use crate::error::ResolveError;
use crate::node::{
	CHILDREN, ClientElement, ClientElementKind, ClientNode, ClientProps, Element, ElementType, Node,
	Props,
};
use futures::future::{BoxFuture, try_join_all};

/// Default limit on nested element levels.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Options for [`Resolver`].
#[derive(Debug, Clone)]
pub struct ResolveOptions {
	/// Maximum number of nested element levels (host, component or fragment)
	/// before resolution fails with [`ResolveError::DepthExceeded`].
	pub max_depth: usize,
}

impl Default for ResolveOptions {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

impl ResolveOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the maximum nesting depth.
	pub fn max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = max_depth;
		self
	}
}

/// Resolves source trees into wire trees.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
	options: ResolveOptions,
}

impl Resolver {
	/// Creates a resolver with default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a resolver with custom options.
	pub fn with_options(options: ResolveOptions) -> Self {
		Self { options }
	}

	/// Returns the options.
	pub fn options(&self) -> &ResolveOptions {
		&self.options
	}

	/// Resolves a source tree.
	///
	/// Fails as a whole on the first error; no partial tree is returned.
	pub async fn resolve(&self, node: Node) -> Result<ClientNode, ResolveError> {
		self.resolve_node(node, 0).await
	}

	fn resolve_node(
		&self,
		node: Node,
		depth: usize,
	) -> BoxFuture<'_, Result<ClientNode, ResolveError>> {
		Box::pin(async move {
			match node {
				Node::Null => Ok(ClientNode::Null),
				Node::Bool(b) => Ok(ClientNode::Bool(b)),
				Node::Number(n) => Ok(ClientNode::Number(n)),
				Node::Text(s) => Ok(ClientNode::Text(s)),
				Node::Sequence(items) => self
					.resolve_sequence(items, depth)
					.await
					.map(ClientNode::Sequence),
				Node::Record(props) => self
					.resolve_props(props, depth)
					.await
					.map(ClientNode::Record),
				Node::Element(element) => self.resolve_element(element, depth).await,
				Node::Opaque(value) => Err(ResolveError::Unresolvable {
					type_name: value.type_name().to_string(),
				}),
			}
		})
	}

	async fn resolve_sequence(
		&self,
		items: Vec<Node>,
		depth: usize,
	) -> Result<Vec<ClientNode>, ResolveError> {
		try_join_all(items.into_iter().map(|item| self.resolve_node(item, depth))).await
	}

	async fn resolve_props(&self, props: Props, depth: usize) -> Result<ClientProps, ResolveError> {
		let (names, values): (Vec<String>, Vec<Node>) = props.into_iter().unzip();
		let values = self.resolve_sequence(values, depth).await?;
		Ok(names.into_iter().zip(values).collect())
	}

	async fn resolve_element(
		&self,
		element: Element,
		depth: usize,
	) -> Result<ClientNode, ResolveError> {
		if depth >= self.options.max_depth {
			return Err(ResolveError::DepthExceeded(self.options.max_depth));
		}

		let Element { ty, key, mut props } = element;
		match ty {
			ElementType::Host(name) => {
				let props = self.resolve_props(props, depth + 1).await?;
				Ok(ClientNode::Element(ClientElement {
					kind: ClientElementKind::Host(name),
					key,
					props,
				}))
			}
			ElementType::Component(component) => {
				tracing::debug!(component = component.name(), depth, "Invoking server component");
				let output = component.render(props).await.map_err(|source| {
					ResolveError::Component {
						component: component.name().to_string(),
						source,
					}
				})?;
				self.resolve_node(output, depth + 1).await
			}
			ElementType::Fragment => {
				let children = props.remove(CHILDREN).unwrap_or(Node::Null);
				match self.resolve_node(children, depth + 1).await? {
					ClientNode::Sequence(mut items) if items.len() == 1 => Ok(items.remove(0)),
					resolved => Ok(resolved),
				}
			}
			ElementType::Unsupported(kind) => Err(ResolveError::UnsupportedKind(kind)),
		}
	}
}

/// Resolves a source tree with default options.
pub async fn resolve(node: Node) -> Result<ClientNode, ResolveError> {
	Resolver::new().resolve(node).await
}
