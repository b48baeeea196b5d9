//! Server component trait.
//!
//! A server component is a unit of page logic that runs only on the server.
//! It receives its props and produces a new [`Node`] sub-tree, possibly after
//! awaiting external data (files, databases, ...). The resolver invokes it and
//! resolves whatever it returns.

use crate::error::RenderError;
use crate::node::{Node, Props};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Trait for components that run during resolution.
///
/// # Example
///
/// ```ignore
/// use reinhardt_rsc_core::{Node, Props, RenderError, ServerComponent};
///
/// struct Footer;
///
/// #[async_trait::async_trait]
/// impl ServerComponent for Footer {
///     fn name(&self) -> &str {
///         "Footer"
///     }
///
///     async fn render(&self, props: Props) -> Result<Node, RenderError> {
///         let author = props.get("author").and_then(Node::as_text).unwrap_or("anonymous");
///         Ok(Node::host("footer").child(format!("(c) {}", author)).into())
///     }
/// }
/// ```
#[async_trait]
pub trait ServerComponent: Send + Sync + 'static {
	/// Returns the component's name for logging and error reports.
	fn name(&self) -> &str;

	/// Produces the component's output for the given props.
	async fn render(&self, props: Props) -> Result<Node, RenderError>;
}

/// A shared, cloneable handle to a server component.
#[derive(Clone)]
pub struct ComponentRef(Arc<dyn ServerComponent>);

impl ComponentRef {
	/// Wraps a component.
	pub fn new(component: impl ServerComponent) -> Self {
		Self(Arc::new(component))
	}

	/// Wraps an already shared component.
	pub fn from_arc(component: Arc<dyn ServerComponent>) -> Self {
		Self(component)
	}

	/// The component's name.
	pub fn name(&self) -> &str {
		self.0.name()
	}

	/// Invokes the component.
	pub async fn render(&self, props: Props) -> Result<Node, RenderError> {
		self.0.render(props).await
	}

	/// Returns `true` if both handles point to the same component instance.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl std::fmt::Debug for ComponentRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("ComponentRef").field(&self.name()).finish()
	}
}

/// A component backed by an async function.
pub struct FnComponent<F> {
	name: String,
	func: F,
}

/// Turns an async function of props into a [`ServerComponent`].
///
/// ```ignore
/// let post_page = component_fn("BlogPostPage", |props| async move {
///     let slug = props.get("postSlug").cloned().unwrap_or(Node::Null);
///     Ok(Node::component(Post).prop("slug", slug).into())
/// });
/// ```
pub fn component_fn<F, Fut>(name: impl Into<String>, func: F) -> FnComponent<F>
where
	F: Fn(Props) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Node, RenderError>> + Send + 'static,
{
	FnComponent {
		name: name.into(),
		func,
	}
}

#[async_trait]
impl<F, Fut> ServerComponent for FnComponent<F>
where
	F: Fn(Props) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Node, RenderError>> + Send + 'static,
{
	fn name(&self) -> &str {
		&self.name
	}

	async fn render(&self, props: Props) -> Result<Node, RenderError> {
		(self.func)(props).await
	}
}

impl<F> std::fmt::Debug for FnComponent<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FnComponent")
			.field("name", &self.name)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_component_fn_renders_with_props() {
		let greeting = component_fn("Greeting", |props: Props| async move {
			let name = props
				.get("name")
				.and_then(Node::as_text)
				.unwrap_or("world")
				.to_string();
			Ok(Node::from(format!("Hello, {}!", name)))
		});
		let component = ComponentRef::new(greeting);

		let mut props = Props::new();
		props.insert("name".to_string(), Node::from("Reinhardt"));
		let output = component.render(props).await.unwrap();

		assert_eq!(component.name(), "Greeting");
		assert_eq!(output.as_text(), Some("Hello, Reinhardt!"));
	}

	#[rstest]
	fn test_component_ref_ptr_eq() {
		let a = ComponentRef::new(component_fn("A", |_| async { Ok(Node::Null) }));
		let b = a.clone();
		let c = ComponentRef::new(component_fn("A", |_| async { Ok(Node::Null) }));

		assert!(a.ptr_eq(&b));
		assert!(!a.ptr_eq(&c));
		assert_eq!(format!("{:?}", a), "ComponentRef(\"A\")");
	}
}
