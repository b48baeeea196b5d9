//! Source and resolved tree types.
//!
//! A page is described as a [`Node`] tree. Source trees may contain server
//! components, which only the resolver knows how to run. The resolver turns a
//! source tree into a [`ClientNode`] tree, which has no component variant and
//! can therefore always be sent over the wire.

use crate::component::{ComponentRef, ServerComponent};
use serde_json::Number;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The reserved prop holding nested content.
pub const CHILDREN: &str = "children";

/// Props of a source element, keyed by attribute name.
pub type Props = BTreeMap<String, Node>;

/// Props of a resolved element, keyed by attribute name.
pub type ClientProps = BTreeMap<String, ClientNode>;

/// A node of a source tree.
#[derive(Debug, Clone)]
pub enum Node {
	/// Empty or absent value.
	Null,
	/// Boolean primitive.
	Bool(bool),
	/// Numeric primitive.
	Number(Number),
	/// String primitive.
	Text(String),
	/// Ordered sibling content.
	Sequence(Vec<Node>),
	/// A host, component or fragment element.
	Element(Element),
	/// A plain record that is not an element.
	Record(Props),
	/// A runtime value with no wire representation (e.g. a callback).
	Opaque(OpaqueValue),
}

impl Node {
	/// Starts a host element with the given tag name.
	pub fn host(name: impl Into<String>) -> Element {
		Element::new(ElementType::Host(name.into()))
	}

	/// Starts a fragment element.
	pub fn fragment() -> Element {
		Element::new(ElementType::Fragment)
	}

	/// Starts a component element.
	pub fn component(component: impl ServerComponent) -> Element {
		Element::new(ElementType::Component(ComponentRef::new(component)))
	}

	/// Starts a component element from an already shared component.
	pub fn component_ref(component: ComponentRef) -> Element {
		Element::new(ElementType::Component(component))
	}

	/// Wraps an arbitrary runtime value.
	pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
		Self::Opaque(OpaqueValue::new(value))
	}

	/// Builds a plain record from key/value pairs.
	pub fn record<K, V, I>(entries: I) -> Self
	where
		K: Into<String>,
		V: Into<Node>,
		I: IntoIterator<Item = (K, V)>,
	{
		Self::Record(
			entries
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}

	/// Returns the string content if this is a text node.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	/// Returns `true` for [`Node::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}
}

/// An element of a source tree.
#[derive(Debug, Clone)]
pub struct Element {
	/// What kind of element this is.
	pub ty: ElementType,
	/// Optional reconciliation key.
	pub key: Option<String>,
	/// Attributes, with nested content under [`CHILDREN`].
	pub props: Props,
}

/// The discriminant of a source element.
#[derive(Debug, Clone)]
pub enum ElementType {
	/// A markup tag such as `p` or `section`.
	Host(String),
	/// A unit of server-side page logic.
	Component(ComponentRef),
	/// Grouping without a host wrapper.
	Fragment,
	/// An element type the resolver does not understand (portals, suspense
	/// boundaries, ...). Carries a name for diagnostics.
	Unsupported(String),
}

impl ElementType {
	/// Short name of the discriminant, used in logs and errors.
	pub fn kind_name(&self) -> &str {
		match self {
			Self::Host(_) => "host",
			Self::Component(_) => "component",
			Self::Fragment => "fragment",
			Self::Unsupported(name) => name,
		}
	}
}

impl Element {
	/// Creates an element with no props.
	pub fn new(ty: ElementType) -> Self {
		Self {
			ty,
			key: None,
			props: Props::new(),
		}
	}

	/// Sets a prop.
	pub fn prop(mut self, name: impl Into<String>, value: impl Into<Node>) -> Self {
		self.props.insert(name.into(), value.into());
		self
	}

	/// Appends one child to the `children` prop.
	pub fn child(mut self, child: impl Into<Node>) -> Self {
		let child = child.into();
		let children = match self.props.remove(CHILDREN) {
			None | Some(Node::Null) => vec![child],
			Some(Node::Sequence(mut items)) => {
				items.push(child);
				items
			}
			Some(existing) => vec![existing, child],
		};
		self.props
			.insert(CHILDREN.to_string(), Node::Sequence(children));
		self
	}

	/// Replaces the `children` prop with the given sequence.
	pub fn children<I, N>(mut self, children: I) -> Self
	where
		I: IntoIterator<Item = N>,
		N: Into<Node>,
	{
		let children = children.into_iter().map(Into::into).collect();
		self.props
			.insert(CHILDREN.to_string(), Node::Sequence(children));
		self
	}

	/// Sets the reconciliation key.
	pub fn key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Looks up a prop.
	pub fn get_prop(&self, name: &str) -> Option<&Node> {
		self.props.get(name)
	}
}

/// A runtime value that cannot be resolved into a wire tree.
#[derive(Clone)]
pub struct OpaqueValue {
	type_name: &'static str,
	value: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
	/// Wraps a value, remembering its type name for diagnostics.
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self {
			type_name: std::any::type_name::<T>(),
			value: Arc::new(value),
		}
	}

	/// The Rust type name of the wrapped value.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Borrows the wrapped value if it has type `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.value.downcast_ref::<T>()
	}
}

impl std::fmt::Debug for OpaqueValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OpaqueValue")
			.field("type_name", &self.type_name)
			.finish()
	}
}

/// A node of a resolved tree.
///
/// This is what travels over the wire and what the client renders. There is
/// no component variant: resolution has already run every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientNode {
	/// Empty or absent value.
	Null,
	/// Boolean primitive.
	Bool(bool),
	/// Numeric primitive.
	Number(Number),
	/// String primitive.
	Text(String),
	/// Ordered sibling content.
	Sequence(Vec<ClientNode>),
	/// A host or fragment element.
	Element(ClientElement),
	/// A plain record that is not an element.
	Record(ClientProps),
}

impl ClientNode {
	/// Returns the string content if this is a text node.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	/// Returns the element if this node is one.
	pub fn as_element(&self) -> Option<&ClientElement> {
		match self {
			Self::Element(el) => Some(el),
			_ => None,
		}
	}

	/// Concatenates all text reachable through sequences and element children.
	///
	/// Numbers are included in their JSON form; booleans and nulls render
	/// nothing, matching how a DOM renderer treats them.
	pub fn text_content(&self) -> String {
		let mut out = String::new();
		self.collect_text(&mut out);
		out
	}

	fn collect_text(&self, out: &mut String) {
		match self {
			Self::Text(s) => out.push_str(s),
			Self::Number(n) => out.push_str(&n.to_string()),
			Self::Sequence(items) => items.iter().for_each(|item| item.collect_text(out)),
			Self::Element(el) => {
				if let Some(children) = el.children_node() {
					children.collect_text(out);
				}
			}
			Self::Null | Self::Bool(_) | Self::Record(_) => {}
		}
	}
}

/// An element of a resolved tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientElement {
	/// Host tag or fragment.
	pub kind: ClientElementKind,
	/// Optional reconciliation key.
	pub key: Option<String>,
	/// Attributes, with nested content under [`CHILDREN`].
	pub props: ClientProps,
}

/// The discriminant of a resolved element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientElementKind {
	/// A markup tag.
	Host(String),
	/// Grouping without a host wrapper.
	Fragment,
}

impl ClientElement {
	/// Creates a host element with no props.
	pub fn host(name: impl Into<String>) -> Self {
		Self {
			kind: ClientElementKind::Host(name.into()),
			key: None,
			props: ClientProps::new(),
		}
	}

	/// Creates a fragment element with no props.
	pub fn fragment() -> Self {
		Self {
			kind: ClientElementKind::Fragment,
			key: None,
			props: ClientProps::new(),
		}
	}

	/// Sets a prop.
	pub fn prop(mut self, name: impl Into<String>, value: impl Into<ClientNode>) -> Self {
		self.props.insert(name.into(), value.into());
		self
	}

	/// Replaces the `children` prop with the given sequence.
	pub fn children<I, N>(mut self, children: I) -> Self
	where
		I: IntoIterator<Item = N>,
		N: Into<ClientNode>,
	{
		let children = children.into_iter().map(Into::into).collect();
		self.props
			.insert(CHILDREN.to_string(), ClientNode::Sequence(children));
		self
	}

	/// Sets the reconciliation key.
	pub fn key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// The tag name for host elements.
	pub fn tag_name(&self) -> Option<&str> {
		match &self.kind {
			ClientElementKind::Host(name) => Some(name),
			ClientElementKind::Fragment => None,
		}
	}

	/// The `children` prop, if any.
	pub fn children_node(&self) -> Option<&ClientNode> {
		self.props.get(CHILDREN)
	}
}

macro_rules! impl_from_number {
	($($t:ty),*) => {
		$(
			impl From<$t> for Node {
				fn from(value: $t) -> Self {
					Self::Number(Number::from(value))
				}
			}

			impl From<$t> for ClientNode {
				fn from(value: $t) -> Self {
					Self::Number(Number::from(value))
				}
			}
		)*
	};
}

impl_from_number!(i32, i64, u32, u64, usize);

/// NaN and infinities have no JSON form; they become an opaque value, so
/// resolving them fails as unresolvable.
impl From<f64> for Node {
	fn from(value: f64) -> Self {
		Number::from_f64(value).map_or_else(|| Self::opaque(value), Self::Number)
	}
}

/// NaN and infinities have no JSON form and become [`ClientNode::Null`].
impl From<f64> for ClientNode {
	fn from(value: f64) -> Self {
		Number::from_f64(value).map_or(Self::Null, Self::Number)
	}
}

impl From<bool> for Node {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<bool> for ClientNode {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<&str> for Node {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<&str> for ClientNode {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for Node {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<String> for ClientNode {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl<T: Into<Node>> From<Vec<T>> for Node {
	fn from(value: Vec<T>) -> Self {
		Self::Sequence(value.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<ClientNode>> From<Vec<T>> for ClientNode {
	fn from(value: Vec<T>) -> Self {
		Self::Sequence(value.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Node>> From<Option<T>> for Node {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

impl<T: Into<ClientNode>> From<Option<T>> for ClientNode {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

impl From<Element> for Node {
	fn from(value: Element) -> Self {
		Self::Element(value)
	}
}

impl From<ClientElement> for ClientNode {
	fn from(value: ClientElement) -> Self {
		Self::Element(value)
	}
}

impl From<Props> for Node {
	fn from(value: Props) -> Self {
		Self::Record(value)
	}
}

impl From<ClientProps> for ClientNode {
	fn from(value: ClientProps) -> Self {
		Self::Record(value)
	}
}

// A resolved tree is always a valid source tree.
impl From<ClientNode> for Node {
	fn from(value: ClientNode) -> Self {
		match value {
			ClientNode::Null => Self::Null,
			ClientNode::Bool(b) => Self::Bool(b),
			ClientNode::Number(n) => Self::Number(n),
			ClientNode::Text(s) => Self::Text(s),
			ClientNode::Sequence(items) => {
				Self::Sequence(items.into_iter().map(Into::into).collect())
			}
			ClientNode::Element(el) => Self::Element(Element {
				ty: match el.kind {
					ClientElementKind::Host(name) => ElementType::Host(name),
					ClientElementKind::Fragment => ElementType::Fragment,
				},
				key: el.key,
				props: el.props.into_iter().map(|(k, v)| (k, v.into())).collect(),
			}),
			ClientNode::Record(props) => {
				Self::Record(props.into_iter().map(|(k, v)| (k, v.into())).collect())
			}
		}
	}
}
