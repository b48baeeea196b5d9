//! The RSC request handler.
//!
//! Every request runs the root component (usually a router) with the request
//! location as props, resolves the result and answers in one of two modes:
//!
//! - **payload** (`?jsx`): the encoded tree as `application/json`;
//! - **document**: the tree rendered to HTML, with the encoded tree embedded
//!   in an inline script for the client to hydrate from.
//!
//! Resolution failures answer with the status the failing component asked
//! for and an empty body.

use async_trait::async_trait;
use hyper::Method;
use reinhardt_rsc_core::codec::{self, CodecError};
use reinhardt_rsc_core::{
	ClientNode, ComponentRef, Node, Props, ResolveError, Resolver, ServerComponent,
};

use crate::error::{ServerError, ServerResult};
use crate::html;
use crate::request::{Handler, Request, Response};
use crate::settings::ServerSettings;

/// Prop carrying the request path to the root component.
pub const PATHNAME_PROP: &str = "pathname";

/// Prop carrying the query string (without the payload marker) to the root
/// component, or `null` when there is none.
pub const SEARCH_PROP: &str = "search";

const JSON_CONTENT_TYPE: &str = "application/json";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Serves a root server component as documents and payloads.
pub struct RscHandler {
	root: ComponentRef,
	resolver: Resolver,
	payload_query: String,
	initial_payload_var: String,
	client_script: Option<String>,
}

impl RscHandler {
	/// Creates a handler for `root` with default settings.
	pub fn new(root: impl ServerComponent) -> Self {
		Self::from_ref(ComponentRef::new(root))
	}

	/// Creates a handler for an already shared root component.
	pub fn from_ref(root: ComponentRef) -> Self {
		let defaults = ServerSettings::default();
		Self {
			root,
			resolver: Resolver::new(),
			payload_query: defaults.payload_query,
			initial_payload_var: defaults.initial_payload_var,
			client_script: defaults.client_script,
		}
	}

	/// Applies the payload marker, payload variable and client script from
	/// `settings`.
	pub fn with_settings(mut self, settings: &ServerSettings) -> Self {
		self.payload_query = settings.payload_query.clone();
		self.initial_payload_var = settings.initial_payload_var.clone();
		self.client_script = settings.client_script.clone();
		self
	}

	/// Uses a custom resolver.
	pub fn with_resolver(mut self, resolver: Resolver) -> Self {
		self.resolver = resolver;
		self
	}

	/// Sets the client module script included in documents.
	pub fn with_client_script(mut self, src: impl Into<String>) -> Self {
		self.client_script = Some(src.into());
		self
	}

	/// Returns `true` if `request` asks for a payload instead of a document.
	pub fn wants_payload(&self, request: &Request) -> bool {
		request.has_query_flag(&self.payload_query)
	}

	/// Props passed to the root component for `request`.
	pub fn root_props(&self, request: &Request) -> Props {
		let search = request
			.query_without(&self.payload_query)
			.map_or(Node::Null, Node::from);
		let mut props = Props::new();
		props.insert(PATHNAME_PROP.to_string(), Node::from(request.path()));
		props.insert(SEARCH_PROP.to_string(), search);
		props
	}

	/// Runs the root component for `request` and resolves its output.
	pub async fn resolve_request(&self, request: &Request) -> Result<ClientNode, ResolveError> {
		let mut root = Node::component_ref(self.root.clone());
		root.props = self.root_props(request);
		self.resolver.resolve(root.into()).await
	}

	/// The encoded tree for `request`.
	pub async fn render_payload(&self, request: &Request) -> ServerResult<String> {
		let tree = self.resolve_request(request).await?;
		Ok(codec::encode(&tree)?)
	}

	/// The HTML document for `request`, with the payload embedded.
	pub async fn render_document(&self, request: &Request) -> ServerResult<String> {
		let tree = self.resolve_request(request).await?;
		let payload = codec::encode(&tree)?;
		let document = html::render_document(&tree);
		Ok(html::inject_before_body_end(
			&document,
			&self.bootstrap_scripts(&payload)?,
		))
	}

	fn bootstrap_scripts(&self, payload: &str) -> Result<String, CodecError> {
		// The variable name is configurable, so it is quoted like the payload.
		let mut scripts = format!(
			"<script>window[{}] = {};</script>",
			codec::embed_script_literal(&self.initial_payload_var)?,
			codec::embed_script_literal(payload)?
		);
		if let Some(src) = &self.client_script {
			scripts.push_str(&format!(
				"<script type=\"module\" src=\"{}\"></script>",
				html::escape_attr(src)
			));
		}
		Ok(scripts)
	}

	async fn respond(&self, request: &Request) -> ServerResult<Response> {
		if self.wants_payload(request) {
			let body = self.render_payload(request).await?;
			Ok(Response::ok()
				.with_content_type(JSON_CONTENT_TYPE)
				.with_body(body))
		} else {
			let body = self.render_document(request).await?;
			Ok(Response::ok()
				.with_content_type(HTML_CONTENT_TYPE)
				.with_body(body))
		}
	}
}

#[async_trait]
impl Handler for RscHandler {
	async fn handle(&self, request: Request) -> ServerResult<Response> {
		if request.method != Method::GET && request.method != Method::HEAD {
			return Ok(Response::method_not_allowed());
		}

		tracing::debug!(
			method = %request.method,
			path = request.path(),
			payload = self.wants_payload(&request),
			"Handling RSC request"
		);

		let mut response = match self.respond(&request).await {
			Ok(response) => response,
			Err(err @ (ServerError::Resolve(_) | ServerError::Codec(_))) => {
				tracing::error!(path = request.path(), error = %err, "Failed to render page");
				Response::empty(err.status_code())
			}
			Err(err) => return Err(err),
		};

		if request.method == Method::HEAD {
			response.body = Default::default();
		}
		Ok(response)
	}
}

impl std::fmt::Debug for RscHandler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RscHandler")
			.field("root", &self.root)
			.field("payload_query", &self.payload_query)
			.field("initial_payload_var", &self.initial_payload_var)
			.field("client_script", &self.client_script)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::StatusCode;
	use hyper::header::CONTENT_TYPE;
	use reinhardt_rsc_core::{CHILDREN, RenderError, component_fn};
	use rstest::*;

	#[fixture]
	fn handler() -> RscHandler {
		RscHandler::new(component_fn("EchoRouter", |props: Props| async move {
			let pathname = props
				.get(PATHNAME_PROP)
				.and_then(Node::as_text)
				.unwrap_or_default()
				.to_string();
			if pathname == "/missing" {
				return Err(RenderError::not_found(pathname));
			}
			let search = props.get(SEARCH_PROP).cloned().unwrap_or(Node::Null);
			Ok(Node::from(
				Node::host("html").child(
					Node::host("body")
						.child(Node::host("h1").child(pathname))
						.child(Node::host("p").prop(CHILDREN, search)),
				),
			))
		}))
	}

	#[rstest]
	#[tokio::test]
	async fn test_payload_mode(handler: RscHandler) {
		let response = handler.handle(Request::get("/hello?jsx")).await.unwrap();

		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.headers[CONTENT_TYPE], JSON_CONTENT_TYPE);
		let tree = codec::decode(&response.text()).unwrap();
		assert_eq!(tree.text_content(), "/hello");
	}

	#[rstest]
	#[tokio::test]
	async fn test_document_mode_embeds_payload(handler: RscHandler) {
		let handler = handler.with_client_script("/client.js");

		let response = handler.handle(Request::get("/hello")).await.unwrap();
		let body = response.text();

		assert_eq!(response.headers[CONTENT_TYPE], HTML_CONTENT_TYPE);
		assert!(body.starts_with("<!DOCTYPE html><html><body><h1>/hello</h1>"));
		assert!(body.contains("<script>window[\"__INITIAL_CLIENT_JSX_STRING__\"] = \""));
		assert!(body.ends_with("<script type=\"module\" src=\"/client.js\"></script></body></html>"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_search_excludes_payload_marker(handler: RscHandler) {
		let response = handler
			.handle(Request::get("/search?q=rsc&jsx"))
			.await
			.unwrap();
		let tree = codec::decode(&response.text()).unwrap();
		assert_eq!(tree.text_content(), "/searchq=rsc");
	}

	#[rstest]
	#[tokio::test]
	async fn test_component_error_maps_to_status(handler: RscHandler) {
		let response = handler.handle(Request::get("/missing?jsx")).await.unwrap();

		assert_eq!(response.status, StatusCode::NOT_FOUND);
		assert!(response.body.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_non_get_is_rejected(handler: RscHandler) {
		let request = Request::new(Method::POST, "/".parse().unwrap(), Default::default());
		let response = handler.handle(request).await.unwrap();
		assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
	}

	#[rstest]
	#[tokio::test]
	async fn test_head_has_no_body(handler: RscHandler) {
		let request = Request::new(Method::HEAD, "/hello".parse().unwrap(), Default::default());
		let response = handler.handle(request).await.unwrap();
		assert_eq!(response.status, StatusCode::OK);
		assert!(response.body.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_custom_settings(handler: RscHandler) {
		let settings = ServerSettings {
			payload_query: "rsc".to_string(),
			initial_payload_var: "__TREE__".to_string(),
			..ServerSettings::default()
		};
		let handler = handler.with_settings(&settings);

		let payload = handler.handle(Request::get("/a?rsc")).await.unwrap();
		let document = handler.handle(Request::get("/a?jsx")).await.unwrap();

		assert_eq!(payload.headers[CONTENT_TYPE], JSON_CONTENT_TYPE);
		assert!(document.text().contains("window[\"__TREE__\"] = "));
	}

	#[rstest]
	#[tokio::test]
	async fn test_payload_var_cannot_break_out_of_script(handler: RscHandler) {
		let settings = ServerSettings {
			initial_payload_var: "x</script><script>alert(1)//".to_string(),
			..ServerSettings::default()
		};
		let handler = handler.with_settings(&settings);

		let document = handler.handle(Request::get("/a")).await.unwrap();
		let text = document.text();

		assert!(text.contains("window[\"x\\u003c/script\\u003e\\u003cscript\\u003ealert(1)//\"] = "));
		assert_eq!(text.matches("</script>").count(), 1);
	}
}
