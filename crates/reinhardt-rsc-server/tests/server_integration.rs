//! End-to-end tests over a real socket
//!
//! Each test binds `127.0.0.1:0`, serves a small router with `HttpServer`,
//! and talks to it with reqwest or the client navigation runtime.

use reinhardt_rsc_client::{
	HttpTreeFetcher, LinkClick, MemoryHistory, NavigationRuntime, TreeRenderer,
};
use reinhardt_rsc_core::{ClientNode, Node, Props, RenderError, component_fn};
use reinhardt_rsc_server::{HttpServer, PATHNAME_PROP, RscHandler, ShutdownCoordinator};
use rstest::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Running server that shuts down when dropped.
struct TestServer {
	url: String,
	coordinator: ShutdownCoordinator,
	task: Option<JoinHandle<()>>,
}

impl TestServer {
	async fn start() -> Self {
		let router = component_fn("Router", |props: Props| async move {
			let pathname = props
				.get(PATHNAME_PROP)
				.and_then(Node::as_text)
				.unwrap_or("/")
				.to_string();
			if pathname.contains('.') {
				return Err(RenderError::not_found(pathname));
			}
			Ok(Node::from(
				Node::host("html").child(
					Node::host("body")
						.child(Node::host("a").prop("href", "/other").child("$other"))
						.child(Node::host("main").child(format!("page {}", pathname))),
				),
			))
		});

		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let url = format!("http://{}", listener.local_addr().unwrap());
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(2));

		let server = HttpServer::new(Arc::new(RscHandler::new(router)));
		let server_coordinator = coordinator.clone();
		let task = tokio::spawn(async move {
			let _ = server.serve(listener, server_coordinator).await;
		});

		Self {
			url,
			coordinator,
			task: Some(task),
		}
	}
}

impl Drop for TestServer {
	fn drop(&mut self) {
		self.coordinator.shutdown();
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}
}

#[fixture]
async fn server() -> TestServer {
	TestServer::start().await
}

struct NullRenderer;

impl TreeRenderer for NullRenderer {
	fn hydrate(&self, _tree: &ClientNode) {}
	fn render(&self, _tree: &ClientNode) {}
}

#[rstest]
#[tokio::test]
async fn test_document_embeds_payload(#[future] server: TestServer) {
	let server = server.await;

	let response = reqwest::get(format!("{}/first", server.url)).await.unwrap();

	assert_eq!(response.status(), 200);
	assert_eq!(
		response.headers()["content-type"],
		"text/html; charset=utf-8"
	);
	let body = response.text().await.unwrap();
	assert!(body.starts_with("<!DOCTYPE html><html><body>"));
	assert!(body.contains("<main>page /first</main>"));
	assert!(body.contains("window[\"__INITIAL_CLIENT_JSX_STRING__\"] = \""));
}

#[rstest]
#[tokio::test]
async fn test_payload_round_trips(#[future] server: TestServer) {
	let server = server.await;

	let response = reqwest::get(format!("{}/first?jsx", server.url))
		.await
		.unwrap();

	assert_eq!(response.status(), 200);
	assert_eq!(response.headers()["content-type"], "application/json");
	let body = response.text().await.unwrap();
	assert!(body.contains("\"$RE\""));
	assert!(body.contains("\"$$other\""));
	let tree = reinhardt_rsc_core::decode(&body).unwrap();
	assert_eq!(tree.text_content(), "$otherpage /first");
}

#[rstest]
#[tokio::test]
async fn test_not_found_has_empty_body(#[future] server: TestServer) {
	let server = server.await;

	let response = reqwest::get(format!("{}/logo.png", server.url))
		.await
		.unwrap();

	assert_eq!(response.status(), 404);
	assert!(response.text().await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_post_is_rejected(#[future] server: TestServer) {
	let server = server.await;

	let response = reqwest::Client::new()
		.post(format!("{}/first", server.url))
		.send()
		.await
		.unwrap();

	assert_eq!(response.status(), 405);
}

#[rstest]
#[tokio::test]
async fn test_client_runtime_navigates_against_server(#[future] server: TestServer) {
	let server = server.await;

	let payload = reqwest::get(format!("{}/first?jsx", server.url))
		.await
		.unwrap()
		.text()
		.await
		.unwrap();
	let runtime = NavigationRuntime::hydrate(
		&payload,
		"/first",
		HttpTreeFetcher::new(server.url.clone()),
		NullRenderer,
		MemoryHistory::new("/first"),
	)
	.unwrap();

	let outcome = runtime.handle_click(&LinkClick::anchor("/other")).await;

	assert!(outcome.unwrap().is_committed());
	assert_eq!(runtime.committed_tree().text_content(), "$otherpage /other");
	assert_eq!(runtime.committed_location(), "/other");
}

#[rstest]
#[tokio::test]
async fn test_shutdown_stops_server() {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
	let router = component_fn("Router", |_props: Props| async { Ok(Node::from("ok")) });
	let server = HttpServer::new(Arc::new(RscHandler::new(router)));

	let task = tokio::spawn(server.serve(listener, coordinator.clone()));
	coordinator.shutdown();

	let result = tokio::time::timeout(Duration::from_secs(3), task)
		.await
		.expect("server should stop after shutdown")
		.unwrap();
	assert!(result.is_ok());
}
