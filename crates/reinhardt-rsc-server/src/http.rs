//! HTTP/1.1 server.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::error::ServerResult;
use crate::request::{Handler, Request, Response};
use crate::shutdown::{ShutdownCoordinator, shutdown_signal};

/// HTTP server driving a [`Handler`].
///
/// One task per connection. Handler failures become empty `500` responses.
pub struct HttpServer {
	handler: Arc<dyn Handler>,
}

impl HttpServer {
	/// Creates a server for `handler`.
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self { handler }
	}

	/// Returns a clone of the handler.
	pub fn handler(&self) -> Arc<dyn Handler> {
		Arc::clone(&self.handler)
	}

	/// Listens on `addr` until Ctrl-C, then shuts down gracefully.
	pub async fn listen(self, addr: SocketAddr, shutdown_timeout: Duration) -> ServerResult<()> {
		let coordinator = ShutdownCoordinator::new(shutdown_timeout);
		let signal_coordinator = coordinator.clone();
		tokio::spawn(async move {
			shutdown_signal().await;
			signal_coordinator.shutdown();
		});
		self.listen_with_shutdown(addr, coordinator).await
	}

	/// Listens on `addr` until `coordinator` signals shutdown.
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> ServerResult<()> {
		let listener = TcpListener::bind(addr).await?;
		self.serve(listener, coordinator).await
	}

	/// Serves connections from an already bound listener until `coordinator`
	/// signals shutdown.
	///
	/// After the signal, no new connections are accepted and open ones get
	/// the coordinator's grace period to finish their current request.
	pub async fn serve(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> ServerResult<()> {
		let local_addr = listener.local_addr()?;
		tracing::info!(addr = %local_addr, "Server listening on http://{}", local_addr);

		let graceful = GracefulShutdown::new();
		let mut shutdown_rx = coordinator.subscribe();

		if !coordinator.is_shutting_down() {
			loop {
				tokio::select! {
					result = listener.accept() => {
						let (stream, remote_addr) = match result {
							Ok(accepted) => accepted,
							Err(err) => {
								tracing::warn!(error = %err, "Failed to accept connection");
								continue;
							}
						};
						let service = RequestService {
							handler: Arc::clone(&self.handler),
							remote_addr,
						};
						let connection = http1::Builder::new()
							.serve_connection(TokioIo::new(stream), service);
						let connection = graceful.watch(connection);

						tokio::spawn(async move {
							if let Err(err) = connection.await {
								tracing::debug!(
									remote = %remote_addr,
									error = %err,
									"Connection closed with error"
								);
							}
						});
					}
					_ = shutdown_rx.recv() => {
						tracing::info!("Shutdown signal received, stopping server");
						break;
					}
				}
			}
		}

		drop(listener);
		tokio::select! {
			_ = graceful.shutdown() => {
				tracing::info!("All connections closed");
			}
			_ = tokio::time::sleep(coordinator.timeout()) => {
				tracing::warn!(
					timeout = ?coordinator.timeout(),
					"Timed out waiting for connections to close"
				);
			}
		}

		coordinator.notify_shutdown_complete();
		Ok(())
	}
}

/// Adapts a [`Handler`] to hyper's service interface.
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Infallible;
	type Future =
		Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = Arc::clone(&self.handler);
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let (parts, _body) = req.into_parts();
			let mut request = Request::new(parts.method, parts.uri, parts.headers);
			request.remote_addr = Some(remote_addr);

			let response = handler.handle(request).await.unwrap_or_else(|err| {
				tracing::error!(error = %err, "Handler failed");
				Response::internal_server_error()
			});

			Ok(into_hyper(response))
		})
	}
}

fn into_hyper(response: Response) -> hyper::Response<Full<Bytes>> {
	let mut hyper_response = hyper::Response::new(Full::new(response.body));
	*hyper_response.status_mut() = response.status;
	*hyper_response.headers_mut() = response.headers;
	hyper_response
}

/// Creates a server for `handler` and runs it until Ctrl-C.
pub async fn serve(
	addr: SocketAddr,
	handler: Arc<dyn Handler>,
	shutdown_timeout: Duration,
) -> ServerResult<()> {
	HttpServer::new(handler).listen(addr, shutdown_timeout).await
}
