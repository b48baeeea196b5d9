//! Graceful shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, broadcast};

/// Coordinates shutdown between a signal source and running servers.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
	sender: broadcast::Sender<()>,
	timeout: Duration,
	shutting_down: Arc<AtomicBool>,
	complete: Arc<Notify>,
}

impl ShutdownCoordinator {
	/// Creates a coordinator that gives open connections `timeout` to finish.
	pub fn new(timeout: Duration) -> Self {
		let (sender, _) = broadcast::channel(1);
		Self {
			sender,
			timeout,
			shutting_down: Arc::new(AtomicBool::new(false)),
			complete: Arc::new(Notify::new()),
		}
	}

	/// Subscribes to the shutdown broadcast.
	pub fn subscribe(&self) -> broadcast::Receiver<()> {
		self.sender.subscribe()
	}

	/// Starts shutdown. Calling it more than once has no further effect.
	pub fn shutdown(&self) {
		if !self.shutting_down.swap(true, Ordering::SeqCst) {
			// No receivers just means no server is running yet.
			let _ = self.sender.send(());
		}
	}

	/// Returns `true` once [`shutdown`](Self::shutdown) has been called.
	pub fn is_shutting_down(&self) -> bool {
		self.shutting_down.load(Ordering::SeqCst)
	}

	/// Grace period for open connections.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Called by a server once it has stopped.
	pub fn notify_shutdown_complete(&self) {
		self.complete.notify_waiters();
		self.complete.notify_one();
	}

	/// Waits until a server reports completion, or the grace period plus one
	/// second has passed.
	pub async fn wait_for_shutdown(&self) {
		let limit = self.timeout + Duration::from_secs(1);
		if tokio::time::timeout(limit, self.complete.notified())
			.await
			.is_err()
		{
			tracing::warn!(timeout = ?limit, "Server did not report shutdown in time");
		}
	}
}

/// Resolves when the process receives Ctrl-C.
pub async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "Failed to listen for Ctrl-C");
		std::future::pending::<()>().await;
	}
	tracing::info!("Received Ctrl-C, shutting down gracefully");
}
