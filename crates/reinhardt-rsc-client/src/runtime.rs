//! Navigation runtime.
//!
//! The runtime owns the committed tree and the current location. Navigation
//! follows a last-navigation-wins rule:
//!
//! 1. navigating to `P` sets the current location to `P` immediately and
//!    starts a fetch for `P`;
//! 2. when the fetch completes, its target is compared with the current
//!    location *at that moment*;
//! 3. equal: the payload is decoded and committed. Different: the result is
//!    dropped.
//!
//! In-flight fetches are never cancelled. Any number of them may coexist;
//! only the one matching the latest request can commit.

use crate::error::NavigationError;
use crate::fetch::TreeFetcher;
use crate::history::SessionHistory;
use crate::link::{LinkClick, intercept_path};
use crate::render::TreeRenderer;
use reinhardt_rsc_core::{ClientNode, codec};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Whether a navigation is waiting on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPhase {
	/// A tree is committed and no fetch is in flight.
	Idle,
	/// At least one fetch is in flight.
	Fetching,
}

/// How a single navigation ended.
#[derive(Debug)]
pub enum NavigationOutcome {
	/// The fetched tree replaced the displayed tree.
	Committed,
	/// Another navigation started before this one finished; its result was
	/// dropped.
	Discarded,
	/// The fetch or decode failed; the previous tree stays committed.
	Failed(NavigationError),
}

impl NavigationOutcome {
	/// Returns `true` for [`NavigationOutcome::Committed`].
	pub fn is_committed(&self) -> bool {
		matches!(self, Self::Committed)
	}

	/// Returns `true` for [`NavigationOutcome::Discarded`].
	pub fn is_discarded(&self) -> bool {
		matches!(self, Self::Discarded)
	}
}

/// Returns `true` if a fetch for `target` may commit while `current` is the
/// current location.
pub fn is_fresh(target: &str, current: &str) -> bool {
	target == current
}

/// Client-side navigation controller.
pub struct NavigationRuntime<F, R, H> {
	fetcher: F,
	renderer: R,
	history: H,
	current_location: RefCell<String>,
	committed_location: RefCell<String>,
	committed_tree: RefCell<Rc<ClientNode>>,
	in_flight: Cell<usize>,
}

impl<F, R, H> NavigationRuntime<F, R, H>
where
	F: TreeFetcher,
	R: TreeRenderer,
	H: SessionHistory,
{
	/// Starts the runtime from the payload embedded in the first document.
	///
	/// No fetch happens. The decoded tree is handed to
	/// [`TreeRenderer::hydrate`] and becomes the first committed tree.
	pub fn hydrate(
		payload: &str,
		location: impl Into<String>,
		fetcher: F,
		renderer: R,
		history: H,
	) -> Result<Self, NavigationError> {
		let tree = codec::decode(payload)?;
		let location = location.into();
		renderer.hydrate(&tree);
		tracing::debug!(location = %location, "Hydrated initial tree");

		Ok(Self {
			fetcher,
			renderer,
			history,
			current_location: RefCell::new(location.clone()),
			committed_location: RefCell::new(location),
			committed_tree: RefCell::new(Rc::new(tree)),
			in_flight: Cell::new(0),
		})
	}

	/// Navigates to `path` without touching session history.
	pub async fn navigate(&self, path: &str) -> NavigationOutcome {
		*self.current_location.borrow_mut() = path.to_string();
		self.in_flight.set(self.in_flight.get() + 1);
		tracing::debug!(path, "Navigation started");

		let fetched = self.fetcher.fetch(path).await;
		self.in_flight.set(self.in_flight.get() - 1);

		let current = self.current_location();
		if !is_fresh(path, &current) {
			tracing::debug!(path, current = %current, "Discarding stale navigation");
			return NavigationOutcome::Discarded;
		}

		let decoded =
			fetched.and_then(|payload| codec::decode(&payload).map_err(NavigationError::from));
		let tree = match decoded {
			Ok(tree) => tree,
			Err(err) => {
				tracing::warn!(path, error = %err, "Navigation failed");
				return NavigationOutcome::Failed(err);
			}
		};

		self.renderer.render(&tree);
		*self.committed_tree.borrow_mut() = Rc::new(tree);
		*self.committed_location.borrow_mut() = path.to_string();
		tracing::debug!(path, "Navigation committed");
		NavigationOutcome::Committed
	}

	/// Pushes `path` onto session history and navigates to it.
	pub async fn follow_link(&self, path: &str) -> NavigationOutcome {
		self.history.push(path);
		self.navigate(path).await
	}

	/// Handles a click. Returns `None` if the click is not an in-app
	/// navigation and should be left to the browser.
	pub async fn handle_click(&self, click: &LinkClick) -> Option<NavigationOutcome> {
		let path = intercept_path(click)?;
		Some(self.follow_link(path).await)
	}

	/// Handles a back/forward event: navigates to the path history now
	/// points at, without pushing a new entry.
	pub async fn handle_popstate(&self) -> NavigationOutcome {
		let path = self.history.current_path();
		self.navigate(&path).await
	}

	/// The most recently requested location.
	pub fn current_location(&self) -> String {
		self.current_location.borrow().clone()
	}

	/// The location of the committed tree.
	pub fn committed_location(&self) -> String {
		self.committed_location.borrow().clone()
	}

	/// The committed tree.
	pub fn committed_tree(&self) -> Rc<ClientNode> {
		Rc::clone(&self.committed_tree.borrow())
	}

	/// Whether any fetch is in flight.
	pub fn phase(&self) -> NavigationPhase {
		if self.in_flight.get() == 0 {
			NavigationPhase::Idle
		} else {
			NavigationPhase::Fetching
		}
	}

	/// Number of fetches in flight.
	pub fn in_flight(&self) -> usize {
		self.in_flight.get()
	}

	/// The fetcher.
	pub fn fetcher(&self) -> &F {
		&self.fetcher
	}

	/// The renderer.
	pub fn renderer(&self) -> &R {
		&self.renderer
	}

	/// The session history.
	pub fn history(&self) -> &H {
		&self.history
	}
}

impl<F, R, H> std::fmt::Debug for NavigationRuntime<F, R, H> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NavigationRuntime")
			.field("current_location", &self.current_location.borrow())
			.field("committed_location", &self.committed_location.borrow())
			.field("in_flight", &self.in_flight.get())
			.finish()
	}
}
