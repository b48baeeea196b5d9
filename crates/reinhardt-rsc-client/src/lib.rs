//! Reinhardt RSC Client - navigation without full page reloads
//!
//! The client receives resolved trees from the server and hands them to a
//! renderer. [`NavigationRuntime`] drives the cycle:
//!
//! 1. **Hydration**: decode the payload embedded in the first document and
//!    commit it without a fetch.
//! 2. **Navigation**: on an in-app link click or a back/forward event, fetch
//!    `{path}?jsx`, decode it and commit it.
//! 3. **Staleness guard**: a response commits only if its path is still the
//!    most recently requested one.
//!
//! The runtime talks to the outside world through three seams:
//! [`TreeFetcher`], [`TreeRenderer`] and [`SessionHistory`]. On `wasm32`,
//! the `browser` module wires them to `fetch`, the DOM and `window.history`.
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_rsc_client::{HttpTreeFetcher, LinkClick, MemoryHistory, NavigationRuntime};
//!
//! let runtime = NavigationRuntime::hydrate(
//!     &initial_payload,
//!     "/",
//!     HttpTreeFetcher::new("http://localhost:8080"),
//!     renderer,
//!     MemoryHistory::new("/"),
//! )?;
//!
//! runtime.handle_click(&LinkClick::anchor("/hello-world")).await;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod fetch;
pub mod history;
pub mod link;
pub mod render;
pub mod runtime;

#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use error::{NavigationError, NavigationResult};
pub use fetch::{DEFAULT_QUERY_MARKER, HttpTreeFetcher, TreeFetcher};
pub use history::{MemoryHistory, SessionHistory};
pub use link::{LinkClick, Modifiers, intercept_path};
pub use render::TreeRenderer;
pub use runtime::{NavigationOutcome, NavigationPhase, NavigationRuntime, is_fresh};
