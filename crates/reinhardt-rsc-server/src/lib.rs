//! Reinhardt RSC Server - the HTTP boundary
//!
//! Serves a root [`ServerComponent`](reinhardt_rsc_core::ServerComponent)
//! over HTTP/1.1:
//!
//! - `GET /path` renders the resolved tree to an HTML document and embeds the
//!   encoded tree for hydration;
//! - `GET /path?jsx` returns the encoded tree as `application/json`;
//! - resolution failures answer with the component's status (e.g. 404) and
//!   an empty body.
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use reinhardt_rsc_server::{HttpServer, RscHandler, ServerSettings};
//! use std::sync::Arc;
//!
//! let settings = ServerSettings::load(Some("rsc.toml".as_ref()))?;
//! let handler = RscHandler::new(Router).with_settings(&settings);
//!
//! HttpServer::new(Arc::new(handler))
//!     .listen(settings.socket_addr()?, settings.shutdown_timeout())
//!     .await?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod handler;
pub mod html;
pub mod http;
pub mod request;
pub mod settings;
pub mod shutdown;

pub use error::{ServerError, ServerResult};
pub use handler::{PATHNAME_PROP, RscHandler, SEARCH_PROP};
pub use html::render_to_html;
pub use http::{HttpServer, serve};
pub use request::{Handler, Request, Response};
pub use settings::{ServerSettings, SettingsError};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
