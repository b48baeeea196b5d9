//! HTTP boundary
//!
//! This module re-exports `reinhardt-rsc-server`: the request handler that
//! resolves the root component per request, the hyper-based server and its
//! layered settings.

pub use reinhardt_rsc_server::*;
