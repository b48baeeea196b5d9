//! Client navigation runtime
//!
//! This module re-exports `reinhardt-rsc-client`. On `wasm32` targets the
//! `browser` submodule binds the runtime to the DOM and the History API.

pub use reinhardt_rsc_client::*;
