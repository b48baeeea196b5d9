//! Tree model, resolver and wire codec
//!
//! This module re-exports `reinhardt-rsc-core`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use reinhardt_rsc::core::{Node, Resolver, encode};
//!
//! let tree = Resolver::new()
//!     .resolve(Node::host("p").child("$5").into())
//!     .await?;
//! assert_eq!(encode(&tree)?, r#"{"$$typeof":"$RE","type":"p","key":null,"props":{"children":"$$5"}}"#);
//! ```

pub use reinhardt_rsc_core::*;
