//! # URLs Module
//!
//! Reverse routing: building canonical URLs from route names and parameter
//! values. The [`UrlMap`] is derived from the compiled route table at build
//! time and shared read-only, so handlers can generate links without touching
//! template text.
//!
//! Values run through the same converters that parse inbound paths, which
//! keeps generated URLs round-trippable: `int({fixedDigits: 4})` pads `1` to
//! `0001`, and a value a converter would reject inbound is rejected here too.
//!
//! ## Example
//!
//! ```rust,ignore
//! let url = engine.url("post", 7)?;                       // "/posts/7"
//! let url = engine.url("post", json!({ "id": 7 }))?;      // "/posts/7"
//! let url = cx.url("search", ("rust", 2))?;               // "/search/rust/2"
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{UrlArgs, UrlMap};
