//! # Router Module
//!
//! The router module provides path compilation and route resolution for
//! waymark. Registered templates are expanded into variants, compiled into
//! anchored regexes, and matched in specificity order.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling route templates (including optional groups) into a match table
//! - Ordering variants by specificity so literal paths beat parameter paths
//! - Extracting and converting path parameters on a match
//! - Producing canonical redirects for case and trailing slash mismatches
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: At registration, templates (e.g., `/posts/{id:int}`)
//!    are parsed, expanded, and converted into regex patterns with one
//!    capture group per parameter. Conflicting registrations are rejected
//!    here, and the finished table is immutable.
//!
//! 2. **Resolution**: For each request, the table tests the decoded path
//!    against the compiled patterns in specificity order. A failed exact pass
//!    falls back to case-relaxed and slash-toggled passes, which yield
//!    permanent redirects to the canonical URL instead of matches.
//!
//! ## Example
//!
//! ```rust,ignore
//! use waymark::Engine;
//!
//! let engine = Engine::build(|routes| {
//!     routes.get("/posts/{id:int}", |cx| { /* ... */ });
//! })?;
//!
//! // Resolution happens inside dispatch; parameters arrive typed.
//! let response = engine.respond(&Request::get("/posts/123"))?;
//! ```
//!
//! ## Performance
//!
//! The match path is allocation-light by design:
//! - Parameters are collected into a stack-allocated [`ParamVec`]
//! - Parameter names are shared `Arc<str>` clones, not string copies
//! - O(n) over compiled variants, with the specificity sort done at build time

mod core;

pub use core::{ParamVec, MAX_INLINE_PARAMS};

pub(crate) use core::{ParamSpec, Resolution, RouteTable, Seg, TableBuilder};
