//! # Scope Module
//!
//! The registration surface: the [`Scope`] handed to the closure in
//! [`Engine::build`](crate::Engine::build), route definitions, and the
//! [`Methods`] builder for binding several handlers to one route.
//!
//! Recording is deliberately infallible. A scope only collects templates,
//! names, and handlers; parsing, conflict detection, and method validation
//! all happen when the engine compiles, so every configuration mistake
//! surfaces from one place with the offending template attached.

mod core;

pub use core::{IntoRouteDef, Methods, RouteDef, Scope};

pub(crate) use core::Collected;
