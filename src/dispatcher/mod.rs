//! # Dispatcher Module
//!
//! The dispatcher module defines the request/response types and the handler
//! seam for waymark. The engine resolves a path, selects the handler bound to
//! the request method, and hands it a borrowed [`Context`].
//!
//! ## Overview
//!
//! The dispatcher is responsible for:
//! - The [`Request`] and [`Response`] types the engine speaks
//! - The [`Handler`] trait and its closure blanket impl
//! - The per-route method tables, including the `Allow` header they produce
//! - The [`Context`] handlers receive: typed parameters, route name, URL
//!   builder, and sibling-handler forwarding
//!
//! ## Control flow
//!
//! Handlers return [`HandlerResult`]: [`Flow::Respond`] carries a response,
//! [`Flow::Next`] declines the request, and `Err` aborts dispatch with the
//! handler's error. A declined request falls through to the configured
//! not-found handler and then out of the engine as [`Dispatch::Forward`],
//! which embedding hosts treat as "keep going" and
//! [`Engine::respond`](crate::Engine::respond) turns into a plain 404.
//!
//! ## Example
//!
//! ```rust,ignore
//! use waymark::{respond, Context, Response};
//! use http::StatusCode;
//!
//! routes.get("/posts/{id:int}", |cx: &Context| {
//!     let id = cx.param_i64("id").unwrap_or_default();
//!     respond(Response::text(StatusCode::OK, format!("post {id}")))
//! });
//! ```

mod core;

pub use core::{
    next, respond, Context, Dispatch, Flow, Handler, HandlerResult, HeaderVec, Request, Response,
    MAX_INLINE_HEADERS,
};

pub(crate) use core::MethodTable;
