//! # Waymark
//!
//! A URL routing and dispatch engine. Routes are declared with typed
//! template parameters, compiled once into an immutable table, and served
//! lock-free from any number of threads: forward matching with canonical-URL
//! redirects, per-method handler dispatch, and reverse URL building all come
//! from the same compiled table.
//!
//! ## Overview
//!
//! Templates look like `/posts/{id:int}` or `/files/{name:path}`. Each
//! parameter names a converter that contributes a regex fragment at compile
//! time and converts matched text to a typed value at request time. Optional
//! groups (`/posts[/{page:int}]`) expand into variants of one route, and
//! submounts compose nested prefixes without re-parsing.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`converters`]** - parameter types: `int`, `string`, `path`, `any`,
//!   plus custom factories registered through [`Config`]
//! - **[`router`]** - compiled route table, specificity ranking, and the
//!   resolution passes that produce matches and redirects
//! - **[`scope`]** - registration surface: method shorthands, named routes,
//!   and nested submounts
//! - **[`dispatcher`]** - request/response types, handler traits, and the
//!   per-route method tables
//! - **[`urls`]** - reverse routing from route names and arguments back to
//!   encoded paths
//! - **[`error`]** - configuration, conversion, and URL-building errors
//!
//! ### Request Flow
//!
//! ```mermaid
//! graph LR
//!     A[Scope registration] --> B[TableBuilder]
//!     B --> C[RouteTable]
//!     C --> D[dispatch]
//!     C --> E[UrlMap]
//!     D --> F[Handler]
//!     D --> G[301 / 404 / 405]
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use http::StatusCode;
//! use waymark::{respond, Context, Engine, Request, Response};
//!
//! fn main() -> anyhow::Result<()> {
//!     let engine = Engine::build(|root| {
//!         root.get("/posts", |_cx: &Context| {
//!             respond(Response::text(StatusCode::OK, "all posts"))
//!         });
//!         root.get(("show_post", "/posts/{id:int}"), |cx: &Context| {
//!             let id = cx.param_i64("id").unwrap_or(0);
//!             respond(Response::text(StatusCode::OK, format!("post {id}")))
//!         });
//!         root.submount("/api", |api| {
//!             api.get("/health", |_cx: &Context| {
//!                 respond(Response::text(StatusCode::OK, "ok"))
//!             });
//!         });
//!     })?;
//!
//!     let response = engine.respond(&Request::get("/posts/7"))?;
//!     assert_eq!(response.status, StatusCode::OK);
//!
//!     // Reverse routing from the same table.
//!     assert_eq!(engine.url("show_post", 7)?, "/posts/7");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - Typed path parameters with per-parameter validation and conversion
//! - Specificity-ranked matching independent of registration order
//! - Canonical 301 redirects for trailing-slash and letter-case variants
//! - Automatic `OPTIONS` and `405` responses with `Allow` headers
//! - `HEAD` falling back to `GET` handlers
//! - Reverse URL building with positional or named arguments
//! - Route descriptions as plain data via [`Engine::serialize`]

pub mod converters;
pub mod dispatcher;
mod encoding;
mod engine;
pub mod error;
mod pattern;
pub mod router;
pub mod scope;
pub mod urls;

pub use converters::{
    any_factory, int_factory, path_factory, string_factory, Converter, ConverterArgs,
    ConverterFactory, ConverterRegistry,
};
pub use dispatcher::{
    next, respond, Context, Dispatch, Flow, Handler, HandlerResult, HeaderVec, Request, Response,
};
pub use engine::{Config, Engine, EngineBuilder};
pub use error::{BuildError, ConfigError, ConversionError};
pub use router::ParamVec;
pub use scope::{IntoRouteDef, Methods, RouteDef, Scope};
pub use urls::{UrlArgs, UrlMap};
