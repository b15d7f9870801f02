//! # Converters Module
//!
//! Converters give template parameters their types. Each `{name:conv(args)}`
//! parameter is backed by a [`Converter`] instance that contributes a regex
//! fragment to the compiled route pattern, turns matched URL text into a
//! typed `serde_json::Value`, and renders values back into URL text for
//! reverse building.
//!
//! ## Overview
//!
//! - [`Converter`] — the per-parameter conversion contract
//! - [`ConverterRegistry`] — named factories resolved at registration time
//! - [`ConverterArgs`] — parsed inline arguments (`{min: 1}`, `'alpha'`)
//! - built-in factories: [`int_factory`], [`string_factory`],
//!   [`path_factory`], [`any_factory`]
//!
//! ## Case folding
//!
//! A converter that folds case ([`Converter::relaxed_pattern`] returns
//! `Some`) participates in canonicalizing redirects: requests that differ
//! from the canonical spelling only by letter case are answered with a `301`
//! instead of a match. Converters without a relaxed pattern (`int`, `any`,
//! custom ones by default) are strictly case-sensitive and off-case requests
//! fall through to the next candidate.
//!
//! ## Example
//!
//! ```rust,ignore
//! use waymark::{Config, Engine};
//! use waymark::converters::string_factory;
//!
//! // Re-register the built-in string converter under a custom name.
//! let config = Config::new().converter("slug", string_factory());
//! let engine = Engine::with_config(config, |routes| {
//!     routes.get(("post", "/posts/{post:slug}"), |cx| { /* ... */ });
//! })?;
//! ```

mod args;
mod builtin;
mod core;
#[cfg(test)]
mod tests;

pub use args::ConverterArgs;
pub use builtin::{any_factory, int_factory, path_factory, string_factory};
pub use core::{Converter, ConverterFactory, ConverterRegistry};
