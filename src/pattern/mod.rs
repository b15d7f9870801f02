//! # Pattern Module
//!
//! Turns route template text into structure. A template is literal text
//! interrupted by `{name}` / `{name:converter(args)}` parameters and
//! `[...]` optional groups:
//!
//! ```text
//! /posts/{id:int({min: 1})}
//! /archive[/{year:int({fixedDigits: 4})}]
//! ```
//!
//! [`parse_template`] builds the syntax tree, [`expand`] multiplies the
//! optional groups out into concrete variants (bare variant first), and
//! [`guess_name`] derives a route name from the leading template's literal
//! text when the caller did not supply one. Everything here is pure syntax;
//! converter names are resolved against the registry later, when the route
//! table is compiled.

mod core;

pub use core::{expand, guess_name, parse_template, variant_text, Node, ParamToken, Token};
