//! Error types for registration, matching, and URL building.
//!
//! Registration problems are programmer errors and surface as [`ConfigError`]
//! from engine construction, before any request is served. Conversion
//! failures during matching are not errors in that sense: a [`ConversionError`]
//! only eliminates one route candidate and the search moves on. Reverse URL
//! building reports [`BuildError`]. Handler errors are opaque to the engine
//! and travel as `anyhow::Error`.

use std::fmt;

/// A problem detected while registering routes.
///
/// Every variant is fatal to engine construction: the route table is either
/// built whole or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The template text itself is unacceptable.
    MalformedTemplate { template: String, reason: String },
    /// A parameter referenced a converter name with no registered factory.
    UnknownConverter { template: String, converter: String },
    /// A converter factory rejected its inline arguments.
    InvalidConverterArgs { converter: String, reason: String },
    /// The same parameter name appeared twice in one variant.
    DuplicateParam { template: String, param: String },
    /// No explicit name was given and the template has no literal text to
    /// derive one from.
    CannotGuessName { template: String },
    /// Two routes resolved to the same name.
    DuplicateRouteName { name: String },
    /// A variant is indistinguishable from one registered earlier.
    AmbiguousRoute { template: String, existing: String },
    /// A method key could not be parsed.
    InvalidMethod { method: String },
    /// The same method was bound twice on one route.
    DuplicateMethod { template: String, method: String },
    /// A converter produced a regex fragment that failed to compile.
    InvalidPattern { template: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MalformedTemplate { template, reason } => {
                write!(f, "malformed route template '{template}': {reason}")
            }
            ConfigError::UnknownConverter {
                template,
                converter,
            } => {
                write!(f, "unknown converter '{converter}' in template '{template}'")
            }
            ConfigError::InvalidConverterArgs { converter, reason } => {
                write!(f, "invalid arguments for converter '{converter}': {reason}")
            }
            ConfigError::DuplicateParam { template, param } => {
                write!(f, "duplicate parameter '{param}' in template '{template}'")
            }
            ConfigError::CannotGuessName { template } => {
                write!(
                    f,
                    "cannot derive a route name from template '{template}', provide one explicitly"
                )
            }
            ConfigError::DuplicateRouteName { name } => {
                write!(f, "route name '{name}' is already registered")
            }
            ConfigError::AmbiguousRoute { template, existing } => {
                write!(
                    f,
                    "template '{template}' is indistinguishable from existing route '{existing}'"
                )
            }
            ConfigError::InvalidMethod { method } => {
                write!(f, "invalid HTTP method '{method}'")
            }
            ConfigError::DuplicateMethod { template, method } => {
                write!(f, "method '{method}' bound twice for template '{template}'")
            }
            ConfigError::InvalidPattern { template, reason } => {
                write!(f, "pattern for template '{template}' failed to compile: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A converter rejected a captured path value.
///
/// Raised by [`crate::converters::Converter::from_url`] when the regex
/// matched but the value fails semantic checks (an integer out of range, a
/// path value outside its length bounds). The matcher treats it as "this
/// candidate does not apply" and keeps searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    message: String,
}

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conversion failed: {}", self.message)
    }
}

impl std::error::Error for ConversionError {}

/// A reverse URL could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No route is registered under the requested name.
    UnknownRoute { name: String },
    /// A named argument required by every candidate variant was absent.
    MissingParam { route: String, param: String },
    /// A named argument matches no parameter of any variant.
    UnexpectedParam { route: String, param: String },
    /// Positional arguments fit none of the variants.
    ArityMismatch {
        route: String,
        expected: usize,
        got: usize,
    },
    /// A converter rejected the supplied value.
    InvalidValue {
        route: String,
        param: String,
        reason: String,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::UnknownRoute { name } => {
                write!(f, "no route named '{name}'")
            }
            BuildError::MissingParam { route, param } => {
                write!(f, "route '{route}' requires parameter '{param}'")
            }
            BuildError::UnexpectedParam { route, param } => {
                write!(f, "route '{route}' has no parameter '{param}'")
            }
            BuildError::ArityMismatch {
                route,
                expected,
                got,
            } => {
                write!(
                    f,
                    "route '{route}' takes {expected} positional argument(s), got {got}"
                )
            }
            BuildError::InvalidValue {
                route,
                param,
                reason,
            } => {
                write!(f, "invalid value for '{param}' of route '{route}': {reason}")
            }
        }
    }
}

impl std::error::Error for BuildError {}
