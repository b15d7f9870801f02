use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::args::ConverterArgs;
use super::builtin;
use crate::error::{ConfigError, ConversionError};

/// Converts one template parameter between its URL text and a typed value.
///
/// A converter instance is created once per parameter occurrence when the
/// route table is built and is then shared read-only across request threads,
/// so implementations must not carry interior mutability. Both directions may
/// run any number of times for the same input; they are expected to be pure.
///
/// # Example
///
/// ```
/// use serde_json::{json, Value};
/// use waymark::{ConversionError, Converter};
///
/// struct YesNo;
///
/// impl Converter for YesNo {
///     fn pattern(&self) -> &str {
///         "(?:yes|no)"
///     }
///
///     fn from_url(&self, raw: &str) -> Result<Value, ConversionError> {
///         Ok(Value::Bool(raw == "yes"))
///     }
///
///     fn to_url(&self, value: &Value) -> Result<String, ConversionError> {
///         match value {
///             Value::Bool(true) => Ok("yes".to_owned()),
///             Value::Bool(false) => Ok("no".to_owned()),
///             other => Err(ConversionError::new(format!("expected a boolean, got {other}"))),
///         }
///     }
///
///     fn describe(&self) -> Value {
///         json!({ "type": "bool" })
///     }
/// }
/// ```
pub trait Converter: Send + Sync {
    /// Regex fragment this parameter matches, without anchors.
    ///
    /// The fragment is wrapped in a capture group by the table builder, so it
    /// must not contain capturing groups of its own; use `(?:...)`.
    fn pattern(&self) -> &str;

    /// Case-relaxed variant of [`pattern`](Converter::pattern).
    ///
    /// `Some` declares that the converter folds case: the relaxed fragment is
    /// used by the canonicalizing pass, and an off-case hit redirects to the
    /// output of [`canonical_text`](Converter::canonical_text). `None` (the
    /// default) keeps the parameter strictly case-sensitive.
    fn relaxed_pattern(&self) -> Option<&str> {
        None
    }

    /// True when the pattern may consume `/` separators.
    fn spans_segments(&self) -> bool {
        false
    }

    /// Converts matched URL text into the typed parameter value.
    ///
    /// # Errors
    ///
    /// An error eliminates the route candidate; it is never reported to the
    /// client.
    fn from_url(&self, raw: &str) -> Result<Value, ConversionError>;

    /// Renders a typed value as URL text for reverse building.
    ///
    /// The output is percent-encoded by the caller, so implementations return
    /// plain text. Values that could not have matched the route in the first
    /// place are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error when the value is of the wrong type or outside the
    /// converter's configured bounds.
    fn to_url(&self, value: &Value) -> Result<String, ConversionError>;

    /// Canonical spelling for text accepted by the relaxed pattern.
    ///
    /// Only consulted when [`relaxed_pattern`](Converter::relaxed_pattern)
    /// returned `Some`.
    fn canonical_text(&self, raw: &str) -> String {
        raw.to_owned()
    }

    /// Introspection descriptor: a `{"type": ...}` object plus whatever
    /// configuration was supplied.
    fn describe(&self) -> Value;
}

impl std::fmt::Debug for dyn Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Converter").field(&self.describe()).finish()
    }
}

/// Builds a converter from inline template arguments.
///
/// The error string is a bare reason; the registry wraps it with the
/// converter name it was looked up under.
pub type ConverterFactory =
    Arc<dyn Fn(&ConverterArgs) -> Result<Arc<dyn Converter>, String> + Send + Sync>;

/// Named converter factories available to route templates.
///
/// Starts out with the built-ins (`int`, `string`, `path`, `any`); custom
/// factories are added through [`crate::Config`] and may shadow the
/// built-in names.
pub struct ConverterRegistry {
    factories: HashMap<String, ConverterFactory>,
}

impl ConverterRegistry {
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("int", builtin::int_factory());
        registry.register("string", builtin::string_factory());
        registry.register("path", builtin::path_factory());
        registry.register("any", builtin::any_factory());
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, factory: ConverterFactory) {
        self.factories.insert(name.into(), factory);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiates `name` with `args` for a parameter of `template`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownConverter`] when no factory is registered under
    /// `name`, [`ConfigError::InvalidConverterArgs`] when the factory rejects
    /// the arguments.
    pub fn create(
        &self,
        name: &str,
        args: &ConverterArgs,
        template: &str,
    ) -> Result<Arc<dyn Converter>, ConfigError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::UnknownConverter {
                template: template.to_owned(),
                converter: name.to_owned(),
            })?;
        factory(args).map_err(|reason| ConfigError::InvalidConverterArgs {
            converter: name.to_owned(),
            reason,
        })
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("converters", &names)
            .finish()
    }
}
