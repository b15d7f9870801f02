//! Built-in converters: `int`, `string`, `path`, and `any`.
//!
//! The factories are public so custom configurations can re-register a
//! built-in under another name, optionally with different defaults baked into
//! the template arguments.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use super::args::ConverterArgs;
use super::core::{Converter, ConverterFactory};
use crate::error::ConversionError;

/// Shared instance backing every bare `{name}` parameter.
static DEFAULT_STRING: Lazy<Arc<dyn Converter>> =
    Lazy::new(|| Arc::new(StringConverter::with_options(TextOptions::default())));

/// Factory for the `int` converter.
///
/// Options: `min`, `max` (inclusive bounds checked after capture) and
/// `fixedDigits` (exact digit count baked into the pattern).
#[must_use]
pub fn int_factory() -> ConverterFactory {
    Arc::new(|args: &ConverterArgs| {
        args.ensure_no_positional()?;
        args.ensure_known_options(&["min", "max", "fixedDigits"])?;
        let min = args.i64_opt("min")?;
        let max = args.i64_opt("max")?;
        let fixed_digits = args.usize_opt("fixedDigits")?;
        if let Some(digits) = fixed_digits {
            if digits == 0 || digits > 18 {
                return Err(format!("fixedDigits must be between 1 and 18, got {digits}"));
            }
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(format!("min ({lo}) exceeds max ({hi})"));
            }
        }
        Ok(Arc::new(IntConverter::new(min, max, fixed_digits)) as Arc<dyn Converter>)
    })
}

/// Factory for the `string` converter, the default for bare `{name}`
/// parameters.
///
/// Options: `minLength`, `maxLength` (segment length bounds baked into the
/// pattern), `allowUpperCase` and `allowNonASCII` (character class widening).
#[must_use]
pub fn string_factory() -> ConverterFactory {
    Arc::new(|args: &ConverterArgs| {
        if args.is_empty() {
            return Ok(Arc::clone(&DEFAULT_STRING));
        }
        let options = TextOptions::from_args(args)?;
        Ok(Arc::new(StringConverter::with_options(options)) as Arc<dyn Converter>)
    })
}

/// Factory for the `path` converter: like `string`, but spanning any number
/// of segments. Length bounds apply to the whole value, separators included.
#[must_use]
pub fn path_factory() -> ConverterFactory {
    Arc::new(|args: &ConverterArgs| {
        let options = TextOptions::from_args(args)?;
        Ok(Arc::new(PathConverter::with_options(options)) as Arc<dyn Converter>)
    })
}

/// Factory for the `any` converter: a case-sensitive choice between literal
/// alternatives, given positionally as strings.
#[must_use]
pub fn any_factory() -> ConverterFactory {
    Arc::new(|args: &ConverterArgs| {
        args.ensure_no_options()?;
        let alternatives = args.positional_strings()?;
        if alternatives.is_empty() {
            return Err("at least one alternative is required".to_owned());
        }
        Ok(Arc::new(AnyConverter::new(alternatives)) as Arc<dyn Converter>)
    })
}

/// Options shared by the text-shaped converters.
#[derive(Debug, Clone, Copy, Default)]
struct TextOptions {
    min_length: Option<usize>,
    max_length: Option<usize>,
    allow_upper_case: bool,
    allow_non_ascii: bool,
}

impl TextOptions {
    fn from_args(args: &ConverterArgs) -> Result<Self, String> {
        args.ensure_no_positional()?;
        args.ensure_known_options(&[
            "minLength",
            "maxLength",
            "allowUpperCase",
            "allowNonASCII",
        ])?;
        let options = Self {
            min_length: args.usize_opt("minLength")?,
            max_length: args.usize_opt("maxLength")?,
            allow_upper_case: args.bool_opt("allowUpperCase")?,
            allow_non_ascii: args.bool_opt("allowNonASCII")?,
        };
        if let (Some(lo), Some(hi)) = (options.min_length, options.max_length) {
            if lo > hi {
                return Err(format!("minLength ({lo}) exceeds maxLength ({hi})"));
            }
        }
        Ok(options)
    }

    /// Character class for one segment character, case-exact form.
    fn segment_class(self) -> &'static str {
        match (self.allow_non_ascii, self.allow_upper_case) {
            (false, false) => "[[:ascii:]&&[^/A-Z]]",
            (false, true) => "[[:ascii:]&&[^/]]",
            (true, false) => "[^/\\p{Lu}]",
            (true, true) => "[^/]",
        }
    }

    /// Character class with the uppercase restriction lifted, for the
    /// canonicalizing pass. `None` when the exact class already admits
    /// uppercase.
    fn relaxed_segment_class(self) -> Option<&'static str> {
        if self.allow_upper_case {
            return None;
        }
        Some(if self.allow_non_ascii {
            "[^/]"
        } else {
            "[[:ascii:]&&[^/]]"
        })
    }

    fn repetition(self) -> String {
        match (self.min_length, self.max_length) {
            (None, None) => "+".to_owned(),
            (Some(lo), None) => format!("{{{lo},}}"),
            (None, Some(hi)) => format!("{{1,{hi}}}"),
            (Some(lo), Some(hi)) => format!("{{{lo},{hi}}}"),
        }
    }

    fn check_length(self, text: &str) -> Result<(), ConversionError> {
        let len = text.chars().count();
        if let Some(lo) = self.min_length {
            if len < lo {
                return Err(ConversionError::new(format!(
                    "value is {len} character(s), minimum is {lo}"
                )));
            }
        }
        if let Some(hi) = self.max_length {
            if len > hi {
                return Err(ConversionError::new(format!(
                    "value is {len} character(s), maximum is {hi}"
                )));
            }
        }
        Ok(())
    }

    fn check_charset(self, text: &str) -> Result<(), ConversionError> {
        if !self.allow_non_ascii && !text.is_ascii() {
            return Err(ConversionError::new("value contains non-ASCII characters"));
        }
        Ok(())
    }

    fn fold(self, text: String) -> String {
        if self.allow_upper_case {
            text
        } else {
            text.to_lowercase()
        }
    }

    fn describe_into(self, map: &mut Map<String, Value>) {
        if let Some(lo) = self.min_length {
            map.insert("minLength".to_owned(), lo.into());
        }
        if let Some(hi) = self.max_length {
            map.insert("maxLength".to_owned(), hi.into());
        }
        if self.allow_upper_case {
            map.insert("allowUpperCase".to_owned(), true.into());
        }
        if self.allow_non_ascii {
            map.insert("allowNonASCII".to_owned(), true.into());
        }
    }
}

/// Accepts text or numbers for string-shaped parameters.
fn stringify(value: &Value) -> Result<String, ConversionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ConversionError::new(format!(
            "expected a string-like value, got {other}"
        ))),
    }
}

struct IntConverter {
    min: Option<i64>,
    max: Option<i64>,
    fixed_digits: Option<usize>,
    pattern: String,
}

impl IntConverter {
    fn new(min: Option<i64>, max: Option<i64>, fixed_digits: Option<usize>) -> Self {
        let pattern = match fixed_digits {
            Some(digits) => format!("[0-9]{{{digits}}}"),
            None => "[0-9]+".to_owned(),
        };
        Self {
            min,
            max,
            fixed_digits,
            pattern,
        }
    }

    fn check_bounds(&self, n: i64) -> Result<(), ConversionError> {
        if let Some(lo) = self.min {
            if n < lo {
                return Err(ConversionError::new(format!("{n} is below the minimum {lo}")));
            }
        }
        if let Some(hi) = self.max {
            if n > hi {
                return Err(ConversionError::new(format!("{n} is above the maximum {hi}")));
            }
        }
        Ok(())
    }
}

impl Converter for IntConverter {
    fn pattern(&self) -> &str {
        &self.pattern
    }

    fn from_url(&self, raw: &str) -> Result<Value, ConversionError> {
        let n: i64 = raw
            .parse()
            .map_err(|_| ConversionError::new(format!("'{raw}' overflows an integer")))?;
        self.check_bounds(n)?;
        Ok(Value::Number(n.into()))
    }

    fn to_url(&self, value: &Value) -> Result<String, ConversionError> {
        let n = match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| ConversionError::new(format!("expected an integer, got {n}")))?,
            Value::String(s) => s
                .parse()
                .map_err(|_| ConversionError::new(format!("'{s}' is not an integer")))?,
            other => {
                return Err(ConversionError::new(format!(
                    "expected an integer, got {other}"
                )))
            }
        };
        if n < 0 {
            return Err(ConversionError::new(format!(
                "negative integer {n} cannot appear in a URL"
            )));
        }
        self.check_bounds(n)?;
        let text = n.to_string();
        match self.fixed_digits {
            Some(digits) if text.len() > digits => Err(ConversionError::new(format!(
                "{n} does not fit in {digits} digit(s)"
            ))),
            Some(digits) => Ok(format!("{:0>width$}", text, width = digits)),
            None => Ok(text),
        }
    }

    fn describe(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_owned(), "int".into());
        if let Some(lo) = self.min {
            map.insert("min".to_owned(), lo.into());
        }
        if let Some(hi) = self.max {
            map.insert("max".to_owned(), hi.into());
        }
        if let Some(digits) = self.fixed_digits {
            map.insert("fixedDigits".to_owned(), digits.into());
        }
        Value::Object(map)
    }
}

struct StringConverter {
    options: TextOptions,
    pattern: String,
    relaxed: Option<String>,
}

impl StringConverter {
    fn with_options(options: TextOptions) -> Self {
        let repetition = options.repetition();
        let pattern = format!("{}{repetition}", options.segment_class());
        let relaxed = options
            .relaxed_segment_class()
            .map(|class| format!("{class}{repetition}"));
        Self {
            options,
            pattern,
            relaxed,
        }
    }
}

impl Converter for StringConverter {
    fn pattern(&self) -> &str {
        &self.pattern
    }

    fn relaxed_pattern(&self) -> Option<&str> {
        self.relaxed.as_deref()
    }

    fn from_url(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::String(raw.to_owned()))
    }

    fn to_url(&self, value: &Value) -> Result<String, ConversionError> {
        let text = stringify(value)?;
        if text.contains('/') {
            return Err(ConversionError::new(
                "value must stay within a single path segment",
            ));
        }
        self.options.check_charset(&text)?;
        let text = self.options.fold(text);
        self.options.check_length(&text)?;
        Ok(text)
    }

    fn canonical_text(&self, raw: &str) -> String {
        self.options.fold(raw.to_owned())
    }

    fn describe(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_owned(), "string".into());
        self.options.describe_into(&mut map);
        Value::Object(map)
    }
}

struct PathConverter {
    options: TextOptions,
    pattern: String,
    relaxed: Option<String>,
}

impl PathConverter {
    fn with_options(options: TextOptions) -> Self {
        // Length bounds are enforced on the whole value in from_url; the
        // pattern itself never consumes a trailing separator.
        let class = options.segment_class();
        let pattern = format!("{class}+(?:/{class}+)*");
        let relaxed = options
            .relaxed_segment_class()
            .map(|class| format!("{class}+(?:/{class}+)*"));
        Self {
            options,
            pattern,
            relaxed,
        }
    }
}

impl Converter for PathConverter {
    fn pattern(&self) -> &str {
        &self.pattern
    }

    fn relaxed_pattern(&self) -> Option<&str> {
        self.relaxed.as_deref()
    }

    fn spans_segments(&self) -> bool {
        true
    }

    fn from_url(&self, raw: &str) -> Result<Value, ConversionError> {
        self.options.check_length(raw)?;
        Ok(Value::String(raw.to_owned()))
    }

    fn to_url(&self, value: &Value) -> Result<String, ConversionError> {
        let text = stringify(value)?;
        if text.is_empty()
            || text.starts_with('/')
            || text.ends_with('/')
            || text.contains("//")
        {
            return Err(ConversionError::new(
                "value must be one or more non-empty segments separated by '/'",
            ));
        }
        self.options.check_charset(&text)?;
        let text = self.options.fold(text);
        self.options.check_length(&text)?;
        Ok(text)
    }

    fn canonical_text(&self, raw: &str) -> String {
        self.options.fold(raw.to_owned())
    }

    fn describe(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_owned(), "path".into());
        self.options.describe_into(&mut map);
        Value::Object(map)
    }
}

struct AnyConverter {
    alternatives: Vec<String>,
    pattern: String,
}

impl AnyConverter {
    fn new(alternatives: Vec<String>) -> Self {
        let pattern = alternatives
            .iter()
            .map(|alt| regex::escape(alt))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            alternatives,
            pattern,
        }
    }
}

impl Converter for AnyConverter {
    fn pattern(&self) -> &str {
        &self.pattern
    }

    fn from_url(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::String(raw.to_owned()))
    }

    fn to_url(&self, value: &Value) -> Result<String, ConversionError> {
        let text = stringify(value)?;
        if self.alternatives.iter().any(|alt| *alt == text) {
            Ok(text)
        } else {
            Err(ConversionError::new(format!(
                "'{text}' is not one of the allowed alternatives"
            )))
        }
    }

    fn describe(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_owned(), "any".into());
        Value::Object(map)
    }
}
