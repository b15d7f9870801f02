//! Inline converter arguments.
//!
//! Template parameters carry their converter configuration inline, in a
//! JavaScript-flavored literal syntax: `{id:int({min: 1, max: 99})}`,
//! `{value:any('alpha', 'bravo')}`. The parser accepts a comma-separated
//! mix of scalars and at most one `{key: value}` options object. Scalars
//! land in the positional list, object entries in the named map. String
//! literals take single or double quotes with no escape sequences.

use serde_json::{Map, Value};

/// Parsed converter arguments, handed to the converter factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConverterArgs {
    positional: Vec<Value>,
    named: Map<String, Value>,
}

impl ConverterArgs {
    /// Arguments for a bare converter reference like `{name:int}`.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses the text between the parentheses of a converter reference.
    ///
    /// Errors carry a human-readable reason; the caller attaches the
    /// converter name.
    pub fn parse(src: &str) -> Result<Self, String> {
        Parser::new(src).parse_args()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.named.get(key)
    }

    /// Integer option, `Ok(None)` when absent.
    pub fn i64_opt(&self, key: &str) -> Result<Option<i64>, String> {
        match self.named.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| format!("option '{key}' must be an integer")),
            Some(other) => Err(format!("option '{key}' must be an integer, got {other}")),
        }
    }

    /// Non-negative integer option, `Ok(None)` when absent.
    pub fn usize_opt(&self, key: &str) -> Result<Option<usize>, String> {
        match self.i64_opt(key)? {
            None => Ok(None),
            Some(n) if n >= 0 => Ok(Some(n as usize)),
            Some(n) => Err(format!("option '{key}' must not be negative, got {n}")),
        }
    }

    /// Boolean option, defaulting to `false` when absent.
    pub fn bool_opt(&self, key: &str) -> Result<bool, String> {
        match self.named.get(key) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(format!("option '{key}' must be a boolean, got {other}")),
        }
    }

    /// Rejects any option key outside `allowed`.
    pub fn ensure_known_options(&self, allowed: &[&str]) -> Result<(), String> {
        for key in self.named.keys() {
            if !allowed.contains(&key.as_str()) {
                return Err(format!("unknown option '{key}'"));
            }
        }
        Ok(())
    }

    /// Rejects positional arguments outright.
    pub fn ensure_no_positional(&self) -> Result<(), String> {
        if self.positional.is_empty() {
            Ok(())
        } else {
            Err("positional arguments are not accepted".to_owned())
        }
    }

    /// Rejects an options object outright.
    pub fn ensure_no_options(&self) -> Result<(), String> {
        if self.named.is_empty() {
            Ok(())
        } else {
            Err("options are not accepted".to_owned())
        }
    }

    /// All positional arguments, required to be strings.
    pub fn positional_strings(&self) -> Result<Vec<String>, String> {
        self.positional
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.clone()),
                other => Err(format!("expected a string argument, got {other}")),
            })
            .collect()
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn parse_args(mut self) -> Result<ConverterArgs, String> {
        let mut args = ConverterArgs::default();
        self.skip_ws();
        if self.peek().is_none() {
            return Ok(args);
        }
        loop {
            match self.parse_value()? {
                Value::Object(map) => {
                    if !args.named.is_empty() {
                        return Err("at most one options object is accepted".to_owned());
                    }
                    args.named = map;
                }
                scalar => args.positional.push(scalar),
            }
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.bump();
                    self.skip_ws();
                }
                Some(c) => return Err(format!("unexpected character '{c}'")),
            }
        }
        Ok(args)
    }

    fn parse_value(&mut self) -> Result<Value, String> {
        match self.peek() {
            Some('{') => self.parse_object().map(Value::Object),
            Some(q @ ('\'' | '"')) => self.parse_string(q).map(Value::String),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => match self.parse_ident().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                other => Err(format!("unexpected identifier '{other}'")),
            },
            Some(c) => Err(format!("unexpected character '{c}'")),
            None => Err("expected a value".to_owned()),
        }
    }

    fn parse_object(&mut self) -> Result<Map<String, Value>, String> {
        self.bump();
        self.skip_ws();
        let mut map = Map::new();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(map);
        }
        loop {
            let key = match self.peek() {
                Some(q @ ('\'' | '"')) => self.parse_string(q)?,
                Some(c) if c.is_ascii_alphabetic() || c == '_' => self.parse_ident(),
                Some(c) => return Err(format!("expected an option name, got '{c}'")),
                None => return Err("unterminated options object".to_owned()),
            };
            self.skip_ws();
            if self.bump() != Some(':') {
                return Err(format!("expected ':' after option '{key}'"));
            }
            self.skip_ws();
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.bump() {
                Some(',') => self.skip_ws(),
                Some('}') => break,
                _ => return Err("unterminated options object".to_owned()),
            }
        }
        Ok(map)
    }

    fn parse_string(&mut self, quote: char) -> Result<String, String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err("unterminated string literal".to_owned()),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, String> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Number(n.into()));
        }
        let f: f64 = text
            .parse()
            .map_err(|_| format!("invalid number '{text}'"))?;
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| format!("invalid number '{text}'"))
    }

    fn parse_ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }
}
