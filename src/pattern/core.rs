use once_cell::sync::Lazy;
use regex::Regex;

use crate::converters::ConverterArgs;
use crate::error::ConfigError;

static IDENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex should be valid")
});

/// One parsed `{name:converter(args)}` reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamToken {
    pub name: String,
    pub converter: String,
    pub args: ConverterArgs,
}

/// Template syntax tree node. Optional groups nest.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(String),
    Param(ParamToken),
    Group(Vec<Node>),
}

/// One piece of an expanded variant: optional groups are gone, literals are
/// merged maximally.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Literal(String),
    Param(ParamToken),
}

/// Parses a composed route template into its syntax tree.
///
/// The template must already carry its submount prefix: validation (leading
/// `/`, no `//`, no `?`) applies to the full composed text.
pub fn parse_template(template: &str) -> Result<Vec<Node>, ConfigError> {
    if !template.starts_with('/') {
        return Err(malformed(template, "must start with '/'"));
    }

    let chars: Vec<char> = template.chars().collect();
    // stack of group bodies; the bottom entry is the template itself
    let mut stack: Vec<Vec<Node>> = vec![Vec::new()];
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '?' => {
                return Err(malformed(
                    template,
                    "query strings cannot appear in route templates",
                ));
            }
            '{' => {
                flush_literal(&mut literal, &mut stack);
                let (spec, end) = scan_param_spec(&chars, i + 1)
                    .ok_or_else(|| malformed(template, "unterminated '{'"))?;
                let param = parse_param_spec(template, &spec)?;
                push_node(&mut stack, Node::Param(param));
                i = end;
            }
            '}' => {
                return Err(malformed(template, "'}' without matching '{'"));
            }
            '[' => {
                flush_literal(&mut literal, &mut stack);
                stack.push(Vec::new());
                i += 1;
            }
            ']' => {
                flush_literal(&mut literal, &mut stack);
                if stack.len() < 2 {
                    return Err(malformed(template, "']' without matching '['"));
                }
                let group = stack.pop().unwrap_or_default();
                if group.is_empty() {
                    return Err(malformed(template, "empty optional group"));
                }
                push_node(&mut stack, Node::Group(group));
                i += 1;
            }
            c => {
                literal.push(c);
                i += 1;
            }
        }
    }

    flush_literal(&mut literal, &mut stack);
    if stack.len() != 1 {
        return Err(malformed(template, "unterminated '['"));
    }
    Ok(stack.pop().unwrap_or_default())
}

/// Expands optional groups into concrete variants.
///
/// Variants appear with each group absent before present, so the first
/// variant is the fully bare one; that order is also the order the reverse
/// builder tries candidates in.
pub fn expand(nodes: &[Node]) -> Vec<Vec<Token>> {
    let mut variants: Vec<Vec<Token>> = vec![Vec::new()];
    for node in nodes {
        match node {
            Node::Literal(text) => {
                for variant in &mut variants {
                    push_literal_token(variant, text);
                }
            }
            Node::Param(param) => {
                for variant in &mut variants {
                    variant.push(Token::Param(param.clone()));
                }
            }
            Node::Group(inner) => {
                let expansions = expand(inner);
                let mut present = Vec::with_capacity(variants.len() * expansions.len());
                for base in &variants {
                    for extension in &expansions {
                        let mut variant = base.clone();
                        for token in extension {
                            match token {
                                Token::Literal(text) => push_literal_token(&mut variant, text),
                                Token::Param(_) => variant.push(token.clone()),
                            }
                        }
                        present.push(variant);
                    }
                }
                variants.extend(present);
            }
        }
    }
    variants
}

/// Renders a variant back to template text, parameters included.
pub fn variant_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Param(param) => {
                out.push('{');
                out.push_str(&param.name);
                if param.converter != "string" || !param.args.is_empty() {
                    out.push(':');
                    out.push_str(&param.converter);
                }
                out.push('}');
            }
        }
    }
    out
}

/// Derives a route name from the first template when none was given.
///
/// Parameters contribute nothing; the remaining literal words join in camel
/// case (`/do-something` becomes `doSomething`). The bare root template gets
/// the name `root`. Returns `None` when no words remain.
#[must_use]
pub fn guess_name(template: &str) -> Option<String> {
    if template == "/" {
        return Some("root".to_owned());
    }

    let chars: Vec<char> = template.chars().collect();
    let mut literal = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '{' => match scan_param_spec(&chars, i + 1) {
                Some((_, end)) => i = end,
                None => return None,
            },
            '[' | ']' => i += 1,
            c => {
                literal.push(c);
                i += 1;
            }
        }
    }

    let mut name = String::new();
    for word in literal.split(|c: char| !c.is_alphanumeric()) {
        if word.is_empty() {
            continue;
        }
        if name.is_empty() {
            name.push_str(word);
        } else {
            let mut word_chars = word.chars();
            if let Some(first) = word_chars.next() {
                name.extend(first.to_uppercase());
                name.push_str(word_chars.as_str());
            }
        }
    }

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn malformed(template: &str, reason: &str) -> ConfigError {
    ConfigError::MalformedTemplate {
        template: template.to_owned(),
        reason: reason.to_owned(),
    }
}

fn flush_literal(literal: &mut String, stack: &mut Vec<Vec<Node>>) {
    if !literal.is_empty() {
        push_node(stack, Node::Literal(std::mem::take(literal)));
    }
}

fn push_node(stack: &mut [Vec<Node>], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.push(node);
    }
}

fn push_literal_token(variant: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(existing)) = variant.last_mut() {
        existing.push_str(text);
    } else {
        variant.push(Token::Literal(text.to_owned()));
    }
}

/// Scans a parameter spec starting just after `{`, honoring quotes and the
/// braces of an inline options object. Returns the spec text and the index
/// past the closing `}`.
fn scan_param_spec(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut spec = String::new();
    let mut brace_depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
        } else {
            match c {
                '\'' | '"' => quote = Some(c),
                '{' => brace_depth += 1,
                '}' => {
                    if brace_depth == 0 {
                        return Some((spec, i + 1));
                    }
                    brace_depth -= 1;
                }
                _ => {}
            }
        }
        spec.push(c);
        i += 1;
    }
    None
}

fn parse_param_spec(template: &str, spec: &str) -> Result<ParamToken, ConfigError> {
    let (name, converter_spec) = match spec.find(':') {
        Some(pos) => (&spec[..pos], Some(&spec[pos + 1..])),
        None => (spec, None),
    };

    if !IDENT_REGEX.is_match(name) {
        return Err(malformed(
            template,
            &format!("invalid parameter name '{name}'"),
        ));
    }

    let (converter, args) = match converter_spec {
        None => ("string".to_owned(), ConverterArgs::empty()),
        Some(rest) => match rest.find('(') {
            None => {
                if !IDENT_REGEX.is_match(rest) {
                    return Err(malformed(
                        template,
                        &format!("invalid converter reference '{rest}'"),
                    ));
                }
                (rest.to_owned(), ConverterArgs::empty())
            }
            Some(open) => {
                if !rest.ends_with(')') || open == 0 {
                    return Err(malformed(
                        template,
                        &format!("invalid converter reference '{rest}'"),
                    ));
                }
                let converter = &rest[..open];
                if !IDENT_REGEX.is_match(converter) {
                    return Err(malformed(
                        template,
                        &format!("invalid converter reference '{rest}'"),
                    ));
                }
                let inner = &rest[open + 1..rest.len() - 1];
                let args = ConverterArgs::parse(inner).map_err(|reason| {
                    ConfigError::InvalidConverterArgs {
                        converter: converter.to_owned(),
                        reason,
                    }
                })?;
                (converter.to_owned(), args)
            }
        },
    };

    Ok(ParamToken {
        name: name.to_owned(),
        converter,
        args,
    })
}
