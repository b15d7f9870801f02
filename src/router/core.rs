use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::debug;

use crate::converters::{Converter, ConverterRegistry};
use crate::encoding::{encode_path, percent_decode, sanitize_location};
use crate::error::{ConfigError, ConversionError};
use crate::pattern::{expand, parse_template, variant_text, Token};

/// Maximum number of path parameters stored inline without heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter vector to avoid heap allocations in the match
/// hot path. Values are typed by the converters that produced them.
pub type ParamVec = SmallVec<[(Arc<str>, Value); MAX_INLINE_PARAMS]>;

const RANK_LITERAL: u8 = 0;
const RANK_TYPED: u8 = 1;
const RANK_STRING: u8 = 2;
const RANK_PATH: u8 = 3;

/// One compiled piece of a variant: literal text (separators included) or a
/// converter-backed parameter.
#[derive(Clone)]
pub(crate) enum Seg {
    Literal(String),
    Param(ParamSpec),
}

/// A parameter occurrence inside one variant.
#[derive(Clone)]
pub(crate) struct ParamSpec {
    pub name: Arc<str>,
    pub converter: Arc<dyn Converter>,
    /// Cached `describe()` output; also feeds `serialize()`.
    pub descriptor: Value,
}

/// One matchable expansion of a route template.
pub(crate) struct Variant {
    pub route: usize,
    pub text: String,
    pub segs: Vec<Seg>,
    exact: Regex,
    relaxed: Option<Regex>,
    rank: Vec<u8>,
}

pub(crate) struct RouteEntry {
    pub name: String,
    /// Variant indexes in declaration order (template order, absent optional
    /// groups before present ones). The URL builder relies on this order.
    pub variant_ixs: Vec<usize>,
}

/// Outcome of path resolution, before any method handling.
pub(crate) enum Resolution {
    Match { route: usize, params: ParamVec },
    Redirect { location: String },
    NotFound,
}

/// Immutable compiled route table.
///
/// Built once, then shared read-only: resolution borrows `&self` and takes no
/// locks. Converters re-run on every request; there is deliberately no match
/// cache to synchronize.
pub(crate) struct RouteTable {
    routes: Vec<RouteEntry>,
    variants: Vec<Variant>,
    /// Variant indexes sorted by specificity, registration order breaking ties.
    match_order: Vec<usize>,
}

impl RouteTable {
    #[must_use]
    pub fn route(&self, ix: usize) -> &RouteEntry {
        &self.routes[ix]
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    #[must_use]
    pub fn variant(&self, ix: usize) -> &Variant {
        &self.variants[ix]
    }

    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Resolves a raw request path against the table.
    ///
    /// `raw_path` is the path exactly as received, percent-escapes intact and
    /// query string already split off. Resolution runs up to four passes:
    /// exact, case-relaxed, then both again with the trailing slash toggled.
    /// Only the exact pass produces a match; the others produce permanent
    /// redirects to the canonical URL, with `query` re-appended untouched.
    pub fn resolve(&self, raw_path: &str, query: Option<&str>) -> Resolution {
        if let Some(decoded) = percent_decode(raw_path) {
            if let Some((route, params)) = self.match_exact(&decoded) {
                return Resolution::Match { route, params };
            }
            if let Some(canonical) = self.match_relaxed(&decoded) {
                debug!(path = %raw_path, location = %canonical, "case canonicalization redirect");
                return Resolution::Redirect {
                    location: join_location(canonical, query),
                };
            }
        } else {
            debug!(path = %raw_path, "request path failed percent-decoding");
        }

        let toggled = toggle_trailing_slash(raw_path);
        if toggled != raw_path {
            if let Some(decoded) = percent_decode(&toggled) {
                if self.match_exact(&decoded).is_some() {
                    debug!(path = %raw_path, location = %toggled, "trailing slash redirect");
                    return Resolution::Redirect {
                        location: join_location(toggled, query),
                    };
                }
                if let Some(canonical) = self.match_relaxed(&decoded) {
                    debug!(path = %raw_path, location = %canonical, "slash and case redirect");
                    return Resolution::Redirect {
                        location: join_location(canonical, query),
                    };
                }
            }
        }

        Resolution::NotFound
    }

    fn match_exact(&self, path: &str) -> Option<(usize, ParamVec)> {
        for &ix in &self.match_order {
            let variant = &self.variants[ix];
            let Some(caps) = variant.exact.captures(path) else {
                continue;
            };
            match extract_params(variant, &caps) {
                Ok(params) => {
                    debug!(
                        path = %path,
                        route = %self.routes[variant.route].name,
                        template = %variant.text,
                        "matched route"
                    );
                    return Some((variant.route, params));
                }
                Err(err) => {
                    debug!(
                        path = %path,
                        template = %variant.text,
                        reason = %err,
                        "converter rejected candidate"
                    );
                }
            }
        }
        None
    }

    /// Case-relaxed pass. On a hit, renders the canonical percent-encoded
    /// path: literals in registration case, folding parameters folded.
    fn match_relaxed(&self, path: &str) -> Option<String> {
        'variants: for &ix in &self.match_order {
            let variant = &self.variants[ix];
            let Some(relaxed) = &variant.relaxed else {
                continue;
            };
            let Some(caps) = relaxed.captures(path) else {
                continue;
            };
            let mut canonical = String::new();
            let mut group = 1;
            for seg in &variant.segs {
                match seg {
                    Seg::Literal(text) => canonical.push_str(&encode_path(text)),
                    Seg::Param(spec) => {
                        let raw = caps.get(group).map_or("", |m| m.as_str());
                        let folded = spec.converter.canonical_text(raw);
                        if let Err(err) = spec.converter.from_url(&folded) {
                            debug!(
                                path = %path,
                                template = %variant.text,
                                reason = %err,
                                "converter rejected relaxed candidate"
                            );
                            continue 'variants;
                        }
                        canonical.push_str(&encode_path(&folded));
                        group += 1;
                    }
                }
            }
            return Some(canonical);
        }
        None
    }
}

fn extract_params(
    variant: &Variant,
    caps: &regex::Captures<'_>,
) -> Result<ParamVec, ConversionError> {
    let mut params = ParamVec::new();
    let mut group = 1;
    for seg in &variant.segs {
        if let Seg::Param(spec) = seg {
            let raw = caps.get(group).map_or("", |m| m.as_str());
            let value = spec.converter.from_url(raw)?;
            params.push((Arc::clone(&spec.name), value));
            group += 1;
        }
    }
    Ok(params)
}

fn join_location(base: String, query: Option<&str>) -> String {
    let candidate = match query {
        Some(q) => format!("{base}?{q}"),
        None => base,
    };
    sanitize_location(&candidate)
}

fn toggle_trailing_slash(path: &str) -> String {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_owned(),
        Some(_) => path.to_owned(),
        None => format!("{path}/"),
    }
}

/// Incrementally compiles registrations into a [`RouteTable`].
pub(crate) struct TableBuilder<'r> {
    registry: &'r ConverterRegistry,
    routes: Vec<RouteEntry>,
    variants: Vec<Variant>,
    keys: Vec<VariantKey>,
}

/// Identity of a variant for conflict detection: the literal skeleton plus
/// each parameter's compiled pattern and descriptor. Parameter names do not
/// participate.
#[derive(PartialEq)]
struct VariantKey {
    skeleton: Vec<Option<String>>,
    converters: Vec<(String, Value)>,
}

impl<'r> TableBuilder<'r> {
    pub fn new(registry: &'r ConverterRegistry) -> Self {
        Self {
            registry,
            routes: Vec::new(),
            variants: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// Compiles one route (all its templates and their expansions) and
    /// returns its index.
    pub fn add_route(
        &mut self,
        name: Option<String>,
        templates: &[String],
    ) -> Result<usize, ConfigError> {
        let first = templates
            .first()
            .ok_or_else(|| ConfigError::MalformedTemplate {
                template: String::new(),
                reason: "a route needs at least one template".to_owned(),
            })?;

        let mut parsed = Vec::new();
        for template in templates {
            let nodes = parse_template(template)?;
            for tokens in expand(&nodes) {
                parsed.push((template.as_str(), tokens));
            }
        }

        let name = match name {
            Some(name) => name,
            None => crate::pattern::guess_name(first).ok_or_else(|| {
                ConfigError::CannotGuessName {
                    template: first.clone(),
                }
            })?,
        };
        if self.routes.iter().any(|route| route.name == name) {
            return Err(ConfigError::DuplicateRouteName { name });
        }

        let route_ix = self.routes.len();
        let mut variant_ixs = Vec::with_capacity(parsed.len());
        for (template, tokens) in parsed {
            let ix = self.add_variant(route_ix, &name, template, &tokens)?;
            variant_ixs.push(ix);
        }

        self.routes.push(RouteEntry { name, variant_ixs });
        Ok(route_ix)
    }

    pub fn finish(self) -> RouteTable {
        let mut match_order: Vec<usize> = (0..self.variants.len()).collect();
        match_order.sort_by_key(|&ix| self.variants[ix].rank.clone());
        RouteTable {
            routes: self.routes,
            variants: self.variants,
            match_order,
        }
    }

    fn add_variant(
        &mut self,
        route: usize,
        route_name: &str,
        template: &str,
        tokens: &[Token],
    ) -> Result<usize, ConfigError> {
        let text = variant_text(tokens);

        let mut segs = Vec::with_capacity(tokens.len());
        let mut seen_params: HashSet<&str> = HashSet::new();
        for token in tokens {
            match token {
                Token::Literal(literal) => {
                    if literal.contains("//") {
                        return Err(ConfigError::MalformedTemplate {
                            template: template.to_owned(),
                            reason: "empty path segment ('//')".to_owned(),
                        });
                    }
                    segs.push(Seg::Literal(literal.clone()));
                }
                Token::Param(param) => {
                    if !seen_params.insert(param.name.as_str()) {
                        return Err(ConfigError::DuplicateParam {
                            template: template.to_owned(),
                            param: param.name.clone(),
                        });
                    }
                    let converter = self
                        .registry
                        .create(&param.converter, &param.args, template)?;
                    let descriptor = converter.describe();
                    segs.push(Seg::Param(ParamSpec {
                        name: Arc::from(param.name.as_str()),
                        converter,
                        descriptor,
                    }));
                }
            }
        }

        let key = variant_key(&segs);
        if let Some(pos) = self.keys.iter().position(|existing| *existing == key) {
            // The colliding variant may belong to the route currently being
            // added, which is not in `routes` yet.
            let existing = self
                .routes
                .get(self.variants[pos].route)
                .map_or_else(|| route_name.to_owned(), |route| route.name.clone());
            return Err(ConfigError::AmbiguousRoute {
                template: text,
                existing,
            });
        }

        let exact = compile_regex(&segs, template, false)?;
        let relaxed = if folds_case(&segs) {
            Some(compile_regex(&segs, template, true)?)
        } else {
            None
        };
        let rank = compute_rank(&segs);

        let ix = self.variants.len();
        self.variants.push(Variant {
            route,
            text,
            segs,
            exact,
            relaxed,
            rank,
        });
        self.keys.push(key);
        Ok(ix)
    }
}

fn variant_key(segs: &[Seg]) -> VariantKey {
    let skeleton = segs
        .iter()
        .map(|seg| match seg {
            Seg::Literal(text) => Some(text.clone()),
            Seg::Param(_) => None,
        })
        .collect();
    let converters = segs
        .iter()
        .filter_map(|seg| match seg {
            Seg::Literal(_) => None,
            Seg::Param(spec) => Some((
                spec.converter.pattern().to_owned(),
                spec.descriptor.clone(),
            )),
        })
        .collect();
    VariantKey {
        skeleton,
        converters,
    }
}

/// A variant participates in the relaxed pass when anything in it can differ
/// by case: a letter in a literal, or a parameter that declares a relaxed
/// pattern.
fn folds_case(segs: &[Seg]) -> bool {
    segs.iter().any(|seg| match seg {
        Seg::Literal(text) => text.chars().any(char::is_alphabetic),
        Seg::Param(spec) => spec.converter.relaxed_pattern().is_some(),
    })
}

/// Builds the anchored variant regex, one capture group per parameter.
///
/// The relaxed form wraps literals in `(?i:...)` and swaps in each folding
/// converter's relaxed fragment. Case-sensitive converters keep their exact
/// fragment even there; a global `(?i)` would also invert negated classes
/// like `[^/A-Z]`, which must stay case-sensitive.
fn compile_regex(segs: &[Seg], template: &str, relaxed: bool) -> Result<Regex, ConfigError> {
    let mut pattern = String::from("^");
    for seg in segs {
        match seg {
            Seg::Literal(text) => {
                let escaped = regex::escape(text);
                if relaxed {
                    pattern.push_str("(?i:");
                    pattern.push_str(&escaped);
                    pattern.push(')');
                } else {
                    pattern.push_str(&escaped);
                }
            }
            Seg::Param(spec) => {
                let fragment = if relaxed {
                    spec.converter
                        .relaxed_pattern()
                        .unwrap_or_else(|| spec.converter.pattern())
                } else {
                    spec.converter.pattern()
                };
                pattern.push('(');
                pattern.push_str(fragment);
                pattern.push(')');
            }
        }
    }
    pattern.push('$');
    Regex::new(&pattern).map_err(|err| ConfigError::InvalidPattern {
        template: template.to_owned(),
        reason: err.to_string(),
    })
}

fn param_rank(spec: &ParamSpec) -> u8 {
    if spec.converter.spans_segments() {
        RANK_PATH
    } else if spec.descriptor.get("type").and_then(Value::as_str) == Some("string") {
        RANK_STRING
    } else {
        RANK_TYPED
    }
}

/// Per-segment specificity vector, compared lexicographically: literal
/// segments match before typed converters, typed before default strings,
/// strings before segment-spanning paths. A segment mixing literal text and
/// parameters takes its loosest parameter's rank.
fn compute_rank(segs: &[Seg]) -> Vec<u8> {
    let mut ranks = Vec::new();
    let mut current: Option<u8> = None;
    for seg in segs {
        match seg {
            Seg::Literal(text) => {
                for c in text.chars() {
                    if c == '/' {
                        if let Some(rank) = current.take() {
                            ranks.push(rank);
                        }
                    } else if current.is_none() {
                        current = Some(RANK_LITERAL);
                    }
                }
            }
            Seg::Param(spec) => {
                let rank = param_rank(spec);
                current = Some(current.map_or(rank, |existing| existing.max(rank)));
            }
        }
    }
    if let Some(rank) = current {
        ranks.push(rank);
    }
    ranks
}
