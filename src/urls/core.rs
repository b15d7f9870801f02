use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::encoding::encode_path;
use crate::error::BuildError;
use crate::router::{RouteTable, Seg};

/// Arguments to a URL build.
///
/// Converted from plain values (`7`, `"slug"`), tuples for multi-parameter
/// routes, or a JSON object for building by name.
#[derive(Debug, Clone)]
pub enum UrlArgs {
    None,
    Positional(Vec<Value>),
    Named(Map<String, Value>),
}

impl From<()> for UrlArgs {
    fn from((): ()) -> Self {
        UrlArgs::None
    }
}

macro_rules! positional_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for UrlArgs {
                fn from(value: $ty) -> Self {
                    UrlArgs::Positional(vec![Value::from(value)])
                }
            }
        )*
    };
}

positional_scalar!(i32, i64, u32, u64, f64, bool, &str, String);

impl From<Value> for UrlArgs {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => UrlArgs::Named(map),
            other => UrlArgs::Positional(vec![other]),
        }
    }
}

impl From<Vec<Value>> for UrlArgs {
    fn from(values: Vec<Value>) -> Self {
        UrlArgs::Positional(values)
    }
}

impl<A, B> From<(A, B)> for UrlArgs
where
    A: Into<Value>,
    B: Into<Value>,
{
    fn from((a, b): (A, B)) -> Self {
        UrlArgs::Positional(vec![a.into(), b.into()])
    }
}

impl<A, B, C> From<(A, B, C)> for UrlArgs
where
    A: Into<Value>,
    B: Into<Value>,
    C: Into<Value>,
{
    fn from((a, b, c): (A, B, C)) -> Self {
        UrlArgs::Positional(vec![a.into(), b.into(), c.into()])
    }
}

impl<A, B, C, D> From<(A, B, C, D)> for UrlArgs
where
    A: Into<Value>,
    B: Into<Value>,
    C: Into<Value>,
    D: Into<Value>,
{
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        UrlArgs::Positional(vec![a.into(), b.into(), c.into(), d.into()])
    }
}

struct UrlVariant {
    segs: Vec<Seg>,
    /// Parameter names in template order.
    params: Vec<Arc<str>>,
}

struct UrlMapInner {
    routes: HashMap<String, Vec<UrlVariant>>,
}

/// Builds canonical percent-encoded URLs for named routes.
///
/// Cheap to clone and share; the route data is immutable after the engine is
/// built. Variant selection mirrors registration: the first variant (in
/// template and expansion order) whose parameter set matches the arguments
/// wins, so an optional group's bare form is chosen for zero arguments.
#[derive(Clone)]
pub struct UrlMap {
    inner: Arc<UrlMapInner>,
}

impl UrlMap {
    pub(crate) fn from_table(table: &RouteTable) -> Self {
        let mut routes = HashMap::with_capacity(table.route_count());
        for route in table.routes() {
            let variants = route
                .variant_ixs
                .iter()
                .map(|&ix| {
                    let variant = table.variant(ix);
                    let params = variant
                        .segs
                        .iter()
                        .filter_map(|seg| match seg {
                            Seg::Param(spec) => Some(Arc::clone(&spec.name)),
                            Seg::Literal(_) => None,
                        })
                        .collect();
                    UrlVariant {
                        segs: variant.segs.clone(),
                        params,
                    }
                })
                .collect();
            routes.insert(route.name.clone(), variants);
        }
        Self {
            inner: Arc::new(UrlMapInner { routes }),
        }
    }

    /// Registered route names, unordered.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.inner.routes.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.routes.contains_key(name)
    }

    /// Build the URL for `name` from `args`.
    ///
    /// Values go through each parameter's converter, so the result always
    /// matches the route it was built for; out-of-range or malformed values
    /// are rejected here rather than producing a dead link.
    pub fn build(&self, name: &str, args: impl Into<UrlArgs>) -> Result<String, BuildError> {
        let variants =
            self.inner
                .routes
                .get(name)
                .ok_or_else(|| BuildError::UnknownRoute {
                    name: name.to_owned(),
                })?;
        match args.into() {
            UrlArgs::None => render_positional(name, variants, &[]),
            UrlArgs::Positional(values) => render_positional(name, variants, &values),
            UrlArgs::Named(map) => render_named(name, variants, &map),
        }
    }
}

impl std::fmt::Debug for UrlMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names();
        names.sort_unstable();
        f.debug_struct("UrlMap").field("routes", &names).finish()
    }
}

fn render_positional(
    route: &str,
    variants: &[UrlVariant],
    values: &[Value],
) -> Result<String, BuildError> {
    let Some(variant) = variants.iter().find(|v| v.params.len() == values.len()) else {
        let expected = variants.iter().map(|v| v.params.len()).max().unwrap_or(0);
        return Err(BuildError::ArityMismatch {
            route: route.to_owned(),
            expected,
            got: values.len(),
        });
    };
    let ordered: Vec<&Value> = values.iter().collect();
    render(route, variant, &ordered)
}

fn render_named(
    route: &str,
    variants: &[UrlVariant],
    map: &Map<String, Value>,
) -> Result<String, BuildError> {
    let exact = variants.iter().find(|v| {
        v.params.len() == map.len() && v.params.iter().all(|p| map.contains_key(p.as_ref()))
    });
    if let Some(variant) = exact {
        let mut ordered = Vec::with_capacity(variant.params.len());
        for param in &variant.params {
            match map.get(param.as_ref()) {
                Some(value) => ordered.push(value),
                None => {
                    return Err(BuildError::MissingParam {
                        route: route.to_owned(),
                        param: param.to_string(),
                    })
                }
            }
        }
        return render(route, variant, &ordered);
    }

    // no variant takes this exact set; diagnose against the fullest one
    let fullest = variants.iter().max_by_key(|v| v.params.len());
    if let Some(fullest) = fullest {
        for param in &fullest.params {
            if !map.contains_key(param.as_ref()) {
                return Err(BuildError::MissingParam {
                    route: route.to_owned(),
                    param: param.to_string(),
                });
            }
        }
        for key in map.keys() {
            if !fullest.params.iter().any(|p| p.as_ref() == key) {
                return Err(BuildError::UnexpectedParam {
                    route: route.to_owned(),
                    param: key.clone(),
                });
            }
        }
    }
    let expected = variants.iter().map(|v| v.params.len()).max().unwrap_or(0);
    Err(BuildError::ArityMismatch {
        route: route.to_owned(),
        expected,
        got: map.len(),
    })
}

fn render(route: &str, variant: &UrlVariant, values: &[&Value]) -> Result<String, BuildError> {
    let mut out = String::new();
    let mut ix = 0;
    for seg in &variant.segs {
        match seg {
            Seg::Literal(text) => out.push_str(&encode_path(text)),
            Seg::Param(spec) => {
                let text =
                    spec.converter
                        .to_url(values[ix])
                        .map_err(|err| BuildError::InvalidValue {
                            route: route.to_owned(),
                            param: spec.name.to_string(),
                            reason: err.message().to_owned(),
                        })?;
                out.push_str(&encode_path(&text));
                ix += 1;
            }
        }
    }
    Ok(out)
}
