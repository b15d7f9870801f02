//! Engine assembly and request dispatch.
//!
//! [`Engine::build`] runs a registration closure against a root [`Scope`],
//! compiles everything it collected into the immutable route table, and wires
//! the per-route method tables, fallback handlers, and URL builder. Dispatch
//! borrows the engine read-only, so a built engine can be shared across
//! threads behind an `Arc` with no further synchronization.

use std::sync::Arc;

use http::{Method, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::converters::{ConverterFactory, ConverterRegistry};
use crate::dispatcher::{Context, Dispatch, Flow, Handler, MethodTable, Request, Response};
use crate::error::{BuildError, ConfigError};
use crate::router::{ParamVec, Resolution, RouteTable, Seg, TableBuilder};
use crate::scope::{Collected, IntoRouteDef, Methods, Scope};
use crate::urls::{UrlArgs, UrlMap};

/// Engine construction options.
///
/// Currently that means custom converters, registered before any template
/// compiles. Registering under a built-in's name shadows it.
#[derive(Default)]
pub struct Config {
    converters: Vec<(String, ConverterFactory)>,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name` for use in templates as
    /// `{param:name(...)}`.
    #[must_use]
    pub fn converter(mut self, name: impl Into<String>, factory: ConverterFactory) -> Self {
        self.converters.push((name.into(), factory));
        self
    }
}

/// The compiled routing engine.
///
/// Immutable once built: route registration happens entirely inside
/// [`Engine::build`] (or [`EngineBuilder`]), and every dispatch borrows
/// `&self`.
pub struct Engine {
    table: RouteTable,
    /// Method tables, parallel to the table's route indexes.
    methods: Vec<MethodTable>,
    not_found: Option<Arc<dyn Handler>>,
    method_not_allowed: Option<Arc<dyn Handler>>,
    urls: UrlMap,
}

impl Engine {
    /// Build an engine by running `f` against a root scope.
    pub fn build(f: impl FnOnce(&mut Scope<'_>)) -> Result<Self, ConfigError> {
        Self::with_config(Config::default(), f)
    }

    /// Like [`Engine::build`], with custom converters available to the
    /// templates `f` registers.
    pub fn with_config(
        config: Config,
        f: impl FnOnce(&mut Scope<'_>),
    ) -> Result<Self, ConfigError> {
        let mut collected = Collected::default();
        f(&mut Scope::root(&mut collected));
        Self::compile(config, collected)
    }

    /// Incremental registration, for hosts that wire routes across several
    /// call sites.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn compile(config: Config, collected: Collected) -> Result<Self, ConfigError> {
        let mut registry = ConverterRegistry::with_builtins();
        for (name, factory) in config.converters {
            registry.register(name, factory);
        }

        let mut builder = TableBuilder::new(&registry);
        let mut methods = Vec::with_capacity(collected.regs.len());
        for reg in collected.regs {
            let first = reg.templates.first().cloned().unwrap_or_default();
            builder.add_route(reg.name, &reg.templates)?;

            let mut table = MethodTable::new();
            for (spec, handler) in reg.methods {
                for raw in spec.split(',') {
                    let method = parse_method(raw.trim())?;
                    table.insert(method, Arc::clone(&handler)).map_err(|method| {
                        ConfigError::DuplicateMethod {
                            template: first.clone(),
                            method: method.to_string(),
                        }
                    })?;
                }
            }
            methods.push(table);
        }

        let table = builder.finish();
        let urls = UrlMap::from_table(&table);

        info!(routes = table.route_count(), "routing table compiled");

        Ok(Self {
            table,
            methods,
            not_found: collected.not_found,
            method_not_allowed: collected.method_not_allowed,
            urls,
        })
    }

    /// Dispatch a request.
    ///
    /// Resolution and method selection follow a fixed order: canonical
    /// redirects first, then the handler bound to the request method (HEAD
    /// falls back to GET), then the automatic OPTIONS response, then method
    /// not allowed handling. Unmatched and declined requests fall through to
    /// the configured not-found handler and finally to
    /// [`Dispatch::Forward`].
    ///
    /// A handler error aborts the dispatch and is returned as-is; hosts
    /// usually turn it into a 500.
    pub fn dispatch(&self, request: &Request) -> anyhow::Result<Dispatch> {
        let (raw_path, query) = split_target(&request.target);
        debug!(method = %request.method, path = %raw_path, "dispatch");

        match self.table.resolve(raw_path, query) {
            Resolution::Redirect { location } => {
                Ok(Dispatch::Response(Response::moved_permanently(&location)))
            }
            Resolution::Match { route, params } => {
                self.dispatch_matched(request, raw_path, query, route, &params)
            }
            Resolution::NotFound => self.fall_through(request, raw_path, query),
        }
    }

    /// Dispatch and always produce a response: [`Dispatch::Forward`] becomes
    /// a plain 404, for standalone use without a host fallback chain.
    pub fn respond(&self, request: &Request) -> anyhow::Result<Response> {
        match self.dispatch(request)? {
            Dispatch::Response(response) => Ok(response),
            Dispatch::Forward => Ok(Response::text(
                StatusCode::NOT_FOUND,
                format!("Cannot {} {}", request.method, request.target),
            )),
        }
    }

    fn dispatch_matched(
        &self,
        request: &Request,
        raw_path: &str,
        query: Option<&str>,
        route: usize,
        params: &ParamVec,
    ) -> anyhow::Result<Dispatch> {
        let methods = &self.methods[route];
        let name = self.table.route(route).name.as_str();
        let cx = Context::new(
            request,
            raw_path,
            query,
            params,
            Some(name),
            Some(methods),
            &self.urls,
        );

        let handler = methods.find(&request.method).or_else(|| {
            if request.method == Method::HEAD {
                methods.find(&Method::GET)
            } else {
                None
            }
        });
        if let Some(handler) = handler {
            return match handler.call(&cx)? {
                Flow::Respond(response) => Ok(Dispatch::Response(response)),
                Flow::Next => self.fall_through(request, raw_path, query),
            };
        }

        // automatic OPTIONS: the allow list doubles as the body
        if request.method == Method::OPTIONS {
            let allow = methods.allow_header();
            let mut response = Response::text(StatusCode::OK, allow.as_str());
            response.set_header("allow", allow);
            return Ok(Dispatch::Response(response));
        }

        debug!(method = %request.method, route = %name, "method not allowed");
        if let Some(handler) = &self.method_not_allowed {
            return match handler.call(&cx)? {
                Flow::Respond(response) => Ok(Dispatch::Response(response)),
                Flow::Next => Ok(Dispatch::Forward),
            };
        }
        let mut response = Response::empty(StatusCode::METHOD_NOT_ALLOWED);
        response.set_header("allow", methods.allow_header());
        Ok(Dispatch::Response(response))
    }

    fn fall_through(
        &self,
        request: &Request,
        raw_path: &str,
        query: Option<&str>,
    ) -> anyhow::Result<Dispatch> {
        let Some(handler) = &self.not_found else {
            return Ok(Dispatch::Forward);
        };
        let params = ParamVec::new();
        let cx = Context::new(request, raw_path, query, &params, None, None, &self.urls);
        match handler.call(&cx)? {
            Flow::Respond(response) => Ok(Dispatch::Response(response)),
            Flow::Next => Ok(Dispatch::Forward),
        }
    }

    /// The engine's URL builder, cheap to clone and share.
    #[must_use]
    pub fn urls(&self) -> &UrlMap {
        &self.urls
    }

    /// Build a URL for a named route. Shorthand for
    /// `engine.urls().build(...)`.
    pub fn url(&self, name: &str, args: impl Into<UrlArgs>) -> Result<String, BuildError> {
        self.urls.build(name, args)
    }

    #[must_use]
    pub fn route_count(&self) -> usize {
        self.table.route_count()
    }

    /// Route names in registration order.
    #[must_use]
    pub fn route_names(&self) -> Vec<&str> {
        self.table
            .routes()
            .iter()
            .map(|route| route.name.as_str())
            .collect()
    }

    /// Print all registered routes to stdout.
    ///
    /// Useful for debugging and verifying that routes compiled correctly.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.table.route_count());
        for (ix, route) in self.table.routes().iter().enumerate() {
            let allow = self.methods[ix].allow_header();
            for &vix in &route.variant_ixs {
                println!(
                    "[route] {} {} -> {}",
                    allow,
                    self.table.variant(vix).text,
                    route.name
                );
            }
        }
    }

    /// Describe every route as plain data.
    ///
    /// Each route name maps to an array of variant descriptors in declaration
    /// order: `{"path": "..."}` for literal-only variants, else
    /// `{"literals": [...], "params": [...]}` where literal texts interleave
    /// with parameter descriptors.
    #[must_use]
    pub fn serialize(&self) -> Value {
        let mut map = Map::new();
        for route in self.table.routes() {
            let descriptors: Vec<Value> = route
                .variant_ixs
                .iter()
                .map(|&ix| describe_variant(&self.table.variant(ix).segs))
                .collect();
            map.insert(route.name.clone(), Value::Array(descriptors));
        }
        Value::Object(map)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("routes", &self.route_names())
            .finish()
    }
}

fn describe_variant(segs: &[Seg]) -> Value {
    let mut literals: Vec<Value> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    let mut current = String::new();
    for seg in segs {
        match seg {
            Seg::Literal(text) => current.push_str(text),
            Seg::Param(spec) => {
                literals.push(Value::String(std::mem::take(&mut current)));
                let mut descriptor = Map::new();
                descriptor.insert("name".to_owned(), Value::String(spec.name.to_string()));
                if let Value::Object(fields) = &spec.descriptor {
                    for (key, value) in fields {
                        descriptor.insert(key.clone(), value.clone());
                    }
                }
                params.push(Value::Object(descriptor));
            }
        }
    }
    if params.is_empty() {
        return serde_json::json!({ "path": current });
    }
    if !current.is_empty() {
        literals.push(Value::String(current));
    }
    serde_json::json!({ "literals": literals, "params": params })
}

fn parse_method(raw: &str) -> Result<Method, ConfigError> {
    let upper = raw.to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| ConfigError::InvalidMethod {
        method: raw.to_owned(),
    })
}

fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// Chainable engine construction for hosts that register routes across
/// several call sites.
///
/// ```rust,ignore
/// let engine = Engine::builder()
///     .converter("bool", bool_converter())
///     .get("/posts", list_posts)
///     .routes(|admin| {
///         admin.submount("/admin", |a| { /* ... */ });
///     })
///     .finish()?;
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    config: Config,
    collected: Collected,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom converter.
    #[must_use]
    pub fn converter(mut self, name: impl Into<String>, factory: ConverterFactory) -> Self {
        self.config = self.config.converter(name, factory);
        self
    }

    #[must_use]
    pub fn get(mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> Self {
        Scope::root(&mut self.collected).get(def, handler);
        self
    }

    #[must_use]
    pub fn post(mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> Self {
        Scope::root(&mut self.collected).post(def, handler);
        self
    }

    #[must_use]
    pub fn put(mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> Self {
        Scope::root(&mut self.collected).put(def, handler);
        self
    }

    #[must_use]
    pub fn delete(mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> Self {
        Scope::root(&mut self.collected).delete(def, handler);
        self
    }

    #[must_use]
    pub fn patch(mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> Self {
        Scope::root(&mut self.collected).patch(def, handler);
        self
    }

    #[must_use]
    pub fn head(mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> Self {
        Scope::root(&mut self.collected).head(def, handler);
        self
    }

    #[must_use]
    pub fn options(mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> Self {
        Scope::root(&mut self.collected).options(def, handler);
        self
    }

    /// Bind a handler to the given methods, comma-separated.
    #[must_use]
    pub fn route(
        mut self,
        methods: &str,
        def: impl IntoRouteDef,
        handler: impl Handler + 'static,
    ) -> Self {
        Scope::root(&mut self.collected).route(methods, def, handler);
        self
    }

    /// Bind several method handlers to one route at once.
    #[must_use]
    pub fn bind(mut self, def: impl IntoRouteDef, methods: Methods) -> Self {
        Scope::root(&mut self.collected).bind(def, methods);
        self
    }

    /// Register routes through a scope closure, submounts included.
    #[must_use]
    pub fn routes(mut self, f: impl FnOnce(&mut Scope<'_>)) -> Self {
        f(&mut Scope::root(&mut self.collected));
        self
    }

    #[must_use]
    pub fn not_found(mut self, handler: impl Handler + 'static) -> Self {
        Scope::root(&mut self.collected).not_found(handler);
        self
    }

    #[must_use]
    pub fn method_not_allowed(mut self, handler: impl Handler + 'static) -> Self {
        Scope::root(&mut self.collected).method_not_allowed(handler);
        self
    }

    /// Compile everything registered so far.
    pub fn finish(self) -> Result<Engine, ConfigError> {
        Engine::compile(self.config, self.collected)
    }
}
