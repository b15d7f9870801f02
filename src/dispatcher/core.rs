use std::borrow::Cow;
use std::sync::Arc;

use http::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::BuildError;
use crate::router::ParamVec;
use crate::urls::{UrlArgs, UrlMap};

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path.
///
/// Header names are shared `Arc<str>` handles (`content-type`, `allow`, ...
/// repeat across responses); values stay per-request `String`s.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// An HTTP request as seen by the engine.
///
/// `target` is the request target exactly as received: the raw path with
/// percent-escapes intact, plus an optional `?query`. The engine splits the
/// query off and never interprets it.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub target: String,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    #[must_use]
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    #[must_use]
    pub fn put(target: impl Into<String>) -> Self {
        Self::new(Method::PUT, target)
    }

    #[must_use]
    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::DELETE, target)
    }

    #[must_use]
    pub fn head(target: impl Into<String>) -> Self {
        Self::new(Method::HEAD, target)
    }

    #[must_use]
    pub fn options(target: impl Into<String>) -> Self {
        Self::new(Method::OPTIONS, target)
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response produced by a handler or by the engine itself.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    /// Create a plain text response.
    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut response = Self::new(status);
        response.set_header("content-type", "text/plain; charset=utf-8");
        response.body = body.into().into_bytes();
        response
    }

    /// Create a JSON response by serializing `body`.
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Result<Self, serde_json::Error> {
        let mut response = Self::new(status);
        response.set_header("content-type", "application/json");
        response.body = serde_json::to_vec(body)?;
        Ok(response)
    }

    /// Create an empty response with the given status.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status)
    }

    /// Create a `301 Moved Permanently` pointing at `location`.
    #[must_use]
    pub fn moved_permanently(location: &str) -> Self {
        let mut response = Self::new(StatusCode::MOVED_PERMANENTLY);
        response.set_header("location", location);
        response
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header, replacing any existing value case-insensitively.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }

    /// The body interpreted as UTF-8, lossily.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// What a handler decided to do with a request.
#[derive(Debug)]
pub enum Flow {
    /// Send this response.
    Respond(Response),
    /// Decline the request and let the engine fall through, first to the
    /// configured not-found handler, then out of the engine entirely.
    Next,
}

/// Result type returned by every handler.
pub type HandlerResult = Result<Flow, anyhow::Error>;

/// Shorthand for handlers that produce a response.
pub fn respond(response: Response) -> HandlerResult {
    Ok(Flow::Respond(response))
}

/// Shorthand for handlers that decline a request.
pub fn next() -> HandlerResult {
    Ok(Flow::Next)
}

/// A request handler bound to a route and method.
///
/// Implemented for any `Fn(&Context) -> HandlerResult + Send + Sync`, so
/// closures work directly:
///
/// ```rust,ignore
/// routes.get("/posts/{id:int}", |cx: &Context| {
///     let id = cx.param_i64("id").unwrap_or_default();
///     respond(Response::text(StatusCode::OK, format!("post {id}")))
/// });
/// ```
pub trait Handler: Send + Sync {
    fn call(&self, cx: &Context<'_>) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&Context<'_>) -> HandlerResult + Send + Sync,
{
    fn call(&self, cx: &Context<'_>) -> HandlerResult {
        self(cx)
    }
}

/// Outcome of [`Engine::dispatch`](crate::Engine::dispatch).
///
/// `Forward` means the engine has nothing to say about this request and the
/// host should continue with its own handling (the embedded equivalent of
/// calling the next middleware). [`Engine::respond`](crate::Engine::respond)
/// converts it into a default 404 for standalone use.
#[derive(Debug)]
pub enum Dispatch {
    Response(Response),
    Forward,
}

/// Handlers bound to one route, keyed by HTTP method.
pub(crate) struct MethodTable {
    entries: Vec<(Method, Arc<dyn Handler>)>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Binds a handler, rejecting a second binding for the same method.
    pub fn insert(&mut self, method: Method, handler: Arc<dyn Handler>) -> Result<(), Method> {
        if self.entries.iter().any(|(m, _)| *m == method) {
            return Err(method);
        }
        self.entries.push((method, handler));
        Ok(())
    }

    pub fn find(&self, method: &Method) -> Option<&Arc<dyn Handler>> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, handler)| handler)
    }

    /// The `Allow` header value: bound methods, sorted and comma-joined.
    pub fn allow_header(&self) -> String {
        let mut methods: Vec<&str> = self.entries.iter().map(|(m, _)| m.as_str()).collect();
        methods.sort_unstable();
        methods.dedup();
        methods.join(",")
    }
}

/// Everything a handler can see about the current request.
///
/// Borrowed for the duration of the handler call; nothing here escapes the
/// dispatch.
pub struct Context<'a> {
    request: &'a Request,
    path: &'a str,
    query: Option<&'a str>,
    params: &'a ParamVec,
    route_name: Option<&'a str>,
    methods: Option<&'a MethodTable>,
    urls: &'a UrlMap,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        request: &'a Request,
        path: &'a str,
        query: Option<&'a str>,
        params: &'a ParamVec,
        route_name: Option<&'a str>,
        methods: Option<&'a MethodTable>,
        urls: &'a UrlMap,
    ) -> Self {
        Self {
            request,
            path,
            query,
            params,
            route_name,
            methods,
            urls,
        }
    }

    /// The request method. A HEAD request served by a GET handler still
    /// reports `HEAD` here.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.request.method
    }

    /// The raw request target (path plus optional query).
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        &self.request.target
    }

    /// The raw path portion of the target, percent-escapes intact.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        self.path
    }

    /// The raw query string, if any, without the leading `?`.
    #[inline]
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query
    }

    /// All extracted path parameters in template order.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &ParamVec {
        self.params
    }

    /// Get a converted path parameter by name. Names are unique per route;
    /// duplicates are rejected at build time.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// Get a string parameter by name.
    #[inline]
    #[must_use]
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Value::as_str)
    }

    /// Get an integer parameter by name.
    #[inline]
    #[must_use]
    pub fn param_i64(&self, name: &str) -> Option<i64> {
        self.param(name).and_then(Value::as_i64)
    }

    /// Name of the matched route. `None` inside a not-found handler.
    #[inline]
    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.route_name
    }

    /// Methods bound on the matched route, sorted. Empty when no route
    /// matched.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<String> {
        let Some(methods) = self.methods else {
            return Vec::new();
        };
        let header = methods.allow_header();
        if header.is_empty() {
            return Vec::new();
        }
        header.split(',').map(str::to_owned).collect()
    }

    /// Invoke the sibling handler bound to `method` on the matched route,
    /// with this same context. Returns `None` when no such binding exists.
    ///
    /// The request method is left untouched, so the sibling observes the
    /// original method.
    pub fn forward(&self, method: Method) -> Option<HandlerResult> {
        let handler = self.methods?.find(&method)?;
        Some(handler.call(self))
    }

    /// The underlying request, for header and body access.
    #[inline]
    #[must_use]
    pub fn request(&self) -> &Request {
        self.request
    }

    /// The engine's URL builder.
    #[inline]
    #[must_use]
    pub fn urls(&self) -> &UrlMap {
        self.urls
    }

    /// Build a URL for a named route. Shorthand for `cx.urls().build(...)`.
    pub fn url(&self, name: &str, args: impl Into<UrlArgs>) -> Result<String, BuildError> {
        self.urls.build(name, args)
    }
}
