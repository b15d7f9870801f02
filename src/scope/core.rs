use std::sync::Arc;

use crate::dispatcher::Handler;

/// A route definition: an optional explicit name plus one or more templates.
///
/// Most call sites never build one directly; anything implementing
/// [`IntoRouteDef`] works where a definition is expected.
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub(crate) name: Option<String>,
    pub(crate) templates: Vec<String>,
}

impl RouteDef {
    #[must_use]
    pub fn new(templates: Vec<String>) -> Self {
        Self {
            name: None,
            templates,
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>, templates: Vec<String>) -> Self {
        Self {
            name: Some(name.into()),
            templates,
        }
    }
}

/// Conversion into a [`RouteDef`].
///
/// Implemented for template strings, `(name, template)` pairs, template
/// arrays, and `(name, templates)` pairs, so registrations read naturally:
///
/// ```rust,ignore
/// routes.get("/posts", list);
/// routes.get(("postDetail", "/posts/{id:int}"), show);
/// routes.get(["/about", "/about/team"], about);
/// ```
pub trait IntoRouteDef {
    fn into_route_def(self) -> RouteDef;
}

impl IntoRouteDef for RouteDef {
    fn into_route_def(self) -> RouteDef {
        self
    }
}

impl IntoRouteDef for &str {
    fn into_route_def(self) -> RouteDef {
        RouteDef::new(vec![self.to_owned()])
    }
}

impl IntoRouteDef for String {
    fn into_route_def(self) -> RouteDef {
        RouteDef::new(vec![self])
    }
}

impl IntoRouteDef for (&str, &str) {
    fn into_route_def(self) -> RouteDef {
        RouteDef::named(self.0, vec![self.1.to_owned()])
    }
}

impl<const N: usize> IntoRouteDef for [&str; N] {
    fn into_route_def(self) -> RouteDef {
        RouteDef::new(self.iter().map(|t| (*t).to_owned()).collect())
    }
}

impl<const N: usize> IntoRouteDef for (&str, [&str; N]) {
    fn into_route_def(self) -> RouteDef {
        RouteDef::named(self.0, self.1.iter().map(|t| (*t).to_owned()).collect())
    }
}

impl IntoRouteDef for &[&str] {
    fn into_route_def(self) -> RouteDef {
        RouteDef::new(self.iter().map(|t| (*t).to_owned()).collect())
    }
}

impl IntoRouteDef for (&str, &[&str]) {
    fn into_route_def(self) -> RouteDef {
        RouteDef::named(self.0, self.1.iter().map(|t| (*t).to_owned()).collect())
    }
}

/// One recorded route: composed templates plus its method bindings. Method
/// specs stay raw strings here; the engine validates them at build time.
pub(crate) struct Registration {
    pub name: Option<String>,
    pub templates: Vec<String>,
    pub methods: Vec<(String, Arc<dyn Handler>)>,
}

/// Everything gathered while the registration closure runs. Turned into a
/// compiled engine afterwards; recording itself never fails.
#[derive(Default)]
pub(crate) struct Collected {
    pub regs: Vec<Registration>,
    pub not_found: Option<Arc<dyn Handler>>,
    pub method_not_allowed: Option<Arc<dyn Handler>>,
}

impl Collected {
    /// Records a registration, merging into an earlier one when the composed
    /// template list is identical, so `get` then `post` on one URL share a
    /// route. Conflicting explicit names stay separate and are rejected as
    /// ambiguous at build time.
    fn record(
        &mut self,
        prefix: &str,
        def: RouteDef,
        methods: Vec<(String, Arc<dyn Handler>)>,
    ) {
        let templates: Vec<String> = def
            .templates
            .iter()
            .map(|t| format!("{prefix}{t}"))
            .collect();

        if let Some(existing) = self.regs.iter_mut().find(|r| r.templates == templates) {
            let name_conflicts = matches!(
                (&existing.name, &def.name),
                (Some(a), Some(b)) if a != b
            );
            if !name_conflicts {
                if existing.name.is_none() {
                    existing.name = def.name;
                }
                existing.methods.extend(methods);
                return;
            }
        }

        self.regs.push(Registration {
            name: def.name,
            templates,
            methods,
        });
    }
}

/// Per-method handler set for [`Scope::bind`].
#[derive(Default)]
pub struct Methods {
    entries: Vec<(String, Arc<dyn Handler>)>,
}

impl Methods {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(self, handler: impl Handler + 'static) -> Self {
        self.on("GET", handler)
    }

    #[must_use]
    pub fn post(self, handler: impl Handler + 'static) -> Self {
        self.on("POST", handler)
    }

    #[must_use]
    pub fn put(self, handler: impl Handler + 'static) -> Self {
        self.on("PUT", handler)
    }

    #[must_use]
    pub fn delete(self, handler: impl Handler + 'static) -> Self {
        self.on("DELETE", handler)
    }

    #[must_use]
    pub fn patch(self, handler: impl Handler + 'static) -> Self {
        self.on("PATCH", handler)
    }

    #[must_use]
    pub fn head(self, handler: impl Handler + 'static) -> Self {
        self.on("HEAD", handler)
    }

    #[must_use]
    pub fn options(self, handler: impl Handler + 'static) -> Self {
        self.on("OPTIONS", handler)
    }

    /// Bind a handler to one or more methods, comma-separated
    /// (`"GET,POST"`). Also accepts extension methods such as `"PURGE"`.
    #[must_use]
    pub fn on(mut self, methods: &str, handler: impl Handler + 'static) -> Self {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        self.entries.push((methods.to_owned(), handler));
        self
    }
}

/// Registration surface handed to the closure in
/// [`Engine::build`](crate::Engine::build).
///
/// Recorders are infallible; template and method errors surface when the
/// engine compiles. A scope carries the prefix accumulated by enclosing
/// [`submount`](Scope::submount) calls and prepends it to every template it
/// records.
pub struct Scope<'c> {
    collected: &'c mut Collected,
    prefix: String,
}

impl<'c> Scope<'c> {
    pub(crate) fn root(collected: &'c mut Collected) -> Self {
        Self {
            collected,
            prefix: String::new(),
        }
    }

    pub fn get(&mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> &mut Self {
        self.route("GET", def, handler)
    }

    pub fn post(&mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> &mut Self {
        self.route("POST", def, handler)
    }

    pub fn put(&mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> &mut Self {
        self.route("PUT", def, handler)
    }

    pub fn delete(
        &mut self,
        def: impl IntoRouteDef,
        handler: impl Handler + 'static,
    ) -> &mut Self {
        self.route("DELETE", def, handler)
    }

    pub fn patch(&mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> &mut Self {
        self.route("PATCH", def, handler)
    }

    pub fn head(&mut self, def: impl IntoRouteDef, handler: impl Handler + 'static) -> &mut Self {
        self.route("HEAD", def, handler)
    }

    pub fn options(
        &mut self,
        def: impl IntoRouteDef,
        handler: impl Handler + 'static,
    ) -> &mut Self {
        self.route("OPTIONS", def, handler)
    }

    /// Bind a handler to the given methods, comma-separated (`"GET,POST"`).
    /// Extension methods (`"PURGE"`) are accepted as-is.
    pub fn route(
        &mut self,
        methods: &str,
        def: impl IntoRouteDef,
        handler: impl Handler + 'static,
    ) -> &mut Self {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        self.collected.record(
            &self.prefix,
            def.into_route_def(),
            vec![(methods.to_owned(), handler)],
        );
        self
    }

    /// Bind several method handlers to one route at once.
    pub fn bind(&mut self, def: impl IntoRouteDef, methods: Methods) -> &mut Self {
        self.collected
            .record(&self.prefix, def.into_route_def(), methods.entries);
        self
    }

    /// Register routes under a common prefix. The prefix is template text, so
    /// it may carry parameters of its own:
    ///
    /// ```rust,ignore
    /// routes.submount("/forums/{forum:int}", |forums| {
    ///     forums.get("", show_forum);
    ///     forums.get("/threads/{thread:int}", show_thread);
    /// });
    /// ```
    pub fn submount(&mut self, prefix: &str, f: impl FnOnce(&mut Scope<'_>)) -> &mut Self {
        let mut child = Scope {
            collected: &mut *self.collected,
            prefix: format!("{}{prefix}", self.prefix),
        };
        f(&mut child);
        self
    }

    /// Handler for requests no route matches, and for requests a matched
    /// handler declined. Engine-wide; the last call wins.
    pub fn not_found(&mut self, handler: impl Handler + 'static) -> &mut Self {
        self.collected.not_found = Some(Arc::new(handler));
        self
    }

    /// Handler for requests that matched a route but not a bound method.
    /// Engine-wide; the last call wins.
    pub fn method_not_allowed(&mut self, handler: impl Handler + 'static) -> &mut Self {
        self.collected.method_not_allowed = Some(Arc::new(handler));
        self
    }
}
