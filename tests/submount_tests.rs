//! Integration tests for submount composition and route-table compilation:
//! prefix nesting, cross-site merging, naming, and the conflicts the
//! builder rejects.

use http::StatusCode;
use waymark::{next, respond, ConfigError, Context, Dispatch, Engine, HandlerResult, Request, Response};

fn dispatched(engine: &Engine, request: &Request) -> Response {
    match engine.dispatch(request).expect("dispatch failed") {
        Dispatch::Response(response) => response,
        Dispatch::Forward => panic!("expected a response"),
    }
}

#[test]
fn test_nested_prefixes_compose() {
    fn named(cx: &Context) -> HandlerResult {
        respond(Response::text(
            StatusCode::OK,
            cx.route_name().unwrap_or("-").to_owned(),
        ))
    }

    let engine = Engine::build(|root| {
        root.submount("/api", |api| {
            api.submount("/v2", |v2| {
                v2.get("/posts", named);
                v2.submount("/admin", |admin| {
                    admin.get("/stats", named);
                });
            });
        });
    })
    .expect("engine should build");

    let response = dispatched(&engine, &Request::get("/api/v2/posts"));
    assert_eq!(response.body_text(), "apiV2Posts");
    let response = dispatched(&engine, &Request::get("/api/v2/admin/stats"));
    assert_eq!(response.body_text(), "apiV2AdminStats");
}

#[test]
fn test_empty_template_takes_the_prefix() {
    let engine = Engine::build(|root| {
        root.submount("/forums", |forums| {
            forums.get("", |_cx: &Context| {
                respond(Response::text(StatusCode::OK, "forum index"))
            });
        });
    })
    .expect("engine should build");

    assert_eq!(
        dispatched(&engine, &Request::get("/forums")).body_text(),
        "forum index"
    );
}

#[test]
fn test_params_compose_across_levels() {
    let engine = Engine::build(|root| {
        root.submount("/users/{user:int}", |user| {
            user.get(("user_post", "/posts/{post}"), |cx: &Context| {
                respond(Response::text(
                    StatusCode::OK,
                    format!(
                        "user={} post={}",
                        cx.param_i64("user").unwrap_or(-1),
                        cx.param_str("post").unwrap_or("-")
                    ),
                ))
            });
        });
    })
    .expect("engine should build");

    let response = dispatched(&engine, &Request::get("/users/7/posts/hello"));
    assert_eq!(response.body_text(), "user=7 post=hello");
}

#[test]
fn test_optional_group_composes_with_prefix() {
    let engine = Engine::build(|root| {
        root.submount("/forums", |forums| {
            forums.get(("forum", "[/home]"), |cx: &Context| {
                respond(Response::text(StatusCode::OK, format!("GET {}", cx.target())))
            });
        });
    })
    .expect("engine should build");

    assert_eq!(engine.url("forum", ()).expect("url"), "/forums");
    assert_eq!(dispatched(&engine, &Request::get("/forums")).body_text(), "GET /forums");
    assert_eq!(
        dispatched(&engine, &Request::get("/forums/home")).body_text(),
        "GET /forums/home"
    );
    assert!(matches!(
        engine
            .dispatch(&Request::get("/forums/ho"))
            .expect("dispatch failed"),
        Dispatch::Forward
    ));
}

#[test]
fn test_same_template_merges_methods_across_sites() {
    let engine = Engine::build(|root| {
        root.submount("/api", |api| {
            api.get("/posts", |_cx: &Context| {
                respond(Response::text(StatusCode::OK, "listing"))
            });
        });
        root.submount("/api", |api| {
            api.post("/posts", |_cx: &Context| {
                respond(Response::text(StatusCode::CREATED, "created"))
            });
        });
    })
    .expect("engine should build");

    assert_eq!(engine.route_count(), 1);
    assert_eq!(dispatched(&engine, &Request::get("/api/posts")).body_text(), "listing");
    assert_eq!(dispatched(&engine, &Request::post("/api/posts")).body_text(), "created");
    assert_eq!(
        dispatched(&engine, &Request::options("/api/posts")).body_text(),
        "GET,POST"
    );
}

#[test]
fn test_literal_routes_beat_params_regardless_of_order() {
    let engine = Engine::build(|root| {
        root.get(("page", "/{slug}"), |_cx: &Context| {
            respond(Response::text(StatusCode::OK, "page"))
        });
        root.get("/about", |_cx: &Context| {
            respond(Response::text(StatusCode::OK, "about"))
        });
    })
    .expect("engine should build");

    assert_eq!(dispatched(&engine, &Request::get("/about")).body_text(), "about");
    assert_eq!(dispatched(&engine, &Request::get("/contact")).body_text(), "page");
}

#[test]
fn test_typed_params_beat_string_params() {
    let engine = Engine::build(|root| {
        root.get(("word", "/n/{word}"), |_cx: &Context| {
            respond(Response::text(StatusCode::OK, "word"))
        });
        root.get(("number", "/n/{num:int}"), |_cx: &Context| {
            respond(Response::text(StatusCode::OK, "number"))
        });
    })
    .expect("engine should build");

    assert_eq!(dispatched(&engine, &Request::get("/n/7")).body_text(), "number");
    assert_eq!(dispatched(&engine, &Request::get("/n/seven")).body_text(), "word");
}

#[test]
fn test_distinct_converter_configs_are_not_ambiguous() {
    let engine = Engine::build(|root| {
        root.get(("yes", "/x/{v:any('yes')}"), |_cx: &Context| {
            respond(Response::text(StatusCode::OK, "yes route"))
        });
        root.get(("no", "/x/{v:any('no')}"), |_cx: &Context| {
            respond(Response::text(StatusCode::OK, "no route"))
        });
    })
    .expect("engine should build");

    assert_eq!(dispatched(&engine, &Request::get("/x/yes")).body_text(), "yes route");
    assert_eq!(dispatched(&engine, &Request::get("/x/no")).body_text(), "no route");
}

#[test]
fn test_ambiguous_templates_are_rejected() {
    let err = Engine::build(|root| {
        root.get(("a", "/posts/{id:int}"), |_cx: &Context| next());
        root.get(("b", "/posts/{n:int}"), |_cx: &Context| next());
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::AmbiguousRoute { .. }));
}

#[test]
fn test_duplicate_route_names_are_rejected() {
    let err = Engine::build(|root| {
        root.get(("posts", "/posts"), |_cx: &Context| next());
        root.get(("posts", "/articles"), |_cx: &Context| next());
    })
    .unwrap_err();
    match err {
        ConfigError::DuplicateRouteName { name } => assert_eq!(name, "posts"),
        other => panic!("expected DuplicateRouteName, got {other:?}"),
    }
}

#[test]
fn test_duplicate_params_are_rejected() {
    let err = Engine::build(|root| {
        root.get(("nested", "/users/{id}/posts/{id}"), |_cx: &Context| next());
    })
    .unwrap_err();
    match err {
        ConfigError::DuplicateParam { param, .. } => assert_eq!(param, "id"),
        other => panic!("expected DuplicateParam, got {other:?}"),
    }
}

#[test]
fn test_unguessable_names_are_rejected() {
    let err = Engine::build(|root| {
        root.get("/{id}", |_cx: &Context| next());
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::CannotGuessName { .. }));
}

#[test]
fn test_malformed_templates_are_rejected() {
    let err = Engine::build(|root| {
        root.get("//double", |_cx: &Context| next());
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::MalformedTemplate { .. }));

    let err = Engine::build(|root| {
        root.get("/search?q=x", |_cx: &Context| next());
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::MalformedTemplate { .. }));
}

#[test]
fn test_unknown_converters_are_rejected() {
    let err = Engine::build(|root| {
        root.get(("v", "/x/{v:bogus}"), |_cx: &Context| next());
    })
    .unwrap_err();
    match err {
        ConfigError::UnknownConverter { converter, .. } => assert_eq!(converter, "bogus"),
        other => panic!("expected UnknownConverter, got {other:?}"),
    }
}

#[test]
fn test_invalid_methods_are_rejected() {
    let err = Engine::build(|root| {
        root.route("G ET", "/x", |_cx: &Context| next());
    })
    .unwrap_err();
    match err {
        ConfigError::InvalidMethod { method } => assert_eq!(method, "G ET"),
        other => panic!("expected InvalidMethod, got {other:?}"),
    }
}

#[test]
fn test_duplicate_methods_are_rejected() {
    let err = Engine::build(|root| {
        root.get("/dup", |_cx: &Context| next());
        root.get("/dup", |_cx: &Context| next());
    })
    .unwrap_err();
    match err {
        ConfigError::DuplicateMethod { method, .. } => assert_eq!(method, "GET"),
        other => panic!("expected DuplicateMethod, got {other:?}"),
    }
}
