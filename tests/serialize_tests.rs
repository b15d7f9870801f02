//! Integration tests for route serialization: the plain-data description of
//! every registered route, static and parameterized.

use http::StatusCode;
use serde_json::json;
use waymark::{respond, Context, Engine, HandlerResult, Response};

fn ok(_cx: &Context) -> HandlerResult {
    respond(Response::empty(StatusCode::OK))
}

#[test]
fn test_static_routes_serialize_as_paths() {
    let engine = Engine::build(|root| {
        root.get("/", ok);
        root.get("/posts", ok);
    })
    .expect("engine should build");

    let doc = engine.serialize();
    assert_eq!(doc["root"], json!([{ "path": "/" }]));
    assert_eq!(doc["posts"], json!([{ "path": "/posts" }]));
}

#[test]
fn test_params_interleave_with_literals() {
    let engine = Engine::build(|root| {
        root.get(("show_post", "/posts/{post}"), ok);
        root.get(("multi", "/multi/{a}/{b}/{c}"), ok);
        root.get(("bracketed", "/alpha/{value}/bravo"), ok);
    })
    .expect("engine should build");

    let doc = engine.serialize();
    assert_eq!(
        doc["show_post"],
        json!([{
            "literals": ["/posts/"],
            "params": [{ "name": "post", "type": "string" }],
        }])
    );
    assert_eq!(
        doc["multi"],
        json!([{
            "literals": ["/multi/", "/", "/"],
            "params": [
                { "name": "a", "type": "string" },
                { "name": "b", "type": "string" },
                { "name": "c", "type": "string" },
            ],
        }])
    );
    assert_eq!(
        doc["bracketed"],
        json!([{
            "literals": ["/alpha/", "/bravo"],
            "params": [{ "name": "value", "type": "string" }],
        }])
    );
}

#[test]
fn test_descriptors_carry_converter_options() {
    let engine = Engine::build(|root| {
        root.get(("year", "/y/{y:int({fixedDigits: 4})}"), ok);
        root.get(("user", "/users/{name:string({allowUpperCase: true})}"), ok);
        root.get(("file", "/files/{name:path}"), ok);
        root.get(("answer", "/q/{v:any('yes', 'no')}"), ok);
    })
    .expect("engine should build");

    let doc = engine.serialize();
    assert_eq!(
        doc["year"][0]["params"],
        json!([{ "name": "y", "type": "int", "fixedDigits": 4 }])
    );
    assert_eq!(
        doc["user"][0]["params"],
        json!([{ "name": "name", "type": "string", "allowUpperCase": true }])
    );
    assert_eq!(doc["file"][0]["params"], json!([{ "name": "name", "type": "path" }]));
    // Alternatives are matching detail, not part of the description.
    assert_eq!(doc["answer"][0]["params"], json!([{ "name": "v", "type": "any" }]));
}

#[test]
fn test_optional_group_serializes_both_variants() {
    let engine = Engine::build(|root| {
        root.get(("archive", "/archive[/{page:int}]"), ok);
    })
    .expect("engine should build");

    let doc = engine.serialize();
    assert_eq!(
        doc["archive"],
        json!([
            { "path": "/archive" },
            {
                "literals": ["/archive/"],
                "params": [{ "name": "page", "type": "int" }],
            },
        ])
    );
}

#[test]
fn test_multiple_templates_serialize_in_order() {
    let engine = Engine::build(|root| {
        root.get(("pair", ["/a", "/b"]), ok);
    })
    .expect("engine should build");

    let doc = engine.serialize();
    assert_eq!(doc["pair"], json!([{ "path": "/a" }, { "path": "/b" }]));
}
