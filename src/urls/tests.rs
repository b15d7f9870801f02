use serde_json::json;

use super::UrlMap;
use crate::converters::ConverterRegistry;
use crate::error::BuildError;
use crate::router::TableBuilder;

fn urls(routes: &[(&str, &[&str])]) -> UrlMap {
    let registry = ConverterRegistry::with_builtins();
    let mut builder = TableBuilder::new(&registry);
    for (name, templates) in routes {
        let templates: Vec<String> = templates.iter().map(|t| (*t).to_owned()).collect();
        builder
            .add_route(Some((*name).to_owned()), &templates)
            .unwrap_or_else(|err| panic!("route {name}: {err}"));
    }
    UrlMap::from_table(&builder.finish())
}

#[test]
fn test_static_url() {
    let urls = urls(&[("posts", &["/posts"])]);
    assert_eq!(urls.build("posts", ()).unwrap(), "/posts");
}

#[test]
fn test_positional_value() {
    let urls = urls(&[("post", &["/posts/{id:int}"])]);
    assert_eq!(urls.build("post", 7).unwrap(), "/posts/7");
    assert_eq!(urls.build("post", "7").unwrap(), "/posts/7");
}

#[test]
fn test_named_values() {
    let urls = urls(&[("search", &["/search/{term}/{page:int}"])]);
    assert_eq!(
        urls.build("search", json!({ "term": "rust", "page": 2 }))
            .unwrap(),
        "/search/rust/2"
    );
}

#[test]
fn test_tuple_values() {
    let urls = urls(&[("search", &["/search/{term}/{page:int}"])]);
    assert_eq!(urls.build("search", ("rust", 2)).unwrap(), "/search/rust/2");
}

#[test]
fn test_variant_selected_by_arity() {
    let urls = urls(&[("posts", &["/posts[/{page:int}]"])]);
    assert_eq!(urls.build("posts", ()).unwrap(), "/posts");
    assert_eq!(urls.build("posts", 2).unwrap(), "/posts/2");
}

#[test]
fn test_named_variant_selection() {
    let urls = urls(&[("posts", &["/posts[/{page:int}]"])]);
    assert_eq!(urls.build("posts", json!({})).unwrap(), "/posts");
    assert_eq!(urls.build("posts", json!({ "page": 3 })).unwrap(), "/posts/3");
}

#[test]
fn test_fixed_digits_are_padded() {
    let urls = urls(&[("year", &["/y/{y:int({fixedDigits: 4})}"])]);
    assert_eq!(urls.build("year", 1).unwrap(), "/y/0001");
}

#[test]
fn test_values_are_percent_encoded() {
    let urls = urls(&[("post", &["/posts/{slug}"])]);
    assert_eq!(urls.build("post", "a b").unwrap(), "/posts/a%20b");
}

#[test]
fn test_path_values_keep_separators() {
    let urls = urls(&[("file", &["/files/{p:path}"])]);
    assert_eq!(urls.build("file", "a/b c.txt").unwrap(), "/files/a/b%20c.txt");
}

#[test]
fn test_unknown_route() {
    let urls = urls(&[("posts", &["/posts"])]);
    assert!(matches!(
        urls.build("missing", ()),
        Err(BuildError::UnknownRoute { .. })
    ));
}

#[test]
fn test_arity_mismatch() {
    let urls = urls(&[("post", &["/posts/{id:int}"])]);
    let err = urls.build("post", ()).unwrap_err();
    assert_eq!(
        err,
        BuildError::ArityMismatch {
            route: "post".to_owned(),
            expected: 1,
            got: 0,
        }
    );
}

#[test]
fn test_named_errors_name_the_param() {
    let urls = urls(&[("search", &["/search/{term}/{page:int}"])]);
    assert!(matches!(
        urls.build("search", json!({ "term": "rust" })),
        Err(BuildError::MissingParam { ref param, .. }) if param == "page"
    ));
    assert!(matches!(
        urls.build("search", json!({ "term": "rust", "page": 1, "extra": true })),
        Err(BuildError::UnexpectedParam { ref param, .. }) if param == "extra"
    ));
}

#[test]
fn test_converter_rejects_bad_values() {
    let urls = urls(&[("post", &["/posts/{id:int({max: 10})}"])]);
    assert!(matches!(
        urls.build("post", 99),
        Err(BuildError::InvalidValue { .. })
    ));
    assert!(matches!(
        urls.build("post", "abc"),
        Err(BuildError::InvalidValue { .. })
    ));
}

#[test]
fn test_string_values_are_folded() {
    let urls = urls(&[("post", &["/posts/{slug}"])]);
    assert_eq!(urls.build("post", "Rust").unwrap(), "/posts/rust");
}
