use serde_json::{json, Value};

use super::{ConverterArgs, ConverterRegistry};

fn create(spec: &str, args: &str) -> std::sync::Arc<dyn super::Converter> {
    let registry = ConverterRegistry::with_builtins();
    let args = ConverterArgs::parse(args).expect("args should parse");
    registry.create(spec, &args, "/test").expect("converter should build")
}

#[test]
fn test_parse_positional_strings() {
    let args = ConverterArgs::parse("'alpha', 'bravo', \"charlie\"").expect("should parse");
    assert_eq!(
        args.positional(),
        &[json!("alpha"), json!("bravo"), json!("charlie")]
    );
    assert!(args.get("anything").is_none());
}

#[test]
fn test_parse_options_object() {
    let args = ConverterArgs::parse("{min: 1, max: 99}").expect("should parse");
    assert_eq!(args.get("min"), Some(&json!(1)));
    assert_eq!(args.get("max"), Some(&json!(99)));
    assert!(args.positional().is_empty());
}

#[test]
fn test_parse_mixed_and_quoted_keys() {
    let args = ConverterArgs::parse("'first', {\"allowUpperCase\": true}").expect("should parse");
    assert_eq!(args.positional(), &[json!("first")]);
    assert_eq!(args.get("allowUpperCase"), Some(&json!(true)));
}

#[test]
fn test_parse_rejects_garbage() {
    assert!(ConverterArgs::parse("{min: }").is_err());
    assert!(ConverterArgs::parse("'unterminated").is_err());
    assert!(ConverterArgs::parse("{min: 1} {max: 2}").is_err());
    assert!(ConverterArgs::parse("wibble").is_err());
}

#[test]
fn test_int_bounds() {
    let conv = create("int", "{min: 1, max: 99}");
    assert_eq!(conv.from_url("5").expect("in range"), json!(5));
    assert!(conv.from_url("0").is_err());
    assert!(conv.from_url("100").is_err());
    // pattern never sees a sign, overflow is still rejected
    assert!(conv.from_url("99999999999999999999").is_err());
}

#[test]
fn test_int_leading_zeros_parse_numerically() {
    let conv = create("int", "{fixedDigits: 4}");
    assert_eq!(conv.pattern(), "[0-9]{4}");
    assert_eq!(conv.from_url("0001").expect("valid"), json!(1));

    let bare = create("int", "");
    assert_eq!(bare.pattern(), "[0-9]+");
    assert_eq!(bare.from_url("007").expect("valid"), json!(7));
}

#[test]
fn test_int_to_url_pads_and_validates() {
    let conv = create("int", "{fixedDigits: 4}");
    assert_eq!(conv.to_url(&json!(1)).expect("fits"), "0001");
    assert_eq!(conv.to_url(&json!("12")).expect("numeric string"), "0012");
    assert!(conv.to_url(&json!(12345)).is_err());
    assert!(conv.to_url(&json!(-3)).is_err());
    assert!(conv.to_url(&json!("nope")).is_err());
}

#[test]
fn test_int_rejects_unknown_options() {
    let registry = ConverterRegistry::with_builtins();
    let args = ConverterArgs::parse("{stride: 2}").expect("should parse");
    assert!(registry.create("int", &args, "/test").is_err());
}

#[test]
fn test_string_default_is_lowercase_single_segment() {
    let conv = create("string", "");
    assert_eq!(conv.pattern(), "[[:ascii:]&&[^/A-Z]]+");
    assert_eq!(
        conv.relaxed_pattern().expect("folds case"),
        "[[:ascii:]&&[^/]]+"
    );
    assert!(!conv.spans_segments());
    assert_eq!(conv.canonical_text("NeIl"), "neil");
}

#[test]
fn test_string_length_options_shape_the_pattern() {
    let conv = create("string", "{minLength: 3, maxLength: 8}");
    assert_eq!(conv.pattern(), "[[:ascii:]&&[^/A-Z]]{3,8}");
}

#[test]
fn test_string_allow_upper_case_disables_relaxation() {
    let conv = create("string", "{allowUpperCase: true}");
    assert!(conv.relaxed_pattern().is_none());
    assert_eq!(conv.canonical_text("NeIl"), "NeIl");
    assert_eq!(conv.to_url(&json!("NeIl")).expect("kept"), "NeIl");
}

#[test]
fn test_string_to_url_folds_and_checks() {
    let conv = create("string", "{minLength: 3, maxLength: 8}");
    assert_eq!(conv.to_url(&json!("Howdy")).expect("folded"), "howdy");
    assert_eq!(conv.to_url(&json!(1234)).expect("numbers stringify"), "1234");
    assert!(conv.to_url(&json!("hi")).is_err());
    assert!(conv.to_url(&json!("howdypartner")).is_err());
    assert!(conv.to_url(&json!("a/b")).is_err());
    assert!(conv.to_url(&json!("nøgel")).is_err());
}

#[test]
fn test_string_non_ascii() {
    let conv = create("string", "{allowNonASCII: true}");
    assert_eq!(conv.pattern(), "[^/\\p{Lu}]+");
    assert_eq!(conv.to_url(&json!("nøgel")).expect("allowed"), "nøgel");
    assert_eq!(conv.canonical_text("ÜBER"), "über");
}

#[test]
fn test_path_spans_segments_without_trailing_separator() {
    let conv = create("path", "");
    assert!(conv.spans_segments());
    let re = regex::Regex::new(&format!("^(?:{})$", conv.pattern())).expect("valid");
    assert!(re.is_match("howdy/partner/how"));
    assert!(re.is_match("howdy"));
    assert!(!re.is_match("howdy/"));
    assert!(!re.is_match("/howdy"));
    assert!(!re.is_match("howdy//partner"));
}

#[test]
fn test_path_length_bounds_apply_to_whole_value() {
    let conv = create("path", "{maxLength: 5}");
    assert_eq!(conv.from_url("ab/cd").expect("5 chars"), json!("ab/cd"));
    assert!(conv.from_url("abc/de").is_err());
}

#[test]
fn test_path_allow_upper_case_disables_relaxation() {
    let conv = create("path", "{allowUpperCase: true}");
    assert!(conv.relaxed_pattern().is_none());
    assert_eq!(conv.canonical_text("Docs/Api"), "Docs/Api");
    assert_eq!(conv.to_url(&json!("Docs/Api")).expect("kept"), "Docs/Api");
}

#[test]
fn test_path_to_url_rejects_malformed_values() {
    let conv = create("path", "");
    assert_eq!(conv.to_url(&json!("a/b/c")).expect("kept"), "a/b/c");
    assert!(conv.to_url(&json!("/a")).is_err());
    assert!(conv.to_url(&json!("a/")).is_err());
    assert!(conv.to_url(&json!("a//b")).is_err());
    assert!(conv.to_url(&json!("")).is_err());
}

#[test]
fn test_any_matches_exact_alternatives_only() {
    let conv = create("any", "'alpha', 'bravo', 'charlie'");
    assert_eq!(conv.pattern(), "alpha|bravo|charlie");
    assert!(conv.relaxed_pattern().is_none());
    assert_eq!(conv.to_url(&json!("bravo")).expect("member"), "bravo");
    assert!(conv.to_url(&json!("delta")).is_err());
    assert!(conv.to_url(&json!("Alpha")).is_err());
}

#[test]
fn test_any_escapes_regex_metacharacters() {
    let conv = create("any", "'a.b', 'c|d'");
    assert_eq!(conv.pattern(), "a\\.b|c\\|d");
}

#[test]
fn test_any_requires_alternatives() {
    let registry = ConverterRegistry::with_builtins();
    let empty = ConverterArgs::parse("").expect("should parse");
    assert!(registry.create("any", &empty, "/test").is_err());
    let numbers = ConverterArgs::parse("1, 2").expect("should parse");
    assert!(registry.create("any", &numbers, "/test").is_err());
}

#[test]
fn test_registry_reports_unknown_converter() {
    let registry = ConverterRegistry::with_builtins();
    let err = registry
        .create("bogus", &ConverterArgs::empty(), "/test/{x:bogus}")
        .expect_err("should fail");
    assert!(err.to_string().contains("bogus"));
}

#[test]
fn test_describe_shapes() {
    assert_eq!(
        create("int", "{fixedDigits: 4}").describe(),
        json!({ "type": "int", "fixedDigits": 4 })
    );
    assert_eq!(create("string", "").describe(), json!({ "type": "string" }));
    assert_eq!(
        create("string", "{minLength: 3, maxLength: 8}").describe(),
        json!({ "type": "string", "minLength": 3, "maxLength": 8 })
    );
    assert_eq!(create("path", "").describe(), json!({ "type": "path" }));
    assert_eq!(
        create("any", "'alpha', 'bravo'").describe(),
        json!({ "type": "any" })
    );
}

#[test]
fn test_describe_is_plain_data() {
    let conv = create("string", "{allowNonASCII: true, allowUpperCase: true}");
    let Value::Object(map) = conv.describe() else {
        panic!("descriptor must be an object");
    };
    assert_eq!(map.get("type"), Some(&json!("string")));
    assert_eq!(map.get("allowNonASCII"), Some(&json!(true)));
    assert_eq!(map.get("allowUpperCase"), Some(&json!(true)));
}
