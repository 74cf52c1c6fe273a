use idguard_core::converter::{flatten_root, parse_by_tag, serialize_by_tag};
use idguard_core::{convert, parse, serialize, try_serialize, ConvertError, DocumentTree, Format};
use serde_json::json;

fn tree(value: serde_json::Value) -> DocumentTree {
    DocumentTree::from(value)
}

#[test]
fn test_json_to_xml_wraps_and_unwraps() {
    let xml = convert(r#"{"a":1,"b":2}"#, Format::Json, Format::Xml).unwrap();
    assert_eq!(xml, "<root>\n  <a>1</a>\n  <b>2</b>\n</root>");
    let json = convert(&xml, Format::Xml, Format::Json).unwrap();
    assert_eq!(json, "{\n  \"a\": 1,\n  \"b\": 2\n}");
}

#[test]
fn test_same_format_round_trips_keep_shape() {
    let value = tree(json!({
        "title": "Survey",
        "active": true,
        "weight": 1.5,
        "questions": [
            {"id": 1, "label": "Age", "options": ["<18", "18+"]},
            {"id": "q2", "label": "City", "note": null}
        ]
    }));
    for format in [Format::Json, Format::Yaml] {
        let text = serialize(&value, format);
        assert_eq!(parse(&text, format).unwrap(), value, "{format} round trip");
    }
}

#[test]
fn test_xml_round_trip_of_containers() {
    let shapes = [
        json!({"a": 1, "b": {"c": "x"}}),
        json!([{"id": 1}, {"id": 2}, {"id": 3}]),
        json!({"questions": [{"id": 1}, {"id": 2}]}),
        json!({"only": {"nested": [1, 2]}}),
    ];
    for shape in shapes {
        let value = tree(shape);
        let xml = try_serialize(&value, Format::Xml).unwrap();
        assert_eq!(parse(&xml, Format::Xml).unwrap(), value, "through:\n{xml}");
    }
}

#[test]
fn test_xml_to_json_to_xml_is_stable() {
    let xml = "<root>\n  <item>\n    <id>1</id>\n  </item>\n  <item>\n    <id>2</id>\n  </item>\n</root>";
    let json = convert(xml, Format::Xml, Format::Json).unwrap();
    assert_eq!(parse(&json, Format::Json).unwrap(), tree(json!([{"id": 1}, {"id": 2}])));
    assert_eq!(convert(&json, Format::Json, Format::Xml).unwrap(), xml);
}

#[test]
fn test_top_level_item_element_stays_an_object() {
    let xml = "<item>\n  <a>1</a>\n</item>";
    let parsed = parse(xml, Format::Xml).unwrap();
    assert_eq!(parsed, tree(json!({"item": {"a": 1}})));
    assert_eq!(serialize(&parsed, Format::Xml), xml);

    let value = tree(json!({"item": {"a": 1}}));
    let through_xml = convert(r#"{"item": {"a": 1}}"#, Format::Json, Format::Xml).unwrap();
    assert_eq!(through_xml, xml);
    assert_eq!(parse(&through_xml, Format::Xml).unwrap(), value);
}

#[test]
fn test_xml_attributes_survive_conversion() {
    let xml = r#"<survey version="2"><title lang="en">Hi</title></survey>"#;
    let parsed = parse(xml, Format::Xml).unwrap();
    assert_eq!(
        parsed,
        tree(json!({"survey": {"@_version": 2, "title": {"@_lang": "en", "#text": "Hi"}}}))
    );
    let back = serialize(&parsed, Format::Xml);
    assert_eq!(back, "<survey version=\"2\">\n  <title lang=\"en\">Hi</title>\n</survey>");
}

#[test]
fn test_flatten_root() {
    assert_eq!(
        flatten_root(tree(json!({"root": [1, 2]}))),
        tree(json!([1, 2]))
    );
    assert_eq!(flatten_root(tree(json!({"root": 1}))), tree(json!({"root": 1})));
    assert_eq!(
        flatten_root(tree(json!({"root": {}, "x": 1}))),
        tree(json!({"root": {}, "x": 1}))
    );
}

#[test]
fn test_errors_are_values() {
    let err = parse("<a>", Format::Xml).unwrap_err();
    assert!(err.to_string().starts_with("XML error"));
    assert!(matches!(
        convert("{", Format::Json, Format::Yaml),
        Err(ConvertError::Json(_))
    ));
    assert!(parse_by_tag("{}", "csv").is_err());
    assert_eq!(serialize_by_tag(&tree(json!([])), "csv"), "");
}
