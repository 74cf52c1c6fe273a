// Unhappy paths through the public API. None of them may panic.

use idguard_core::converter::serialize_by_tag;
use idguard_core::fixer::find_fixable_duplicates_by_tag;
use idguard_core::locator::get_read_only_ranges_by_tag;
use idguard_core::{
    analyze, serialize, ConfigError, ConvertError, DocumentTree, Format, IdGuardError, IdPolicy,
};

#[test]
fn test_unknown_format_tag() {
    let err = "toml".parse::<Format>().unwrap_err();
    assert_eq!(err.to_string(), "Unknown document format: \"toml\"");
    let wrapped: IdGuardError = err.into();
    assert!(matches!(wrapped, IdGuardError::UnknownFormat(_)));
}

#[test]
fn test_unknown_tag_operations_are_empty() {
    let text = "- id: 1\n- id: 1\n";
    assert!(get_read_only_ranges_by_tag(text, "ini").is_empty());
    assert!(find_fixable_duplicates_by_tag(text, "ini").is_empty());
    assert_eq!(serialize_by_tag(&DocumentTree::Null, "ini"), "");
}

#[test]
fn test_garbage_input_never_panics() {
    let inputs = [
        "",
        "   ",
        "{",
        "}",
        "[[[",
        "<",
        "</a>",
        "- id:",
        "\"id\": ",
        "<id>",
        "{\"id\": \"\\u12\"}",
        "- id: '",
        "\u{feff}{}",
    ];
    for input in inputs {
        for format in Format::ALL {
            let analysis = analyze(input, Some(format));
            assert!(analysis.fixes.is_empty(), "{input:?} as {format}");
        }
    }
}

#[test]
fn test_runaway_nesting_degrades_to_no_findings() {
    let json = format!("{}{{\"id\": 1}}", "[".repeat(20_000));
    let yaml = "[".repeat(20_000);
    let xml = "<a>".repeat(20_000);
    let cases = [(json.as_str(), Format::Json), (&yaml, Format::Yaml), (&xml, Format::Xml)];
    for (text, format) in cases {
        assert!(idguard_core::parse(text, format).is_err(), "{format}");
        assert!(idguard_core::find_duplicates(text, format).is_empty(), "{format}");
        let analysis = analyze(text, Some(format));
        assert!(analysis.parse_error.is_some(), "{format}");
        assert!(analysis.fixes.is_empty(), "{format}");
    }
    // The line heuristic still sees an id on a line of its own.
    let deep_with_id_line = format!("{}\n  \"id\": 7,\n", "[".repeat(20_000));
    let found = idguard_core::locate_identifiers(&deep_with_id_line, Format::Json);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].range.start_line, 2);
}

#[test]
fn test_unrepresentable_tree_serializes_to_message() {
    let mut fields = indexmap::IndexMap::new();
    fields.insert("1st".to_string(), DocumentTree::Integer(1));
    fields.insert("ok".to_string(), DocumentTree::Integer(2));
    let out = serialize(&DocumentTree::Object(fields), Format::Xml);
    assert_eq!(out, "Invalid XML element name: \"1st\"");
}

#[test]
fn test_convert_error_wraps_into_top_level_error() {
    let err = idguard_core::parse("a: [", Format::Yaml).unwrap_err();
    assert!(matches!(err, ConvertError::Yaml(_)));
    let top: IdGuardError = err.into();
    assert!(top.to_string().starts_with("YAML error"));
}

#[test]
fn test_bad_policies() {
    assert!(matches!(
        IdPolicy::from_yaml_str("id_key: [1, 2]"),
        Err(ConfigError::Yaml(_))
    ));
    assert!(matches!(IdPolicy::from_json_str("{"), Err(ConfigError::Json(_))));
}
