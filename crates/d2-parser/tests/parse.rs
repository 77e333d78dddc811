use std::io;

use d2_parser::{
    ErrorCode, ParseOptions, Position, Range,
    ast::{MapNode, Node, Scalar, StringNode, Value},
    parse, parse_key, parse_map_key, parse_str, parse_value,
};

#[test]
fn test_diagram_source() {
    let source = r#"
        # Services
        vars: {
          region: us-east-1
        }

        api: API Server {
          shape: hexagon
          tooltip: "serves ${vars.region}"
        }
        db: |md
          # Database
          Stores **everything**.
        |

        api -> db: queries {
          style.stroke-width: 2
        }
        (api -> db)[0].style.animated: true
    "#;

    let output = parse_str("diagram.d2", source, &ParseOptions::default());
    assert!(
        output.diagnostics().is_empty(),
        "unexpected diagnostics: {:?}",
        output.diagnostics()
    );

    let nodes = &output.map().nodes;
    assert_eq!(nodes.len(), 6);
    assert!(matches!(nodes[0], MapNode::Comment(_)));

    let api = nodes[2].as_key().unwrap();
    assert_eq!(
        api.primary.as_ref().map(|p| p.scalar_string().into_owned()),
        Some("API Server".to_string())
    );
    let api_map = api.value.as_ref().and_then(Value::as_map).unwrap();
    assert_eq!(api_map.nodes.len(), 2);

    let db = nodes[3].as_key().unwrap();
    let Some(Value::Scalar(Scalar::String(StringNode::Block(block)))) = &db.value else {
        panic!("expected a block string");
    };
    assert_eq!(block.value, "# Database\nStores **everything**.");

    let edge = nodes[4].as_key().unwrap();
    assert_eq!(edge.edges.len(), 1);
    assert_eq!(
        edge.primary.as_ref().map(|p| p.scalar_string().into_owned()),
        Some("queries".to_string())
    );

    let group = nodes[5].as_key().unwrap();
    assert!(group.edge_index.is_some());
    assert_eq!(
        group
            .edge_key
            .as_ref()
            .map(|k| k.strings().collect::<Vec<_>>()),
        Some(vec!["style", "animated"])
    );
    assert!(matches!(
        group.value,
        Some(Value::Scalar(Scalar::Boolean(ref b))) if b.value
    ));
}

#[test]
fn test_errors_do_not_stop_the_parse() {
    let source = "a: {\nb -> \n}\nc: \"open\nd: [1; 2\n";

    let output = parse_str("broken.d2", source, &ParseOptions::default());
    let codes: Vec<_> = output.diagnostics().iter().map(|d| d.code()).collect();

    assert_eq!(codes, [ErrorCode::E031, ErrorCode::E010, ErrorCode::E002]);
    assert_eq!(output.map().nodes.len(), 3);
    for diagnostic in output.diagnostics() {
        assert_eq!(diagnostic.range().label(), "broken.d2");
    }
}

#[test]
fn test_streamed_source_failure() {
    let chars = "x: 1\ny: 2"
        .chars()
        .map(Ok)
        .take(6)
        .chain(std::iter::once(Err(io::Error::other("connection reset"))));

    let output = parse("stream.d2", chars, &ParseOptions::default());

    let fatal = output.fatal().unwrap();
    assert_eq!(fatal.code(), ErrorCode::E090);
    assert_eq!(fatal.to_string(), "stream.d2:2:2: io error: connection reset");
    assert_eq!(output.map().nodes.len(), 2);

    let err = output.into_result().unwrap_err();
    assert!(err.fatal().is_some());
}

#[test]
fn test_fragment_entry_points() {
    let key = parse_key("a.'b c'.d").unwrap();
    assert_eq!(key.strings().collect::<Vec<_>>(), ["a", "b c", "d"]);

    let map_key = parse_map_key("x -> y: label").unwrap();
    assert_eq!(map_key.edges.len(), 1);

    let value = parse_value("{a; b}").unwrap();
    assert_eq!(value.as_map().map(|m| m.nodes.len()), Some(2));

    assert!(parse_value("\"unterminated").is_err());
    assert!(parse_map_key("   ").is_err());
}

#[test]
fn test_json_tree() {
    let output = parse_str("j.d2", "a -> b: 1.5", &ParseOptions::default());
    let json = serde_json::to_value(output.map()).unwrap();

    assert_eq!(json["range"], "j.d2,0:0:0-0:11:11");
    let key = &json["nodes"][0]["map_key"];
    assert_eq!(key["edges"][0]["src_arrow"], "none");
    assert_eq!(key["edges"][0]["dst_arrow"], "open");
    assert_eq!(key["value"]["scalar"]["number"]["raw"], "1.5");
}

#[test]
fn test_range_text_round_trip() {
    let output = parse_str("r.d2", "x: {\n  y: z\n}", &ParseOptions::default());
    let key = output.map().nodes[0].as_key().unwrap();
    let value_range = key.value.as_ref().unwrap().range().clone();

    let encoded = value_range.to_compact_string();
    assert_eq!(encoded, "r.d2,0:3:3-2:1:13");
    assert_eq!(encoded.parse::<Range>().unwrap(), value_range);
    assert_eq!(value_range.to_string(), "r.d2:1:4");
    assert!(!value_range.one_line());
    assert_eq!(value_range.end, Position::new(2, 1, 13));
}
