//! Integration tests for Zushiki
//!
//! End-to-end tests from statement JSON to flowchart JSON.
//!
mod common;
use common::*;
use zushiki::prelude::*;

/// Statement list in the shape the upstream parser emits: nested `children` bodies,
/// `i/o` and `statement` tags, translated display text.
const NESTED_STATEMENTS_JSON: &str = r#"[
    { "tag": "i/o", "translated": "输入n", "original_unit": "scanf(\"%d\", &n);", "children": [] },
    { "tag": "branch", "translated": "是否n>0", "original_unit": "if(n>0)", "children": [
        { "type": "if_block", "children": [
            { "tag": "statement", "translated": "x=1", "original_unit": "x=1;", "children": [] }
        ] }
    ] },
    { "tag": "branch", "translated": "否则", "original_unit": "else", "children": [
        { "type": "else_block", "children": [
            { "tag": "statement", "translated": "x=2", "original_unit": "x=2;", "children": [] }
        ] }
    ] },
    { "tag": "loop", "translated": "判断：x<10", "original_unit": "while(x<10)", "children": [
        { "type": "while_true_block", "children": [
            { "tag": "statement", "translated": "x++", "original_unit": "x++;", "children": [] }
        ] }
    ] },
    { "tag": "statement", "translated": "返回0", "original_unit": "return 0;", "children": [] }
]"#;

const MULTI_FUNCTION_JSON: &str = r#"{
    "main": [
        { "tag": "process", "translated": "call helper", "original_unit": "helper();" },
        { "tag": "process", "translated": "return 0", "original_unit": "return 0;" }
    ],
    "functions": [
        { "name": "helper", "nodes": [
            { "tag": "io", "translated": "print hi", "original_unit": "printf(\"hi\");" }
        ] },
        { "name": "unused", "nodes": [] }
    ]
}"#;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_nested_parser_output_converts_end_to_end() {
        let source = SourceProgram::from_json_str(NESTED_STATEMENTS_JSON).expect("valid JSON");
        let chart = converter().convert_source(source).expect("conversion should succeed");
        assert_well_formed(&chart);

        assert_eq!(node_by_text(&chart, "输入n").node_type, NodeType::Io);
        assert_eq!(
            successors(&chart, node_by_text(&chart, "是否n>0")),
            vec![
                (ConnectionPoint::Right, "x=1", Some("yes")),
                (ConnectionPoint::Down, "x=2", Some("no")),
            ]
        );
        for text in ["x=1", "x=2"] {
            assert_eq!(
                successors(&chart, node_by_text(&chart, text)),
                vec![(ConnectionPoint::Down, "判断：x<10", None)]
            );
        }
        assert_eq!(
            successors(&chart, node_by_text(&chart, "x++")),
            vec![(ConnectionPoint::Right, "判断：x<10", None)]
        );

        let ret = node_by_text(&chart, "返回0");
        assert_eq!(ret.node_type, NodeType::End);
        assert_eq!(chart.nodes_of_type(NodeType::End).count(), 1);
    }

    #[test]
    fn test_output_json_uses_the_exchange_format() {
        let source = SourceProgram::from_json_str(NESTED_STATEMENTS_JSON).expect("valid JSON");
        let chart = converter().convert_source(source).expect("conversion should succeed");
        let json = chart.to_json_string(false).expect("serializable");

        let value: serde_json::Value = serde_json::from_str(&json).expect("valid output JSON");
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["items"][0]["type"], "start");
        assert_eq!(value["items"][0]["x"], -4600.0);
        assert_eq!(value["items"][0]["y"], -4800.0);

        let first_edge = &value["connections"][0];
        assert_eq!(first_edge["start_item_id"], "start_0");
        assert_eq!(first_edge["start_point_type"], "down");
        assert_eq!(first_edge["end_point_type"], "up");

        let round_trip = Flowchart::from_json_str(&json).expect("parses back");
        assert_eq!(round_trip, chart);
    }

    #[test]
    fn test_multi_function_document_skips_empty_functions() {
        let source = SourceProgram::from_json_str(MULTI_FUNCTION_JSON).expect("valid JSON");
        let program = source.into_program().expect("structured");
        let names: Vec<_> = program.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main", "helper"]);

        let conversion = converter().convert_detailed(&program).expect("converted");
        let chart = &conversion.flowchart;
        assert_well_formed(chart);

        // `main` returns, `helper` falls off its end under the default policy.
        assert_eq!(node_by_text(chart, "return 0").node_type, NodeType::End);
        assert_eq!(conversion.functions[1].end, None);
        assert!(node_by_text(chart, "print hi").id.as_str().ends_with("_helper"));
    }

    #[test]
    fn test_multi_function_shape_can_be_required() {
        let err = SourceProgram::from_json_str_multi(NESTED_STATEMENTS_JSON).unwrap_err();
        assert!(matches!(err, InputError::ValidationError(_)));
        assert!(SourceProgram::from_json_str_multi(MULTI_FUNCTION_JSON).is_ok());
    }

    #[test]
    fn test_plain_statements_starting_with_keywords_convert() {
        let source = SourceProgram::from_json_str(
            r#"[{ "tag": "process", "translated": "do nothing" }, { "tag": "io", "translated": "default greeting" }]"#,
        )
        .expect("valid JSON");
        let chart = converter().convert_source(source).expect("conversion should succeed");
        assert_well_formed(&chart);

        assert_eq!(node_by_text(&chart, "do nothing").node_type, NodeType::Process);
        assert_eq!(node_by_text(&chart, "default greeting").node_type, NodeType::Io);
        assert_eq!(chart.items.len(), 3);
    }

    #[test]
    fn test_invalid_json_is_an_input_error() {
        let err = SourceProgram::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, InputError::JsonParseError(_)));

        let err = SourceProgram::from_json_str(r#"{ "main": [], "functions": [] }"#).unwrap_err();
        assert!(matches!(err, InputError::ValidationError(_)));
    }

    #[test]
    fn test_config_file_changes_layout_and_labels() {
        let config = FlowchartConfig::from_json_str(
            r#"{
                "layout": { "origin_x": 0, "origin_y": 0, "level_height": 100 },
                "labels": { "true_label": "是", "false_label": "否", "start_text": "开始" },
                "end_node": "always"
            }"#,
        )
        .expect("valid config");
        let chart = Converter::builder()
            .with_config(config)
            .build()
            .expect("valid converter")
            .convert_statements(&[condition("x"), process("a")])
            .expect("converted");
        assert_well_formed(&chart);

        let start = node_by_text(&chart, "开始");
        assert_eq!((start.x, start.y), (0.0, 0.0));
        assert_eq!(node_by_text(&chart, "x").y, 100.0);
        assert_eq!(
            successors(&chart, node_by_text(&chart, "x")),
            vec![
                (ConnectionPoint::Right, "a", Some("是")),
                (ConnectionPoint::Down, "End", Some("否")),
            ]
        );
    }

    #[test]
    fn test_outline_lists_every_node_and_edge() {
        let chart = convert(vec![io("input n"), process("x=1")]);
        let text = outline(&chart);

        assert!(text.starts_with("flowchart v1.0\n"));
        assert!(text.contains("  io_1 [io] at (-4600, -4675): input n\n"));
        assert!(text.contains("  start_0(down) -> io_1(up)\n"));
        assert!(text.contains("  io_1(down) -> process_2(up)\n"));
        assert_eq!(text, outline(&chart));
    }
}
