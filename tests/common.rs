//! Common test utilities for building statement lists and inspecting flowcharts.
use zushiki::prelude::*;

#[allow(dead_code)]
pub fn io(text: &str) -> SourceStatement {
    SourceStatement::new("io", text)
}

#[allow(dead_code)]
pub fn process(text: &str) -> SourceStatement {
    SourceStatement::new("process", text)
}

/// An `if` condition; `text` is the condition itself, e.g. `"n > 0"`.
#[allow(dead_code)]
pub fn condition(text: &str) -> SourceStatement {
    SourceStatement::new("condition", text).with_original(format!("if ({})", text))
}

#[allow(dead_code)]
pub fn else_branch() -> SourceStatement {
    SourceStatement::new("branch", "else")
}

#[allow(dead_code)]
pub fn else_if(text: &str) -> SourceStatement {
    SourceStatement::new("branch", text).with_original(format!("else if ({})", text))
}

/// A `while` loop header.
#[allow(dead_code)]
pub fn while_loop(text: &str) -> SourceStatement {
    SourceStatement::new("loop", text).with_original(format!("while ({})", text))
}

/// A `for` header, tagged as a condition the way the statement parser emits it.
#[allow(dead_code)]
pub fn for_loop(text: &str) -> SourceStatement {
    SourceStatement::new("condition", text).with_original(format!("for ({})", text))
}

#[allow(dead_code)]
pub fn open() -> SourceStatement {
    SourceStatement::new("block", "{")
}

#[allow(dead_code)]
pub fn close() -> SourceStatement {
    SourceStatement::new("block", "}")
}

#[allow(dead_code)]
pub fn brk() -> SourceStatement {
    SourceStatement::new("process", "break;")
}

#[allow(dead_code)]
pub fn cont() -> SourceStatement {
    SourceStatement::new("process", "continue;")
}

#[allow(dead_code)]
pub fn ret(value: &str) -> SourceStatement {
    SourceStatement::new("process", format!("return {}", value))
}

/// Wraps statements in `{` / `}` markers.
#[allow(dead_code)]
pub fn braced(body: Vec<SourceStatement>) -> Vec<SourceStatement> {
    let mut statements = vec![open()];
    statements.extend(body);
    statements.push(close());
    statements
}

#[allow(dead_code)]
pub fn converter() -> Converter {
    Converter::builder().build().expect("default config is valid")
}

#[allow(dead_code)]
pub fn converter_always_end() -> Converter {
    Converter::builder()
        .with_end_node_policy(EndNodePolicy::Always)
        .build()
        .expect("default config is valid")
}

#[allow(dead_code)]
pub fn convert(statements: Vec<SourceStatement>) -> Flowchart {
    converter()
        .convert_statements(&statements)
        .expect("conversion should succeed")
}

#[allow(dead_code)]
pub fn node_by_text<'a>(chart: &'a Flowchart, text: &str) -> &'a Node {
    chart
        .find_by_text(text)
        .unwrap_or_else(|| panic!("no node with text '{}'", text))
}

/// Targets of the edges leaving `node`, as (start point, target text, label).
#[allow(dead_code)]
pub fn successors<'a>(chart: &'a Flowchart, node: &'a Node) -> Vec<(ConnectionPoint, &'a str, Option<&'a str>)> {
    chart
        .outgoing(&node.id)
        .map(|c| {
            let target = chart.node(&c.end_item_id).expect("edge target exists");
            (c.start_point, target.text.as_str(), c.label.as_deref())
        })
        .collect()
}

/// Checks the structural invariants every successful conversion must satisfy.
#[allow(dead_code)]
pub fn assert_well_formed(chart: &Flowchart) {
    let mut ids = std::collections::HashSet::new();
    for node in &chart.items {
        assert!(ids.insert(&node.id), "duplicate node id {}", node.id);
    }

    let mut tuples = std::collections::HashSet::new();
    for c in &chart.connections {
        assert!(ids.contains(&c.start_item_id), "dangling start {}", c.start_item_id);
        assert!(ids.contains(&c.end_item_id), "dangling end {}", c.end_item_id);
        assert!(
            tuples.insert((&c.start_item_id, c.start_point, &c.end_item_id, c.end_point)),
            "duplicate connection {}({}) -> {}({})",
            c.start_item_id,
            c.start_point,
            c.end_item_id,
            c.end_point
        );
    }

    for node in &chart.items {
        if node.node_type != NodeType::Start {
            assert!(
                chart.incoming(&node.id).next().is_some(),
                "node {} ({}) has no incoming connection",
                node.id,
                node.text
            );
        }
    }
}
