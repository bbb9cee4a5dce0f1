// Tests for record parsing and incremental graph building

use httpgraph_core::builder::{BuilderOptions, GraphBuilder, ensure_hierarchy, format_label};
use httpgraph_core::color::{COLOR_LOCALDOMAIN, LOCALDOMAIN};
use httpgraph_core::model::{Graph, NodeType};
use httpgraph_core::record::{EventRecord, Record, RecordError};

fn event(url: &str) -> Record {
    Record::Event(EventRecord::new(url))
}

fn build(records: &[Record]) -> (Graph, GraphBuilder) {
    build_with(BuilderOptions::default(), records)
}

fn build_with(options: BuilderOptions, records: &[Record]) -> (Graph, GraphBuilder) {
    let mut graph = Graph::new();
    let mut builder = GraphBuilder::new(options);
    for record in records {
        builder.process_record(&mut graph, record);
    }
    (graph, builder)
}

// ============================================================================
// Record Parsing Tests
// ============================================================================

#[test]
fn test_parse_event_record() {
    let record = Record::from_json(
        r#"{"url":"https://a.example.com/x","method":"GET","type":"script","status":200,"ts":1700000000.5}"#,
    )
    .unwrap();

    let Record::Event(event) = record else {
        panic!("expected an event record");
    };
    assert_eq!(event.url, "https://a.example.com/x");
    assert_eq!(event.method.as_deref(), Some("GET"));
    assert_eq!(event.request_type.as_deref(), Some("script"));
    assert_eq!(event.status, Some(200));
    assert_eq!(event.ts, Some(1700000000.5));
}

#[test]
fn test_parse_bytes_coercion() {
    let parse_bytes = |json: &str| match Record::from_json(json).unwrap() {
        Record::Event(event) => event.bytes,
        Record::Redirect { .. } => panic!("expected an event record"),
    };

    assert_eq!(parse_bytes(r#"{"url":"https://e.com/","bytes":512}"#), Some(512));
    assert_eq!(parse_bytes(r#"{"url":"https://e.com/","bytes":"1234"}"#), Some(1234));
    assert_eq!(parse_bytes(r#"{"url":"https://e.com/","bytes":"lots"}"#), None);
    assert_eq!(parse_bytes(r#"{"url":"https://e.com/","bytes":-3}"#), None);
    assert_eq!(parse_bytes(r#"{"url":"https://e.com/","bytes":512.0}"#), Some(512));
    assert_eq!(parse_bytes(r#"{"url":"https://e.com/","bytes":1234.5}"#), Some(1234));
    assert_eq!(parse_bytes(r#"{"url":"https://e.com/","bytes":"12.0"}"#), Some(12));
    assert_eq!(parse_bytes(r#"{"url":"https://e.com/","bytes":-0.5}"#), None);
}

#[test]
fn test_parse_redirect_record() {
    let record = Record::from_json(
        r#"{"edge_type":"redirect","url":"http://e.com/","redirect_url":"https://e.com/"}"#,
    )
    .unwrap();
    assert_eq!(
        record,
        Record::Redirect {
            url: "http://e.com/".to_string(),
            redirect_url: "https://e.com/".to_string(),
        }
    );
}

#[test]
fn test_parse_missing_url() {
    assert!(matches!(
        Record::from_json(r#"{"method":"GET"}"#),
        Err(RecordError::MissingField("url"))
    ));
}

#[test]
fn test_parse_redirect_missing_target() {
    let record = Record::from_json(r#"{"edge_type":"redirect","url":"http://e.com/"}"#).unwrap();
    assert_eq!(
        record,
        Record::Redirect {
            url: "http://e.com/".to_string(),
            redirect_url: String::new(),
        }
    );
}

#[test]
fn test_parse_malformed_json() {
    assert!(matches!(
        Record::from_json("{not json"),
        Err(RecordError::Json(_))
    ));
}

// ============================================================================
// Label Tests
// ============================================================================

#[test]
fn test_format_label_starts_at_path() {
    assert_eq!(format_label("a.example.com/x/y"), "/x/y");
    assert_eq!(format_label("no-slash"), "no-slash");
}

#[test]
fn test_format_label_truncates_long_paths() {
    let path = format!("/{}", "p".repeat(40));
    let label = format_label(&format!("a.example.com{}", path));
    assert!(label.starts_with("... "));
    assert_eq!(label.chars().count(), 4 + 32);
    assert!(path.ends_with(&label[4..]));
}

// ============================================================================
// Event Building Tests
// ============================================================================

#[test]
fn test_single_event_builds_hierarchy() {
    let (graph, _) = build(&[event("https://a.example.com/x")]);

    assert_eq!(graph.order(), 4);
    assert_eq!(graph.size(), 3);
    assert_eq!(graph.node("example.com.").unwrap().node_type, NodeType::Domain);
    assert_eq!(graph.node("a.example.com").unwrap().node_type, NodeType::Host);
    assert_eq!(graph.node("a.example.com/x").unwrap().node_type, NodeType::Resource);
    assert_eq!(graph.node("localhost").unwrap().node_type, NodeType::Client);

    assert!(graph.edge_between("localhost", "a.example.com/x").is_some());
    assert!(graph.edge_between("example.com.", "a.example.com").is_some());
    assert!(graph.edge_between("a.example.com", "a.example.com/x").is_some());
}

#[test]
fn test_client_node_is_local() {
    let (graph, _) = build(&[event("https://a.example.com/x")]);
    let client = graph.node("localhost").unwrap();
    assert_eq!(client.domain, LOCALDOMAIN);
    assert_eq!(client.color, COLOR_LOCALDOMAIN);
}

#[test]
fn test_named_client() {
    let mut record = EventRecord::new("https://a.example.com/x");
    record.client = Some("laptop".to_string());
    let (graph, _) = build(&[Record::Event(record)]);

    assert!(graph.contains("laptop"));
    assert!(!graph.contains("localhost"));
}

#[test]
fn test_resource_carries_request_details() {
    let mut record = EventRecord::new("https://a.example.com/x");
    record.method = Some("POST".to_string());
    record.status = Some(201);
    let (graph, _) = build(&[Record::Event(record)]);

    let resource = graph.node("a.example.com/x").unwrap();
    assert_eq!(resource.label, "/x");
    let attrs = resource.resource.as_ref().unwrap();
    assert_eq!(attrs.method.as_deref(), Some("POST"));
    assert_eq!(attrs.protocol, "https");
    assert_eq!(attrs.status_code, Some(201));
}

#[test]
fn test_repeated_event_bumps_weights() {
    let (graph, _) = build(&[
        event("https://a.example.com/x"),
        event("https://a.example.com/x"),
    ]);
    assert_eq!(graph.order(), 4);
    assert_eq!(graph.edge_between("a.example.com", "a.example.com/x").unwrap().weight, 2);
    assert_eq!(graph.node("a.example.com/x").unwrap().visited, 2);
}

#[test]
fn test_unusable_url_skipped() {
    let (graph, builder) = build(&[event("ftp://files.example.com/a"), event("::")]);
    assert!(graph.is_empty());
    assert_eq!(builder.skipped_url(), 2);
}

// ============================================================================
// Redirect Tests
// ============================================================================

#[test]
fn test_redirect_adds_resource_edge() {
    let (mut graph, mut builder) = build(&[
        event("https://a.example.com/x"),
        event("https://a.example.com/y"),
    ]);
    assert_eq!(graph.size(), 5);

    builder.process_record(
        &mut graph,
        &Record::Redirect {
            url: "https://a.example.com/x".to_string(),
            redirect_url: "https://a.example.com/y".to_string(),
        },
    );

    assert_eq!(graph.size(), 6);
    assert!(graph.edge_between("a.example.com/x", "a.example.com/y").is_some());
}

#[test]
fn test_redirect_with_bad_target_keeps_source() {
    let (graph, builder) = build(&[Record::Redirect {
        url: "https://a.example.com/x".to_string(),
        redirect_url: "mailto:someone@example.com".to_string(),
    }]);

    assert_eq!(graph.order(), 3);
    assert_eq!(graph.size(), 2);
    assert_eq!(builder.skipped_url(), 0);
}

#[test]
fn test_redirect_missing_target_builds_source() {
    let mut graph = Graph::new();
    let mut builder = GraphBuilder::default();
    for line in [
        r#"{"edge_type":"redirect","url":"https://a.example.com/x"}"#,
        r#"{"edge_type":"redirect","url":"https://b.example.org/y","redirect_url":""}"#,
    ] {
        let record = Record::from_json(line).unwrap();
        assert!(builder.process_record(&mut graph, &record));
    }

    assert!(graph.contains("a.example.com/x"));
    assert!(graph.contains("b.example.org/y"));
    assert_eq!(graph.order(), 6);
    assert_eq!(graph.size(), 4);
    assert_eq!(builder.skipped_url(), 0);
}

#[test]
fn test_redirect_with_no_usable_side_is_skipped() {
    let mut graph = Graph::new();
    let mut builder = GraphBuilder::default();
    let record = Record::Redirect {
        url: "ftp://files.example.com/a".to_string(),
        redirect_url: String::new(),
    };

    assert!(!builder.process_record(&mut graph, &record));
    assert!(graph.is_empty());
    assert_eq!(builder.skipped_url(), 1);
}

#[test]
fn test_event_after_redirect_fills_details() {
    let mut graph = Graph::new();
    ensure_hierarchy(&mut graph, "https://a.example.com/x");
    assert!(graph.node("a.example.com/x").unwrap().resource.is_none());

    let mut record = EventRecord::new("https://a.example.com/x");
    record.method = Some("GET".to_string());
    GraphBuilder::default().process_record(&mut graph, &Record::Event(record));

    let attrs = graph.node("a.example.com/x").unwrap().resource.clone().unwrap();
    assert_eq!(attrs.method.as_deref(), Some("GET"));
}

// ============================================================================
// Initiator and Referer Tests
// ============================================================================

#[test]
fn test_initiator_links_from_origin_host() {
    let mut record = EventRecord::new("https://cdn.other.net/lib.js");
    record.initiator = Some("https://www.example.com".to_string());
    record.referer = Some("https://ignored.example.org/page".to_string());
    let (graph, _) = build(&[Record::Event(record)]);

    assert!(graph.edge_between("www.example.com", "cdn.other.net/lib.js").is_some());
    assert!(graph.edge_between("example.com.", "www.example.com").is_some());
    assert!(!graph.contains("ignored.example.org"));
}

#[test]
fn test_referer_links_from_known_page() {
    let mut record = EventRecord::new("https://cdn.other.net/a.js");
    record.referer = Some("https://www.example.com/page".to_string());
    let (graph, _) = build(&[event("https://www.example.com/page"), Record::Event(record)]);

    assert!(graph.edge_between("www.example.com/page", "cdn.other.net/a.js").is_some());
    assert!(graph.edge_between("www.example.com", "cdn.other.net/a.js").is_none());
}

#[test]
fn test_referer_links_from_host_when_page_unknown() {
    let mut record = EventRecord::new("https://cdn.other.net/a.js");
    record.referer = Some("https://www.example.com/page".to_string());
    let (graph, _) = build(&[Record::Event(record)]);

    assert!(graph.edge_between("www.example.com", "cdn.other.net/a.js").is_some());
    assert!(!graph.contains("www.example.com/page"));
}

#[test]
fn test_bad_initiator_does_not_abort_record() {
    let mut record = EventRecord::new("https://a.example.com/x");
    record.initiator = Some("chrome-extension://abc".to_string());
    let (graph, builder) = build(&[Record::Event(record)]);

    assert_eq!(graph.order(), 4);
    assert_eq!(graph.size(), 3);
    assert_eq!(builder.skipped_url(), 0);
}

// ============================================================================
// Optional Node Tests
// ============================================================================

#[test]
fn test_ip_node_when_enabled() {
    let mut record = EventRecord::new("https://a.example.com/x");
    record.ip = Some("93.184.216.34".to_string());
    let options = BuilderOptions {
        include_ip: true,
        ..Default::default()
    };
    let (graph, _) = build_with(options, &[Record::Event(record)]);

    let ip = graph.node("93.184.216.34").unwrap();
    assert_eq!(ip.node_type, NodeType::Ip);
    assert_eq!(ip.size, 3.5);
    assert_eq!(ip.domain, "example.com.");
    assert!(graph.edge_between("a.example.com", "93.184.216.34").is_some());
}

#[test]
fn test_params_node_when_enabled() {
    let options = BuilderOptions {
        include_params: true,
        ..Default::default()
    };
    let (graph, _) = build_with(options, &[event("https://a.example.com/x?q=1&p=2")]);

    let params = graph.node("a.example.com/x?q=1&p=2").unwrap();
    assert_eq!(params.node_type, NodeType::Params);
    assert_eq!(params.size, 2.0);
    assert!(graph.edge_between("a.example.com/x", "a.example.com/x?q=1&p=2").is_some());
}

#[test]
fn test_optional_nodes_off_by_default() {
    let mut record = EventRecord::new("https://a.example.com/x?q=1");
    record.ip = Some("93.184.216.34".to_string());
    let (graph, _) = build(&[Record::Event(record)]);
    assert_eq!(graph.order(), 4);
}
