use connector_gen::context::Context;
use connector_gen::document::{load_document, Document, LoadOptions};
use connector_gen::error::GenError;
use connector_gen::graph::Graph;
use connector_gen::selection::{list_paths, resolve, resolve_leaves, Collector, SelectionPath};
use std::path::Path;

fn petstore() -> Document {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/petstore.yaml");
    load_document(&path, &LoadOptions::default()).unwrap()
}

#[test]
fn test_list_paths_in_document_order() {
    let doc = petstore();
    let graph = Graph::from_document(&doc);
    assert_eq!(
        list_paths(&graph),
        vec![
            "get:/pets",
            "post:/pets",
            "get:/pets/{petId}",
            "delete:/pets/{petId}",
            "get:/owners/{ownerId}",
            "get:/payments",
        ]
    );
}

#[test]
fn test_deep_wildcard_round_trip() {
    let doc = petstore();
    let mut graph = Graph::from_document(&doc);
    let mut ctx = Context::new(&doc);
    let collection = Collector::new()
        .collect(&mut graph, &mut ctx, &["get:/owners/{ownerId}>**"])
        .unwrap();
    assert!(!collection.paths.is_empty());

    for (path, leaf) in collection.paths.iter().zip(&collection.leaves) {
        let parsed = SelectionPath::parse(path);
        assert!(parsed.wildcard.is_none());
        assert_eq!(resolve(&mut graph, &mut ctx, &parsed).unwrap(), *leaf, "{path}");
    }

    // Replaying the concrete paths selects the same leaves.
    let replay: Vec<String> = collection.paths.iter().cloned().collect();
    let mut graph2 = Graph::from_document(&doc);
    let mut ctx2 = Context::new(&doc);
    let again = Collector::new().collect(&mut graph2, &mut ctx2, &replay).unwrap();
    assert_eq!(again.paths, collection.paths);
}

#[test]
fn test_direct_wildcard_skips_nested_properties() {
    let doc = petstore();
    let mut graph = Graph::from_document(&doc);
    let mut ctx = Context::new(&doc);
    let path = SelectionPath::parse("get:/owners/{ownerId}>res:200>ref:#/c/s/Owner>obj:Owner>*");
    let leaves = resolve_leaves(&mut graph, &mut ctx, &path).unwrap();
    let names: Vec<String> = leaves.iter().map(|l| graph.node(*l).id()).collect();
    assert_eq!(names, vec!["prop:circ:manager", "prop:scalar:name"]);
}

#[test]
fn test_unknown_segment_lists_alternatives() {
    let doc = petstore();
    let mut graph = Graph::from_document(&doc);
    let mut ctx = Context::new(&doc);
    let err = Collector::new()
        .collect(&mut graph, &mut ctx, &["get:/pets/{petId}>res:404"])
        .unwrap_err();
    match err {
        GenError::PathNotFound {
            matched, available, ..
        } => {
            assert_eq!(matched, "get:/pets/{petId}");
            assert_eq!(
                available,
                vec!["param:petId", "param:X-Trace-Id", "res:200"]
            );
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = Collector::new()
        .collect(&mut graph, &mut ctx, &["put:/pets"])
        .unwrap_err();
    assert!(matches!(err, GenError::PathNotFound { ref matched, .. } if matched.is_empty()));
}
