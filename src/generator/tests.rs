use super::*;
use crate::config::{GeneratorConfig, StaticHeader};
use crate::context::{Context, WarningKind};
use crate::document::Document;
use crate::graph::Graph;
use crate::selection::Collector;
use serde_json::{json, Value};

fn document(paths: Value, schemas: Value) -> Document {
    Document::from_value(json!({
        "openapi": "3.0.3",
        "info": { "title": "Test", "version": "1" },
        "servers": [{ "url": "https://petstore.example.com/v1" }],
        "paths": paths,
        "components": { "schemas": schemas }
    }))
}

fn get_json(operation_id: &str, schema: Value) -> Value {
    json!({
        "get": {
            "operationId": operation_id,
            "responses": {
                "200": { "description": "ok", "content": { "application/json": { "schema": schema } } }
            }
        }
    })
}

fn run(doc: &Document, selections: &[&str]) -> String {
    generate_schema(doc, selections, &GeneratorConfig::default()).unwrap()
}

fn pet_schemas() -> Value {
    json!({
        "Pet": {
            "type": "object",
            "required": ["id", "name"],
            "properties": {
                "id": { "type": "integer" },
                "name": { "type": "string" },
                "category": {
                    "type": "object",
                    "properties": { "id": { "type": "integer" }, "name": { "type": "string" } }
                }
            }
        }
    })
}

#[test]
fn test_two_field_selection() {
    let doc = document(
        json!({
            "/pets/{petId}": {
                "get": {
                    "operationId": "getPetById",
                    "parameters": [
                        { "name": "petId", "in": "path", "required": true, "schema": { "type": "integer" } }
                    ],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                        }
                    }
                }
            }
        }),
        pet_schemas(),
    );
    let out = run(
        &doc,
        &[
            "get:/pets/{petId}>res:200>ref:#/c/s/Pet>obj:Pet>prop:scalar:id",
            "get:/pets/{petId}>res:200>ref:#/c/s/Pet>obj:Pet>prop:scalar:name",
        ],
    );
    let expected = r#"extend schema
  @link(url: "https://specs.apollo.dev/federation/v2.10", import: ["@key"])
  @link(url: "https://specs.apollo.dev/connect/v0.1", import: ["@connect", "@source"])
  @source(name: "api", http: { baseURL: "https://petstore.example.com/v1" })

type Pet {
  id: Int
  name: String
}

type Query {
  getPetById(petId: Int!): Pet
    @connect(
      source: "api"
      http: { GET: "/pets/{$args.petId}" }
      selection: """
      id
      name
      """
    )
}
"#;
    assert_eq!(out, expected);
}

#[test]
fn test_output_is_deterministic() {
    let doc = document(
        json!({
            "/pets": get_json("listPets", json!({ "type": "array", "items": { "$ref": "#/components/schemas/Pet" } })),
            "/pets/{petId}": get_json("getPet", json!({ "$ref": "#/components/schemas/Pet" }))
        }),
        pet_schemas(),
    );
    let selections = ["get:/pets>**", "get:/pets/{petId}>res:200>*"];
    let first = run(&doc, &selections);
    let second = run(&doc, &selections);
    assert_eq!(first, second);
    assert!(first.contains("listPets: [Pet]"));
    // Both operations share `obj:Pet`; their selected fields merge.
    assert_eq!(first.matches("type Pet {").count(), 1);
    assert!(first.contains("  category: Category\n"));
}

fn collision_doc() -> Document {
    document(
        json!({
            "/pets": get_json("getPet", json!({ "$ref": "#/components/schemas/Pet" })),
            "/stores": get_json("getStore", json!({ "$ref": "#/components/schemas/Store" })),
            "/shops": get_json("getShop", json!({ "$ref": "#/components/schemas/Shop" }))
        }),
        json!({
            "Pet": {
                "type": "object",
                "properties": {
                    "category": { "type": "object", "properties": { "id": { "type": "integer" }, "name": { "type": "string" } } }
                }
            },
            "Store": {
                "type": "object",
                "properties": {
                    "category": { "type": "object", "properties": { "code": { "type": "string" } } }
                }
            },
            "Shop": {
                "type": "object",
                "properties": {
                    "category": { "type": "object", "properties": { "id": { "type": "integer" }, "name": { "type": "string" } } }
                }
            }
        }),
    )
}

#[test]
fn test_name_collisions_are_stable() {
    let doc = collision_doc();
    let selections = ["get:/pets>**", "get:/stores>**", "get:/shops>**"];
    let first = run(&doc, &selections);
    assert!(first.contains("type Category {\n  id: Int\n  name: String\n}"));
    assert!(first.contains("type StoreCategory {\n  code: String\n}"));
    // Identical shapes share one declaration.
    assert_eq!(first.matches("type Category {").count(), 1);
    assert!(first.contains("type Shop {\n  category: Category\n}"));
    for _ in 0..3 {
        assert_eq!(run(&doc, &selections), first);
    }
}

#[test]
fn test_assign_names_prefers_components() {
    let doc = collision_doc();
    let mut graph = Graph::from_document(&doc);
    let mut ctx = Context::new(&doc);
    let collection = Collector::new()
        .collect(&mut graph, &mut ctx, &["get:/stores>**", "get:/pets>**"])
        .unwrap();
    let mut builder = TypeBuilder::new(&mut graph, &mut ctx, &collection);
    builder.declare_containers().unwrap();
    let (decls, _) = builder.finish();
    let names = assign_names(&graph, &ctx, &decls);
    let by_key: Vec<(String, String)> = decls
        .iter()
        .zip(&names.names)
        .map(|(d, n)| (d.key.clone(), n.clone()))
        .collect();
    assert!(by_key.contains(&("obj:[Store.category]".to_string(), "Category".to_string())));
    assert!(by_key.contains(&("obj:[Pet.category]".to_string(), "PetCategory".to_string())));
    assert!(by_key.contains(&("obj:Pet".to_string(), "Pet".to_string())));
}

fn dog_doc(with_named_operation: bool) -> Document {
    let mut paths = json!({
        "/dogs": get_json("getDog", json!({ "$ref": "#/components/schemas/Dog" }))
    });
    if with_named_operation {
        paths["/named"] = get_json("getNamed", json!({ "$ref": "#/components/schemas/Named" }));
    }
    document(
        paths,
        json!({
            "Named": { "type": "object", "properties": { "name": { "type": "string" } } },
            "Dog": {
                "allOf": [
                    { "$ref": "#/components/schemas/Named" },
                    { "type": "object", "properties": { "bark": { "type": "boolean" } } }
                ]
            }
        }),
    )
}

#[test]
fn test_absorbed_component_is_pruned() {
    let doc = dog_doc(false);
    let out = run(&doc, &["get:/dogs>**"]);
    assert!(out.contains("type Dog {\n  bark: Boolean\n  name: String\n}"));
    assert!(!out.contains("type Named"));
    assert!(out.contains("      bark\n      name\n"));
}

#[test]
fn test_referenced_component_survives_consolidation() {
    let doc = dog_doc(true);
    let out = run(&doc, &["get:/dogs>**", "get:/named>**"]);
    assert!(out.contains("type Dog {\n  bark: Boolean\n  name: String\n}"));
    assert!(out.contains("type Named {\n  name: String\n}"));
    assert!(out.contains("getNamed: Named"));
}

#[test]
fn test_composed_selection_is_filtered() {
    let doc = dog_doc(false);
    let out = run(
        &doc,
        &["get:/dogs>res:200>ref:#/c/s/Dog>comp:Dog>obj:[Dog#1]>prop:scalar:bark"],
    );
    assert!(out.contains("type Dog {\n  bark: Boolean\n}"));
    assert!(!out.contains("name: String"));
}

#[test]
fn test_synthetic_response_mutation() {
    let doc = document(
        json!({
            "/pets/{petId}": {
                "delete": {
                    "operationId": "deletePet",
                    "parameters": [
                        { "name": "petId", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "responses": { "204": { "description": "deleted" } }
                }
            }
        }),
        json!({}),
    );
    let mut graph = Graph::from_document(&doc);
    let mut ctx = Context::new(&doc);
    let collection = Collector::new()
        .collect(&mut graph, &mut ctx, &["delete:/pets/{petId}"])
        .unwrap();
    let out = generate(&mut graph, &mut ctx, &collection, &GeneratorConfig::default()).unwrap();
    assert!(out.contains("type DeletePetResponse {\n  success: Boolean\n}"));
    assert!(out.contains("type Mutation {\n  deletePet(petId: String!): DeletePetResponse\n"));
    assert!(out.contains("http: { DELETE: \"/pets/{$args.petId}\" }"));
    assert!(out.contains("      success: $(true)\n"));
    assert!(!out.contains("type Query"));
    assert!(ctx
        .warnings()
        .iter()
        .any(|w| w.kind == WarningKind::SyntheticResponse));
}

#[test]
fn test_request_binding() {
    let doc = document(
        json!({
            "/pets": {
                "post": {
                    "operationId": "createPet",
                    "parameters": [
                        { "name": "dryRun", "in": "query", "required": true, "schema": { "type": "boolean" } },
                        { "name": "limit", "in": "query", "schema": { "type": "integer" } },
                        { "name": "X-Request-Id", "in": "header", "schema": { "type": "string" } }
                    ],
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewPet" } } }
                    },
                    "responses": {
                        "201": {
                            "description": "created",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewPet" } } }
                        }
                    }
                }
            }
        }),
        json!({
            "NewPet": {
                "type": "object",
                "required": ["pet_name"],
                "properties": {
                    "pet_name": { "type": "string" },
                    "tags": { "type": "array", "items": { "type": "string" } }
                }
            }
        }),
    );
    let config = GeneratorConfig {
        headers: vec![StaticHeader::parse("Authorization: Bearer {$config.token}").unwrap()],
        ..GeneratorConfig::default()
    };
    let out = generate_schema(&doc, &["post:/pets>**"], &config).unwrap();
    assert!(out.contains("input NewPetInput {\n  petName: String!\n  tags: [String]\n}"));
    assert!(out.contains("type NewPet {\n  petName: String\n  tags: [String]\n}"));
    assert!(out.contains(
        "createPet(dryRun: Boolean!, limit: Int, xRequestId: String, input: NewPetInput!): NewPet"
    ));
    let expected_directive = r#"    @connect(
      source: "api"
      http: {
        POST: "/pets?dryRun={$args.dryRun}"
        headers: [
          { name: "X-Request-Id", value: "{$args.xRequestId}" }
          { name: "Authorization", value: "Bearer {$config.token}" }
        ]
        body: """
        $args.input {
          pet_name: petName
          tags
        }
        """
      }
      selection: """
      petName: pet_name
      tags
      """
    )"#;
    assert!(out.contains(expected_directive), "{out}");
}

#[test]
fn test_circular_field_is_commented() {
    let doc = document(
        json!({ "/animals": get_json("getAnimal", json!({ "$ref": "#/components/schemas/Animal" })) }),
        json!({
            "Animal": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "friend": { "$ref": "#/components/schemas/Animal" }
                }
            }
        }),
    );
    let out = run(&doc, &["get:/animals>**"]);
    assert!(out.contains("type Animal {\n  name: String\n}"));
    assert!(out.contains("      # Circular reference: friend\n      name\n"));
}

#[test]
fn test_names_aliases_and_scalars() {
    let doc = document(
        json!({
            "/people": get_json("getPerson", json!({
                "type": "object",
                "properties": {
                    "__typename": { "type": "string" },
                    "first-name": { "type": "string" },
                    "status": { "type": "string", "enum": ["available", "sold"] },
                    "stock": { "type": "string", "enum": ["in-stock", "gone"] },
                    "things": { "type": "array" },
                    "extra": { "type": "object", "additionalProperties": true }
                }
            })),
            "/count": get_json("getCount", json!({ "type": "integer" }))
        }),
        json!({}),
    );
    let mut graph = Graph::from_document(&doc);
    let mut ctx = Context::new(&doc);
    let collection = Collector::new()
        .collect(&mut graph, &mut ctx, &["get:/people>**", "get:/count"])
        .unwrap();
    let out = generate(&mut graph, &mut ctx, &collection, &GeneratorConfig::default()).unwrap();

    assert!(out.contains("scalar JSON\n"));
    assert!(out.contains("enum Status {\n  available\n  sold\n}"));
    assert!(out.contains("type GetPersonResponse {\n"));
    assert!(out.contains("  reservedField: String # \"__typename\" is a reserved name\n"));
    assert!(out.contains("  firstName: String\n"));
    assert!(out.contains("  status: Status\n"));
    assert!(out.contains("  stock: String\n"));
    assert!(out.contains("  things: [JSON] # element type could not be derived\n"));
    assert!(out.contains("  extra: JSON\n"));
    assert!(out.contains("      firstName: \"first-name\"\n"));
    assert!(out.contains("      reservedField: __typename # \"__typename\" is a reserved name\n"));
    assert!(out.contains("  getCount: Int\n"));
    assert!(out.contains("      $\n"));

    let kinds: Vec<WarningKind> = ctx.warnings().iter().map(|w| w.kind).collect();
    assert!(kinds.contains(&WarningKind::MissingItems));
    assert!(kinds.contains(&WarningKind::EnumFallback));
}

#[test]
fn test_path_template() {
    let args = vec![
        ArgDecl {
            name: "petId".to_string(),
            location: Some(crate::graph::ParamLocation::Path),
            wire_name: "pet_id".to_string(),
            ty: TypeRef::Scalar(crate::graph::ScalarType::String),
            required: true,
            description: None,
        },
        ArgDecl {
            name: "q".to_string(),
            location: Some(crate::graph::ParamLocation::Query),
            wire_name: "q".to_string(),
            ty: TypeRef::Scalar(crate::graph::ScalarType::String),
            required: true,
            description: None,
        },
    ];
    assert_eq!(
        path_template("/pets/{pet_id}/photos", &args),
        "/pets/{$args.petId}/photos?q={$args.q}"
    );
}

#[test]
fn test_source_values_are_escaped() {
    let doc = document(
        json!({ "/pets": get_json("listPets", json!({ "type": "string" })) }),
        json!({}),
    );
    let config = GeneratorConfig {
        source_name: r#"pets"v2\"#.to_string(),
        base_url: Some(r#"https://api.example.com/"quoted""#.to_string()),
        ..GeneratorConfig::default()
    };
    let out = generate_schema(&doc, &["get:/pets>**"], &config).unwrap();
    assert!(out.contains(
        r#"@source(name: "pets\"v2\\", http: { baseURL: "https://api.example.com/\"quoted\"" })"#
    ));
    assert!(out.contains(r#"      source: "pets\"v2\\""#));
}

#[test]
fn test_operation_rejects_other_nodes() {
    let doc = document(
        json!({ "/pets": get_json("listPets", json!({ "type": "string" })) }),
        json!({}),
    );
    let mut graph = Graph::from_document(&doc);
    let mut ctx = Context::new(&doc);
    let collection = Collector::new()
        .collect(&mut graph, &mut ctx, &["get:/pets>**"])
        .unwrap();
    let response = crate::graph::expand(&mut graph, &mut ctx, collection.operations[0]).unwrap()[0];
    let mut builder = TypeBuilder::new(&mut graph, &mut ctx, &collection);
    match builder.operation(response) {
        Err(crate::error::GenError::NotAnOperation { path }) => {
            assert_eq!(path, "get:/pets>res:200")
        }
        other => panic!("expected NotAnOperation, got {other:?}"),
    }
}

#[test]
fn test_root_arrays_without_items_are_commented() {
    let doc = document(
        json!({
            "/things": get_json("listThings", json!({ "type": "array" })),
            "/tags": {
                "post": {
                    "operationId": "addTags",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "type": "array" } } }
                    },
                    "responses": { "204": { "description": "done" } }
                }
            }
        }),
        json!({}),
    );
    let mut graph = Graph::from_document(&doc);
    let mut ctx = Context::new(&doc);
    let collection = Collector::new()
        .collect(&mut graph, &mut ctx, &["get:/things>**", "post:/tags>**"])
        .unwrap();
    let out = generate(&mut graph, &mut ctx, &collection, &GeneratorConfig::default()).unwrap();
    assert!(out.contains("  listThings: [JSON] # element type could not be derived\n"));
    assert!(out.contains("addTags(input: [JSON]!): "));
    assert!(out.contains(" # input element type could not be derived\n"));
    let missing = ctx
        .warnings()
        .iter()
        .filter(|w| w.kind == WarningKind::MissingItems)
        .count();
    assert_eq!(missing, 2);
}
