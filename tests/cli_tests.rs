use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn connector_gen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_connector-gen"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("CONNECTOR_GEN_BASE_URL")
        .env_remove("CONNECTOR_GEN_SOURCE_NAME")
        .env_remove("CONNECTOR_GEN_HEADERS")
        .output()
        .expect("run connector-gen")
}

#[test]
fn test_list_paths() {
    let petstore = fixture("petstore.yaml");
    let out = connector_gen(&[petstore.to_str().unwrap(), "--list-paths", "--filter", "^/pets"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "get:/pets\npost:/pets\nget:/pets/{petId}\ndelete:/pets/{petId}\n"
    );
}

#[test]
fn test_generate_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("schema.graphql");
    let petstore = fixture("petstore.yaml");
    let out = connector_gen(&[
        petstore.to_str().unwrap(),
        "--skip-selection",
        "--filter",
        "^/payments",
        "--source-name",
        "payments",
        "--header",
        "Authorization: Bearer {$config.token}",
        "--output",
        target.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());

    let schema = fs::read_to_string(&target).unwrap();
    assert!(schema.contains("@source(name: \"payments\""));
    assert!(schema.contains("  listPayments: [Payment]\n"));
    assert!(schema.contains("{ name: \"Authorization\", value: \"Bearer {$config.token}\" }"));
    assert!(!schema.contains("listPets"));
}

#[test]
fn test_print_then_replay_selections() {
    let dir = tempfile::tempdir().unwrap();
    let petstore = fixture("petstore.yaml");
    let printed = connector_gen(&[
        petstore.to_str().unwrap(),
        "--skip-selection",
        "--filter",
        "^/owners",
        "--print-selections",
    ]);
    assert!(printed.status.success());
    let paths: Vec<String> = serde_json::from_slice(&printed.stdout).unwrap();
    assert!(paths.iter().all(|p| p.starts_with("get:/owners/{ownerId}>")));

    let file = dir.path().join("selections.json");
    fs::write(&file, &printed.stdout).unwrap();
    let replayed = connector_gen(&[petstore.to_str().unwrap(), "--selections", file.to_str().unwrap()]);
    assert!(replayed.status.success());

    let direct = connector_gen(&[
        petstore.to_str().unwrap(),
        "--skip-selection",
        "--filter",
        "^/owners",
    ]);
    assert_eq!(replayed.stdout, direct.stdout);
}

#[test]
fn test_exit_codes() {
    let swagger = fixture("swagger2.json");
    let out = connector_gen(&[swagger.to_str().unwrap(), "--skip-selection"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unsupported document version"));

    let dangling = fixture("dangling_ref.yaml");
    let out = connector_gen(&[dangling.to_str().unwrap(), "--skip-selection"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("does not resolve"));

    let out = connector_gen(&[dangling.to_str().unwrap(), "--skip-selection", "--skip-validation"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing reference"));

    let out = connector_gen(&["/nonexistent/api.yaml", "--skip-selection"]);
    assert_eq!(out.status.code(), Some(3));
}
