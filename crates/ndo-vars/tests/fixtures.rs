//! Fixture tests
//!
//! Each directory in /tests/fixtures/ holds a set of tables and the document they convert to
//! (`expected.yaml`). If present, `ndo.yaml` holds the same document in the `ndo_schema_data`
//! layout.

use ndo_vars::document::Document;
use ndo_vars::tables::Tables;
use pretty_assertions::assert_eq;
use std::path::Path;

fn read_yaml(path: &Path) -> serde_yaml::Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_yaml::from_str(&text).unwrap()
}

#[test]
fn fixtures() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("NDO_VARS_LOG"))
        .with_writer(std::io::stderr)
        .try_init();

    insta::glob!("fixtures/*/expected.yaml", |path| {
        let dir = path.parent().unwrap();
        let mut tables = Tables::default();
        tables.load_directory(dir).unwrap();

        let document = ndo_vars::convert(&tables).expect("fixture must convert");
        assert_eq!(
            serde_yaml::to_value(&document).unwrap(),
            read_yaml(path),
            "{}",
            dir.display()
        );

        let ndo_path = dir.join("ndo.yaml");
        if ndo_path.is_file() {
            let vars = ndo_vars::ndo::NdoVars::from(&document);
            assert_eq!(serde_yaml::to_value(&vars).unwrap(), read_yaml(&ndo_path));
        }

        // the written document reads back and flattens into equivalent tables
        let parsed: Document =
            serde_yaml::from_str(&serde_yaml::to_string(&document).unwrap()).unwrap();
        assert_eq!(parsed, document);
        let flattened = ndo_vars::flatten::flatten(&parsed);
        assert_eq!(ndo_vars::convert(&flattened).unwrap(), document);
    });
}

#[test]
fn errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("vrfs.csv"), "name,schema,template\nVRF1,S1,T1\n").unwrap();
    std::fs::write(
        dir.path().join("bridge_domains.csv"),
        "name,schema,template,vrf,layer2_stretch,unicast_routing\n\
         BD1,S1,T1,VRF1,true,true\n\
         BD2,S1,T1,VRF1,yes,true\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("anps.csv"), "name,schema,template\n").unwrap();
    std::fs::write(dir.path().join("epgs.csv"), "name,schema,template,ap,bd,description,vrf\n").unwrap();

    let mut tables = Tables::default();
    tables.load_directory(dir.path()).unwrap();
    let error = ndo_vars::convert(&tables).unwrap_err().to_string();

    assert!(error.contains("bridge_domains.csv row 2"), "{error}");
    assert!(error.contains("`yes`"), "{error}");
}

#[test]
fn missing_required_table() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("vrfs.csv"), "name,schema,template\nVRF1,S1,T1\n").unwrap();

    let mut tables = Tables::default();
    tables.load_directory(dir.path()).unwrap();

    assert!(matches!(
        ndo_vars::convert(&tables),
        Err(ndo_vars::Error::MissingTable(_))
    ));
}
