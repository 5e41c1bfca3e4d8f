//! End-to-end resolution against a real store file.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use credforge_lib::{Value, VarStore, VariableDefinition, parse_definitions};
use tempfile::TempDir;
use x509_parser::pem::parse_x509_pem;

const CA_AND_LEAF: &str = r#"
- name: ca
  type: certificate
  options:
    common_name: e2e-ca
    is_ca: true
- name: leaf
  type: certificate
  options:
    ca: ca
    common_name: leaf.e2e
    alternative_names: [leaf.e2e]
"#;

fn field(value: &Value, name: &str) -> String {
  value.get(name).and_then(Value::as_str).unwrap().to_string()
}

fn assert_signed_by(leaf_pem: &str, ca_pem: &str) {
  let (_, leaf) = parse_x509_pem(leaf_pem.as_bytes()).unwrap();
  let (_, ca) = parse_x509_pem(ca_pem.as_bytes()).unwrap();
  let leaf = leaf.parse_x509().unwrap();
  let ca = ca.parse_x509().unwrap();

  assert_eq!(leaf.issuer().to_string(), ca.subject().to_string());
  leaf.verify_signature(Some(ca.public_key())).unwrap();
}

#[test]
fn leaf_is_signed_by_ca_from_same_run() {
  let temp = TempDir::new().unwrap();
  let store = VarStore::open(temp.path().join("vars.yml"));

  store.resolve_all(&parse_definitions(CA_AND_LEAF).unwrap()).unwrap();

  let names: Vec<String> = store.list().unwrap().into_iter().map(|d| d.name).collect();
  assert_eq!(names, vec!["ca", "leaf"]);

  let ca = store.get(&VariableDefinition::lookup("ca")).unwrap().unwrap();
  let leaf = store.get(&VariableDefinition::lookup("leaf")).unwrap().unwrap();

  assert_eq!(field(&leaf, "ca"), field(&ca, "certificate"));
  assert_signed_by(&field(&leaf, "certificate"), &field(&ca, "certificate"));
}

#[test]
fn leaf_signs_with_base64_stored_ca() {
  let temp = TempDir::new().unwrap();
  let store = VarStore::open(temp.path().join("vars.yml"));

  let definitions = parse_definitions(&CA_AND_LEAF.replacen("is_ca: true", "is_ca: true\n    base64: true", 1)).unwrap();
  store.resolve_all(&definitions).unwrap();

  let ca = store.get(&VariableDefinition::lookup("ca")).unwrap().unwrap();
  let ca_pem = String::from_utf8(STANDARD.decode(field(&ca, "certificate")).unwrap()).unwrap();

  let leaf = store.get(&VariableDefinition::lookup("leaf")).unwrap().unwrap();
  assert_signed_by(&field(&leaf, "certificate"), &ca_pem);
}

#[test]
fn second_run_changes_nothing() {
  let temp = TempDir::new().unwrap();
  let path = temp.path().join("vars.yml");
  let definitions = parse_definitions(CA_AND_LEAF).unwrap();

  VarStore::open(&path).resolve_all(&definitions).unwrap();
  let first = std::fs::read_to_string(&path).unwrap();

  VarStore::open(&path).resolve_all(&definitions).unwrap();
  assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
}
