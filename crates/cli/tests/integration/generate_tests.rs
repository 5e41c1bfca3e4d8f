use predicates::prelude::*;
use x509_parser::pem::parse_x509_pem;

use super::common::{TestEnv, fixture_path};

fn string_field<'a>(store: &'a serde_yaml::Mapping, name: &str, field: &str) -> &'a str {
  store[name][field].as_str().unwrap()
}

#[test]
fn generate_creates_store_with_passwords() {
  let env = TestEnv::new();

  env
    .generate("passwords.yml")
    .assert()
    .success()
    .stdout(predicate::str::contains("Generated: 2"));

  let store = env.store();
  assert_eq!(store["db_password"].as_str().unwrap().len(), 32);
  assert_eq!(store["api_token"].as_str().unwrap().len(), 20);
}

#[test]
fn generate_twice_leaves_store_unchanged() {
  let env = TestEnv::new();

  env.generate("passwords.yml").assert().success();
  let first = env.read_store();

  env
    .generate("passwords.yml")
    .assert()
    .success()
    .stdout(predicate::str::contains("Generated: 0"));
  assert_eq!(env.read_store(), first);
}

#[test]
fn generate_keeps_existing_values() {
  let env = TestEnv::new();
  env.write_store("db_password: hunter2\nunrelated: kept\n");

  env.generate("passwords.yml").assert().success();

  let store = env.store();
  assert_eq!(store["db_password"].as_str(), Some("hunter2"));
  assert_eq!(store["unrelated"].as_str(), Some("kept"));
  assert!(store.contains_key("api_token"));
}

#[test]
fn generate_signs_leaf_with_stored_ca() {
  let env = TestEnv::new();

  env.generate("certificates.yml").assert().success();

  let store = env.store();
  let (_, ca_pem) = parse_x509_pem(string_field(&store, "ca", "certificate").as_bytes()).unwrap();
  let (_, leaf_pem) = parse_x509_pem(string_field(&store, "server", "certificate").as_bytes()).unwrap();
  let ca = ca_pem.parse_x509().unwrap();
  let leaf = leaf_pem.parse_x509().unwrap();

  assert_eq!(leaf.issuer().to_string(), "CN=credforge-test-ca");
  leaf.verify_signature(Some(ca.public_key())).unwrap();
  assert_eq!(
    string_field(&store, "server", "ca"),
    string_field(&store, "ca", "certificate")
  );

  // base64 output keeps the same fields, with every leaf encoded
  let wrapped = string_field(&store, "server_b64", "certificate");
  assert!(!wrapped.contains("BEGIN CERTIFICATE"));
  assert!(store["server_b64"]["private_key"].is_string());
  assert!(store["server_b64"]["ca"].is_string());
}

#[test]
fn generate_unknown_type_fails_after_persisting_earlier_variables() {
  let env = TestEnv::new();

  env
    .generate("unknown_type.yml")
    .assert()
    .failure()
    .stderr(predicate::str::contains("mystery"))
    .stderr(predicate::str::contains("hologram"));

  let store = env.store();
  assert!(store.contains_key("db_password"));
  assert!(!store.contains_key("mystery"));
}

#[test]
fn generate_reads_paths_from_environment() {
  let env = TestEnv::new();

  env
    .credforge_cmd()
    .arg("generate")
    .env("CREDFORGE_DEF_FILE", fixture_path("passwords.yml"))
    .env("CREDFORGE_VAR_STORE", &env.store_path)
    .assert()
    .success();

  assert!(env.store().contains_key("db_password"));
}

#[test]
fn generate_missing_definitions_file_fails() {
  let env = TestEnv::new();

  env
    .generate("does_not_exist.yml")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load definitions"));

  assert!(!env.store_path.exists());
}

#[test]
fn generate_rejects_non_mapping_store() {
  let env = TestEnv::new();
  env.write_store("- just\n- a list\n");

  env.generate("passwords.yml").assert().failure();

  assert_eq!(env.read_store(), "- just\n- a list\n");
}
