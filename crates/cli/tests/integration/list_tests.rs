use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn list_empty_store() {
  let env = TestEnv::new();

  env
    .credforge_cmd()
    .arg("list")
    .arg("-s")
    .arg(&env.store_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("No variables stored"));
}

#[test]
fn list_shows_stored_names() {
  let env = TestEnv::new();
  env.write_store("alpha: one\nbeta:\n  nested: two\n");

  env
    .credforge_cmd()
    .arg("list")
    .arg("-s")
    .arg(&env.store_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("alpha"))
    .stdout(predicate::str::contains("beta"))
    .stdout(predicate::str::contains("nested").not());
}

#[test]
fn list_json_output_is_valid() {
  let env = TestEnv::new();
  env.write_store("alpha: one\nbeta: two\n");

  let output = env
    .credforge_cmd()
    .arg("list")
    .arg("-s")
    .arg(&env.store_path)
    .args(["-o", "json"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["variables"], serde_json::json!(["alpha", "beta"]));
}
