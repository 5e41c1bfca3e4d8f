use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn get_prints_string_value() {
  let env = TestEnv::new();
  env.write_store("db_password: hunter2\n");

  env
    .credforge_cmd()
    .args(["get", "db_password", "-s"])
    .arg(&env.store_path)
    .assert()
    .success()
    .stdout("hunter2\n");
}

#[test]
fn get_prints_nested_value_as_yaml() {
  let env = TestEnv::new();
  env.write_store("key:\n  private_key: secret\n  public_key: shared\n");

  env
    .credforge_cmd()
    .args(["get", "key", "-s"])
    .arg(&env.store_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("private_key: secret"))
    .stdout(predicate::str::contains("public_key: shared"));
}

#[test]
fn get_json_output() {
  let env = TestEnv::new();
  env.write_store("key:\n  public_key: shared\n");

  let output = env
    .credforge_cmd()
    .args(["get", "key", "-o", "json", "-s"])
    .arg(&env.store_path)
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["public_key"], "shared");
}

#[test]
fn get_missing_variable_fails_without_writing() {
  let env = TestEnv::new();

  env
    .credforge_cmd()
    .args(["get", "absent", "-s"])
    .arg(&env.store_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("'absent' not found"));

  assert!(!env.store_path.exists());
}
