use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use credforge_lib::store::VarStore;

use crate::output::{OutputFormat, print_info, print_json, symbols};

#[derive(Serialize)]
struct ListOutput {
  variables: Vec<String>,
}

pub fn cmd_list(var_store: &Path, output: OutputFormat) -> Result<()> {
  let store = VarStore::open(var_store);
  let variables: Vec<String> = store
    .list()
    .with_context(|| format!("Failed to read variables store: {}", var_store.display()))?
    .into_iter()
    .map(|def| def.name)
    .collect();

  if output.is_json() {
    return print_json(&ListOutput { variables });
  }

  if variables.is_empty() {
    print_info("No variables stored.");
    return Ok(());
  }

  for name in &variables {
    println!("  {} {}", symbols::INFO, name);
  }
  Ok(())
}
