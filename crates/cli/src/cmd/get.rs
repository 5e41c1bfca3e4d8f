//! Implementation of the `credforge get` command.
//!
//! A lookup only: a missing variable is reported, never generated.

use std::path::Path;

use anyhow::{Context, Result, bail};

use credforge_lib::definition::VariableDefinition;
use credforge_lib::store::VarStore;

use crate::output::{OutputFormat, print_json};

pub fn cmd_get(var_store: &Path, name: &str, output: OutputFormat) -> Result<()> {
  let store = VarStore::open(var_store);

  let Some(value) = store
    .get(&VariableDefinition::lookup(name))
    .with_context(|| format!("Failed to read variables store: {}", var_store.display()))?
  else {
    bail!("Variable '{}' not found in {}", name, var_store.display());
  };

  if output.is_json() {
    return print_json(&value);
  }

  match value.as_str() {
    Some(text) => println!("{}", text),
    None => {
      let yaml = serde_yaml::to_string(&value).context("Failed to serialize variable")?;
      print!("{}", yaml);
    }
  }
  Ok(())
}
