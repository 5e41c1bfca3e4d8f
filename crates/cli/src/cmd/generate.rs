//! Implementation of the `credforge generate` command.
//!
//! Loads the definitions file and resolves every definition against the
//! store. Stored variables are left untouched; missing ones are generated and
//! persisted one at a time, so a failure keeps everything generated before it.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use credforge_lib::definition::load_definitions;
use credforge_lib::store::VarStore;

use crate::output::{print_stat, print_success};

pub fn cmd_generate(def_file: &Path, var_store: &Path) -> Result<()> {
  let definitions = load_definitions(def_file)
    .with_context(|| format!("Failed to load definitions: {}", def_file.display()))?;
  info!(count = definitions.len(), path = %def_file.display(), "loaded definitions");

  let store = VarStore::open(var_store);
  let before = store.list().context("Failed to read variables store")?.len();

  store
    .resolve_all(&definitions)
    .with_context(|| format!("Failed to generate variables into {}", var_store.display()))?;

  let after = store.list().context("Failed to read variables store")?.len();

  print_success(&format!("Variables written to {}", var_store.display()));
  print_stat("Definitions", &definitions.len().to_string());
  print_stat("Generated", &after.saturating_sub(before).to_string());
  print_stat("Stored", &after.to_string());

  Ok(())
}
