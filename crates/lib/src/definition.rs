//! Variable definitions and the definitions file loader.
//!
//! A definitions file is YAML, either a bare list or a manifest with a
//! top-level `variables` list:
//!
//! ```yaml
//! variables:
//! - name: ca
//!   type: certificate
//!   options:
//!     is_ca: true
//!     common_name: internal-ca
//! - name: admin_password
//!   type: password
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Value;

/// A named request for a credential.
///
/// An empty `type_` makes the definition a pure lookup that never generates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
  pub name: String,

  #[serde(rename = "type", default)]
  pub type_: String,

  #[serde(default)]
  pub options: Value,
}

impl VariableDefinition {
  pub fn new(name: &str, type_: &str, options: Value) -> Self {
    Self {
      name: name.to_string(),
      type_: type_.to_string(),
      options,
    }
  }

  /// A lookup-only definition carrying just a name.
  pub fn lookup(name: &str) -> Self {
    Self {
      name: name.to_string(),
      ..Self::default()
    }
  }

  pub fn is_lookup(&self) -> bool {
    self.type_.is_empty()
  }
}

/// Errors that can occur while loading definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
  #[error("failed to read definitions file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse definitions: {0}")]
  Parse(#[source] serde_yaml::Error),

  #[error("definition #{0} has an empty name")]
  EmptyName(usize),

  #[error("variable '{0}' is defined more than once")]
  DuplicateName(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionsDocument {
  List(Vec<VariableDefinition>),
  Manifest { variables: Vec<VariableDefinition> },
}

/// Read and validate the definitions file at `path`.
pub fn load_definitions(path: &Path) -> Result<Vec<VariableDefinition>, DefinitionError> {
  let content = fs::read_to_string(path).map_err(|source| DefinitionError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_definitions(&content)
}

/// Parse and validate definitions from YAML text.
///
/// An empty document yields no definitions.
pub fn parse_definitions(content: &str) -> Result<Vec<VariableDefinition>, DefinitionError> {
  if content.trim().is_empty() {
    return Ok(Vec::new());
  }

  let definitions = match serde_yaml::from_str(content).map_err(DefinitionError::Parse)? {
    DefinitionsDocument::List(list) => list,
    DefinitionsDocument::Manifest { variables } => variables,
  };

  let mut seen = HashSet::new();
  for (index, def) in definitions.iter().enumerate() {
    if def.name.is_empty() {
      return Err(DefinitionError::EmptyName(index));
    }
    if !seen.insert(def.name.as_str()) {
      return Err(DefinitionError::DuplicateName(def.name.clone()));
    }
  }

  Ok(definitions)
}
