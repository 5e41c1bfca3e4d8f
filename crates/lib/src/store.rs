//! File-backed variables store.
//!
//! The store is a single YAML document mapping variable names to values. Every
//! query re-reads the file and every mutation rewrites it whole, so the file is
//! always the single source of truth.
//!
//! # Generate on miss
//!
//! [`VarStore::get`] returns a stored value untouched when the name exists,
//! which makes repeated runs idempotent. Missing names are generated only when
//! the definition carries a type; a definition without a type is a lookup that
//! is allowed to miss.
//!
//! # Read-only access
//!
//! Generators that need other variables (a certificate signed by a CA, say) get
//! a [`StoreReader`] at construction time. A reader can load and look up
//! variables but has no way to generate or write them.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::certs::CertLoader;
use crate::definition::VariableDefinition;
use crate::generate::{GenerateError, GeneratorRegistry};
use crate::value::{Mapping, Value, ValueError};

/// Option consumed by the store itself rather than by generators.
pub const BASE64_OPTION: &str = "base64";

/// Errors that can occur while reading, generating, or writing variables.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to read variables file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write variables file {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse variables file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("variables file {path} contains an unsupported value: {source}")]
  Convert {
    path: PathBuf,
    #[source]
    source: ValueError,
  },

  #[error("variables file {path} must contain a mapping, found a {found}")]
  NotAMapping { path: PathBuf, found: &'static str },

  #[error("failed to serialize variables: {0}")]
  Serialize(#[source] serde_yaml::Error),

  #[error("generating variable '{name}': {source}")]
  Generate {
    name: String,
    #[source]
    source: GenerateError,
  },

  #[error("variable '{name}': {source}")]
  Variable {
    name: String,
    #[source]
    source: Box<StoreError>,
  },
}

impl StoreError {
  /// Attach a variable name unless the error already carries one.
  fn for_variable(self, name: &str) -> Self {
    match self {
      StoreError::Generate { .. } | StoreError::Variable { .. } => self,
      other => StoreError::Variable {
        name: name.to_string(),
        source: Box::new(other),
      },
    }
  }
}

/// Read-only access to named variables.
pub trait VariableSource {
  /// Look up a variable without ever generating it.
  fn lookup(&self, name: &str) -> Result<Option<Value>, StoreError>;
}

impl VariableSource for Mapping {
  fn lookup(&self, name: &str) -> Result<Option<Value>, StoreError> {
    Ok(self.get(name).cloned())
  }
}

/// Read-only handle to a variables file.
#[derive(Debug, Clone)]
pub struct StoreReader {
  path: PathBuf,
}

impl StoreReader {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Load every variable from disk.
  ///
  /// A missing or empty file is an empty store.
  pub fn load(&self) -> Result<Mapping, StoreError> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Mapping::new()),
      Err(source) => {
        return Err(StoreError::Read {
          path: self.path.clone(),
          source,
        });
      }
    };

    if content.trim().is_empty() {
      return Ok(Mapping::new());
    }

    let raw: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|source| StoreError::Parse {
      path: self.path.clone(),
      source,
    })?;

    match Value::try_from(raw).map_err(|source| StoreError::Convert {
      path: self.path.clone(),
      source,
    })? {
      Value::Null => Ok(Mapping::new()),
      Value::Mapping(vars) => Ok(vars),
      other => Err(StoreError::NotAMapping {
        path: self.path.clone(),
        found: other.type_name(),
      }),
    }
  }
}

impl VariableSource for StoreReader {
  fn lookup(&self, name: &str) -> Result<Option<Value>, StoreError> {
    Ok(self.load()?.remove(name))
  }
}

/// The credential store: resolves definitions against a variables file,
/// generating whatever is missing.
pub struct VarStore {
  reader: StoreReader,
  registry: GeneratorRegistry,
}

impl VarStore {
  pub fn new(path: impl Into<PathBuf>, registry: GeneratorRegistry) -> Self {
    Self {
      reader: StoreReader::new(path),
      registry,
    }
  }

  /// Open a store with the default generators, whose certificate generator
  /// reads signing CAs back from the same file.
  pub fn open(path: impl Into<PathBuf>) -> Self {
    let reader = StoreReader::new(path);
    let registry = GeneratorRegistry::with_defaults(CertLoader::new(reader.clone()));
    Self { reader, registry }
  }

  pub fn path(&self) -> &Path {
    self.reader.path()
  }

  /// A read-only handle to the same file.
  pub fn reader(&self) -> StoreReader {
    self.reader.clone()
  }

  /// Resolve every definition in order, stopping at the first failure.
  ///
  /// Definitions may depend on earlier ones (a leaf certificate on its CA), so
  /// the order given is the order of generation. Values generated before a
  /// failure stay persisted.
  pub fn resolve_all(&self, definitions: &[VariableDefinition]) -> Result<(), StoreError> {
    for def in definitions {
      self.get(def).map_err(|e| e.for_variable(&def.name))?;
    }

    let vars = self.reader.load()?;
    self.save(&vars)
  }

  /// Return the stored value for `def`, generating it when missing.
  ///
  /// Returns `Ok(None)` only for a lookup-only definition whose name is not
  /// stored. An existing value is never regenerated, whatever type or options
  /// the definition carries.
  pub fn get(&self, def: &VariableDefinition) -> Result<Option<Value>, StoreError> {
    let mut vars = self.reader.load()?;

    if let Some(value) = vars.remove(&def.name) {
      debug!(name = %def.name, "variable already set");
      return Ok(Some(value));
    }

    if def.is_lookup() {
      debug!(name = %def.name, "variable not found");
      return Ok(None);
    }

    let value = self.generate_and_set(def)?;
    Ok(Some(value))
  }

  /// Stored variables as lookup-only definitions, in file order.
  pub fn list(&self) -> Result<Vec<VariableDefinition>, StoreError> {
    let vars = self.reader.load()?;
    Ok(vars.keys().map(VariableDefinition::lookup).collect())
  }

  fn generate_and_set(&self, def: &VariableDefinition) -> Result<Value, StoreError> {
    let value = self.generate(def).map_err(|source| StoreError::Generate {
      name: def.name.clone(),
      source,
    })?;

    self.set(&def.name, value.clone())?;
    info!(name = %def.name, kind = %def.type_, "generated variable");

    Ok(value)
  }

  fn generate(&self, def: &VariableDefinition) -> Result<Value, GenerateError> {
    let mut options = def.options.clone();
    let base64 = take_base64_option(&mut options)?;

    let generator = self.registry.get_generator(&def.type_)?;
    let value = generator.generate(&options)?;

    Ok(if base64 { value.encode_leaves() } else { value })
  }

  fn set(&self, name: &str, value: Value) -> Result<(), StoreError> {
    let mut vars = self.reader.load()?;
    vars.insert(name.to_string(), value);
    self.save(&vars)
  }

  /// Write the whole store through a temporary file renamed into place.
  fn save(&self, vars: &Mapping) -> Result<(), StoreError> {
    let path = self.reader.path();
    let write_err = |source: io::Error| StoreError::Write {
      path: path.to_path_buf(),
      source,
    };

    let content = serde_yaml::to_string(vars).map_err(StoreError::Serialize)?;

    let dir = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(content.as_bytes()).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), variables = vars.len(), "saved variables");
    Ok(())
  }
}

/// Remove the `base64` flag from mapping options so generators never see it.
fn take_base64_option(options: &mut Value) -> Result<bool, GenerateError> {
  let Some(mapping) = options.as_mapping_mut() else {
    return Ok(false);
  };

  match mapping.remove(BASE64_OPTION) {
    None | Some(Value::Null) => Ok(false),
    Some(Value::Bool(flag)) => Ok(flag),
    Some(other) => Err(GenerateError::InvalidOption {
      option: BASE64_OPTION.to_string(),
      reason: format!("expected a boolean, found a {}", other.type_name()),
    }),
  }
}
