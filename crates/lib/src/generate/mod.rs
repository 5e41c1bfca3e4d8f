//! Credential generators and the registry that selects them by type.
//!
//! The store only sees the [`Generator`] contract: options in, value out.
//! [`GeneratorRegistry::with_defaults`] wires up the built-in types:
//!
//! | type          | value                                               |
//! |---------------|-----------------------------------------------------|
//! | `password`    | random lowercase alphanumeric string                |
//! | `rsa`         | `{private_key, public_key}`                         |
//! | `ssh`         | `{private_key, public_key, public_key_fingerprint}` |
//! | `certificate` | `{ca, certificate, private_key}`                    |

mod certificate;
mod password;
mod rsa_key;
mod ssh;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::certs::{CertLoadError, CertLoader};
use crate::value::{Value, ValueError};

pub use certificate::CertificateGenerator;
pub use password::{DEFAULT_PASSWORD_LENGTH, PasswordGenerator};
pub use rsa_key::{DEFAULT_KEY_LENGTH, RsaGenerator};
pub use ssh::SshGenerator;

/// Errors reported by generators and the registry.
#[derive(Debug, Error)]
pub enum GenerateError {
  #[error("no generator registered for type '{0}'")]
  UnknownType(String),

  #[error("invalid '{option}' option: {reason}")]
  InvalidOption { option: String, reason: String },

  #[error("invalid options: {0}")]
  InvalidOptions(String),

  #[error("key generation failed: {0}")]
  Key(String),

  #[error("certificate generation failed: {0}")]
  Certificate(#[from] rcgen::Error),

  #[error(transparent)]
  CertLoad(#[from] CertLoadError),

  #[error("failed to encode generated value: {0}")]
  Encode(#[source] ValueError),
}

/// Produces a credential value from options.
pub trait Generator {
  fn generate(&self, options: &Value) -> Result<Value, GenerateError>;
}

/// Generators keyed by type name.
#[derive(Default)]
pub struct GeneratorRegistry {
  generators: BTreeMap<String, Box<dyn Generator>>,
}

impl GeneratorRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// The built-in generators. `loader` resolves signing CAs for certificates.
  pub fn with_defaults(loader: CertLoader) -> Self {
    let mut registry = Self::new();
    registry.register("password", PasswordGenerator);
    registry.register("rsa", RsaGenerator);
    registry.register("ssh", SshGenerator);
    registry.register("certificate", CertificateGenerator::new(loader));
    registry
  }

  /// Register a generator, replacing any previous one for the same type.
  pub fn register(&mut self, type_: &str, generator: impl Generator + 'static) {
    self.generators.insert(type_.to_string(), Box::new(generator));
  }

  pub fn get_generator(&self, type_: &str) -> Result<&dyn Generator, GenerateError> {
    self
      .generators
      .get(type_)
      .map(|g| g.as_ref())
      .ok_or_else(|| GenerateError::UnknownType(type_.to_string()))
  }

  pub fn types(&self) -> impl Iterator<Item = &str> {
    self.generators.keys().map(String::as_str)
  }
}

impl fmt::Debug for GeneratorRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.types()).finish()
  }
}

/// Decode generator options; null options mean all defaults.
fn decode_options<T: DeserializeOwned + Default>(options: &Value) -> Result<T, GenerateError> {
  if options.is_null() {
    return Ok(T::default());
  }
  options
    .decode()
    .map_err(|e| GenerateError::InvalidOptions(e.to_string()))
}
