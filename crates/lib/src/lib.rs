//! credforge-lib: durable, idempotent credential generation.
//!
//! Variables are described by [`VariableDefinition`]s and resolved against a
//! YAML [`VarStore`]. A variable that already has a value is never touched; a
//! missing one is produced by the [`Generator`] registered for its type and
//! persisted before the next variable is considered.
//!
//! - [`value`]: the dynamic value tree stored for each variable
//! - [`definition`]: loading variable definitions
//! - [`store`]: the variables file and get-or-generate resolution
//! - [`certs`]: reading stored certificates back for signing
//! - [`generate`]: built-in generators and the registry

pub mod certs;
pub mod definition;
pub mod generate;
pub mod store;
mod util;
pub mod value;

pub use certs::{CertLoadError, CertLoader, CertificateMaterial};
pub use definition::{DefinitionError, VariableDefinition, load_definitions, parse_definitions};
pub use generate::{GenerateError, Generator, GeneratorRegistry};
pub use store::{StoreError, StoreReader, VarStore, VariableSource};
pub use value::{Mapping, Value, ValueError};
