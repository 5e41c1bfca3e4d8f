//! Test utilities for credforge-lib.
//!
//! Certificate fixtures are expensive to generate, so they are built once per
//! test binary and shared.

use std::sync::OnceLock;

use crate::certs::CertLoader;
use crate::generate::{CertificateGenerator, Generator};
use crate::value::{Mapping, Value};

/// A self-signed CA value (`ca`, `certificate`, `private_key`) with subject `CN=test-ca`.
pub fn self_signed_ca() -> &'static Value {
  static CA: OnceLock<Value> = OnceLock::new();
  CA.get_or_init(|| {
    let options: Value = serde_yaml::from_str("common_name: test-ca\nis_ca: true").unwrap();
    CertificateGenerator::new(CertLoader::new(Mapping::new()))
      .generate(&options)
      .unwrap()
  })
}
