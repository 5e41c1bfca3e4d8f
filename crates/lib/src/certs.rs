//! Load stored CA material for signing dependent certificates.
//!
//! A certificate variable is a mapping with `certificate` and `private_key`
//! fields. Each field may hold PEM text directly or PEM text wrapped in
//! base64 (when the variable was generated with `base64: true`); the loader
//! accepts both.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pem::{EncodeConfig, LineEnding, Pem};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use serde::Deserialize;
use thiserror::Error;
use x509_parser::prelude::{FromDer, X509Certificate, X509Error};

use crate::store::{StoreError, VariableSource};
use crate::value::ValueError;

/// Errors that can occur while loading certificate material.
#[derive(Debug, Error)]
pub enum CertLoadError {
  #[error("expected to find variable '{0}' with a certificate")]
  NotFound(String),

  #[error("failed to read variable '{name}': {source}")]
  Store {
    name: String,
    #[source]
    source: Box<StoreError>,
  },

  #[error("expected variable '{name}' to have 'certificate' and 'private_key' fields: {source}")]
  Shape {
    name: String,
    #[source]
    source: ValueError,
  },

  #[error("{field} of variable '{name}' did not contain PEM formatted block")]
  Format { name: String, field: &'static str },

  #[error("failed to parse {field} of variable '{name}': {reason}")]
  Parse {
    name: String,
    field: &'static str,
    reason: String,
  },
}

#[derive(Deserialize)]
struct CertificateFields {
  certificate: String,
  private_key: String,
}

/// A CA certificate with its RSA private key.
#[derive(Clone)]
pub struct CertificateMaterial {
  certificate_der: Vec<u8>,
  private_key: RsaPrivateKey,
}

impl CertificateMaterial {
  /// Parsed view of the certificate.
  pub fn certificate(&self) -> Result<X509Certificate<'_>, X509Error> {
    X509Certificate::from_der(&self.certificate_der)
      .map(|(_, cert)| cert)
      .map_err(|e| match e {
        x509_parser::nom::Err::Error(e) | x509_parser::nom::Err::Failure(e) => e,
        x509_parser::nom::Err::Incomplete(_) => X509Error::InvalidCertificate,
      })
  }

  pub fn certificate_der(&self) -> &[u8] {
    &self.certificate_der
  }

  /// The certificate re-encoded as PEM.
  pub fn certificate_pem(&self) -> String {
    let block = Pem::new("CERTIFICATE", self.certificate_der.clone());
    pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
  }

  pub fn private_key(&self) -> &RsaPrivateKey {
    &self.private_key
  }
}

impl fmt::Debug for CertificateMaterial {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CertificateMaterial")
      .field("certificate_der", &format_args!("{} bytes", self.certificate_der.len()))
      .field("private_key", &"<redacted>")
      .finish()
  }
}

/// Resolves variable names into certificate material.
///
/// Holds only a [`VariableSource`], so it can never generate or modify
/// variables.
pub struct CertLoader {
  source: Box<dyn VariableSource>,
}

impl CertLoader {
  pub fn new(source: impl VariableSource + 'static) -> Self {
    Self {
      source: Box::new(source),
    }
  }

  pub fn load_certificate_material(&self, name: &str) -> Result<CertificateMaterial, CertLoadError> {
    let value = self
      .source
      .lookup(name)
      .map_err(|source| CertLoadError::Store {
        name: name.to_string(),
        source: Box::new(source),
      })?
      .ok_or_else(|| CertLoadError::NotFound(name.to_string()))?;

    let fields: CertificateFields = value.decode().map_err(|source| CertLoadError::Shape {
      name: name.to_string(),
      source,
    })?;

    let certificate_der = first_pem_block(&fields.certificate).ok_or_else(|| CertLoadError::Format {
      name: name.to_string(),
      field: "certificate",
    })?;
    X509Certificate::from_der(&certificate_der).map_err(|e| CertLoadError::Parse {
      name: name.to_string(),
      field: "certificate",
      reason: e.to_string(),
    })?;

    let key_der = first_pem_block(&fields.private_key).ok_or_else(|| CertLoadError::Format {
      name: name.to_string(),
      field: "private key",
    })?;
    let private_key = RsaPrivateKey::from_pkcs1_der(&key_der).map_err(|e| CertLoadError::Parse {
      name: name.to_string(),
      field: "private key",
      reason: e.to_string(),
    })?;

    Ok(CertificateMaterial {
      certificate_der,
      private_key,
    })
  }
}

/// Contents of the first PEM block in `text`, unwrapping base64 first when
/// the whole text decodes as base64. Line breaks inside the base64 are ignored.
fn first_pem_block(text: &str) -> Option<Vec<u8>> {
  let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
  let candidate = STANDARD.decode(compact).unwrap_or_else(|_| text.as_bytes().to_vec());
  pem::parse(candidate).ok().map(Pem::into_contents)
}
